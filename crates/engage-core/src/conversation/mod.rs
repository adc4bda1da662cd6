//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `model`: Persisted conversation state (`ConversationState`, `Identity`)
//! - `aggregate`: The live `Conversation` and its mutation protocol
//! - `event`: Change events and the observer port
//! - `payload`: Creation/update request bodies
//! - `legacy`: Records written by older SDK releases and their migration
//! - `repository`: Storage contract
//! - `loader`: Startup load/migrate/create orchestration
//!
//! # Usage
//!
//! ```ignore
//! use engage_core::conversation::{Conversation, ConversationEvent, ConversationLoader};
//! ```

mod aggregate;
mod event;
mod legacy;
mod loader;
mod model;
mod payload;
mod repository;

// Re-export public API
pub use aggregate::Conversation;
pub use event::{ConversationEvent, ConversationObserver, EventRecorder};
pub use legacy::LegacyConversation;
pub use loader::{ConversationLoader, LoadOutcome};
pub use model::{ConversationState, ConversationStatus, Identity};
pub use repository::{ConversationMetadataItem, ConversationRepository, StoredConversation};
