//! Offline conversation state for the Engage client SDK.
//!
//! Tracks identity, person/device/app-release/SDK snapshots and engagement
//! history so that interaction targeting can be decided locally, while
//! producing diff payloads whenever state needs to be synced.

pub mod conversation;
pub mod engagement;
pub mod environment;
pub mod error;
pub mod snapshot;

// Re-export common types
pub use conversation::{Conversation, ConversationEvent, ConversationObserver, ConversationState};
pub use environment::Environment;
pub use error::{EngageError, Result};
