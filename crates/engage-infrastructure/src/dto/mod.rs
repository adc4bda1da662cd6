//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema for persisting data.
//! They are private to the infrastructure layer and handle the evolution
//! of the storage format over time.
//!
//! ## Schema Versioning (Semantic Versioning)
//!
//! - **MAJOR (X.0.0)**: Breaking changes (field removal, type changes)
//! - **MINOR (1.X.0)**: Backward-compatible additions (new optional fields)
//!
//! The pre-versioning legacy record (token/personID/deviceID) is not part of
//! these chains; it is read as-is and converted by the conversation core.

mod conversation;
mod metadata;

pub use conversation::create_conversation_migrator;
pub use metadata::{ConversationIndex, create_conversation_index_migrator};
