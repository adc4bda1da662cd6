//! Conversation repository trait.
//!
//! Defines the storage contract the conversation core relies on. Encoding and
//! file layout belong to the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::legacy::LegacyConversation;
use super::model::{ConversationState, ConversationStatus};
use crate::error::Result;

/// What storage found on load: current data or a legacy record to migrate.
///
/// Conversion is one-directional; nothing is ever written in the legacy shape.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredConversation {
    Current(ConversationState),
    Legacy(LegacyConversation),
}

/// Summary of a stored conversation, kept in the storage index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadataItem {
    pub local_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub status: ConversationStatus,
    /// File (relative to the storage root) holding the conversation.
    pub file_name: String,
    pub updated_at: DateTime<Utc>,
}

impl ConversationMetadataItem {
    pub fn describe(state: &ConversationState, file_name: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            local_id: state.local_id.clone(),
            conversation_id: state.conversation_id().map(str::to_string),
            status: state.status(),
            file_name,
            updated_at,
        }
    }
}

/// An abstract repository for conversation persistence.
///
/// # Implementation Notes
///
/// - `load` must prefer current data: once any current conversation exists,
///   legacy data is ignored.
/// - `retire_legacy` must make the legacy record unreadable, and a second call
///   must fail with `EngageError::AlreadyMigrated`.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Loads the most recently saved conversation, or a legacy record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StoredConversation::Current(_)))`: a saved conversation
    /// - `Ok(Some(StoredConversation::Legacy(_)))`: only legacy data exists
    /// - `Ok(None)`: nothing stored (fresh install)
    async fn load(&self) -> Result<Option<StoredConversation>>;

    /// Loads a conversation by its local identifier.
    async fn find_by_local_id(&self, local_id: &str) -> Result<Option<ConversationState>>;

    /// Saves a conversation and updates the index.
    async fn save(&self, state: &ConversationState) -> Result<()>;

    /// Lists stored conversations, most recently updated first.
    async fn list(&self) -> Result<Vec<ConversationMetadataItem>>;

    /// Retires the legacy record after it has been migrated.
    async fn retire_legacy(&self) -> Result<()>;
}
