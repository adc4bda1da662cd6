//! Conversation index DTOs
//!
//! ## Version History
//! - **1.0.0**: Initial schema with a flat list of metadata items

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use engage_core::conversation::ConversationMetadataItem;

/// The storage index: one entry per stored conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationIndex {
    pub items: Vec<ConversationMetadataItem>,
}

impl ConversationIndex {
    /// Inserts or replaces the entry with the same local id.
    pub fn upsert(&mut self, item: ConversationMetadataItem) {
        match self.items.iter_mut().find(|i| i.local_id == item.local_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// The most recently updated entry.
    pub fn most_recent(&self) -> Option<&ConversationMetadataItem> {
        self.items.iter().max_by_key(|item| item.updated_at)
    }

    pub fn find(&self, local_id: &str) -> Option<&ConversationMetadataItem> {
        self.items.iter().find(|item| item.local_id == local_id)
    }

    /// Entries ordered from most to least recently updated.
    pub fn sorted(&self) -> Vec<ConversationMetadataItem> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        items
    }
}

/// Conversation index V1.0.0
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConversationIndexV1_0_0 {
    #[serde(default)]
    pub items: Vec<ConversationMetadataItem>,
}

/// Convert ConversationIndexV1_0_0 DTO to domain model
impl IntoDomain<ConversationIndex> for ConversationIndexV1_0_0 {
    fn into_domain(self) -> ConversationIndex {
        ConversationIndex { items: self.items }
    }
}

/// Convert domain model to ConversationIndexV1_0_0 DTO (for version-migrate save support)
impl FromDomain<ConversationIndex> for ConversationIndexV1_0_0 {
    fn from_domain(index: ConversationIndex) -> Self {
        ConversationIndexV1_0_0 { items: index.items }
    }
}

/// Creates a Migrator for the conversation index.
pub fn create_conversation_index_migrator() -> version_migrate::Migrator {
    version_migrate::migrator!("conversation_index" => [
        ConversationIndexV1_0_0,
        ConversationIndex
    ], save = true)
    .expect("Failed to create conversation_index migrator")
}
