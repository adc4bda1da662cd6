//! Load-or-create orchestration.

use std::sync::Arc;

use super::aggregate::Conversation;
use super::repository::{ConversationRepository, StoredConversation};
use crate::environment::Environment;
use crate::error::Result;

/// How the conversation returned by [`ConversationLoader::load_or_create`] came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing usable was stored; a new conversation was created.
    Fresh,
    /// Seeded from a legacy record, which has now been retired.
    Migrated,
    /// Restored from the current persisted format.
    Restored,
}

/// Resolves the conversation to use at startup and persists it.
pub struct ConversationLoader {
    repository: Arc<dyn ConversationRepository>,
    environment: Arc<dyn Environment>,
    api_key: String,
}

impl ConversationLoader {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        environment: Arc<dyn Environment>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            environment,
            api_key: api_key.into(),
        }
    }

    /// Loads the stored conversation, migrating or creating one as needed.
    ///
    /// - current data is restored as-is (the caller decides when to
    ///   `check_for_diffs`)
    /// - legacy data is migrated, saved, and then retired; a malformed legacy
    ///   record is retired as well and a fresh conversation is created instead
    /// - with nothing stored, a fresh conversation is created and saved
    pub async fn load_or_create(&self) -> Result<(Conversation, LoadOutcome)> {
        match self.repository.load().await? {
            Some(StoredConversation::Current(state)) => {
                tracing::info!("Restored conversation {}", state.local_id);
                Ok((
                    Conversation::restore(state, self.environment.clone()),
                    LoadOutcome::Restored,
                ))
            }
            Some(StoredConversation::Legacy(legacy)) => {
                let (mut conversation, outcome) = match Conversation::migrate(
                    legacy,
                    self.api_key.clone(),
                    self.environment.clone(),
                ) {
                    Ok(conversation) => (conversation, LoadOutcome::Migrated),
                    Err(e) => {
                        tracing::warn!(
                            "Legacy conversation could not be migrated, starting fresh: {}",
                            e
                        );
                        (self.fresh(), LoadOutcome::Fresh)
                    }
                };

                self.save_if_dirty(&mut conversation).await?;
                self.repository.retire_legacy().await?;
                tracing::info!(
                    "Legacy conversation retired (outcome: {:?}, local id: {})",
                    outcome,
                    conversation.local_id()
                );
                Ok((conversation, outcome))
            }
            None => {
                let mut conversation = self.fresh();
                self.save_if_dirty(&mut conversation).await?;
                tracing::info!("Created conversation {}", conversation.local_id());
                Ok((conversation, LoadOutcome::Fresh))
            }
        }
    }

    /// Persists the conversation if it has unsaved changes.
    ///
    /// Returns `true` if a save happened.
    pub async fn save_if_dirty(&self, conversation: &mut Conversation) -> Result<bool> {
        if !conversation.is_dirty() {
            return Ok(false);
        }
        self.repository.save(conversation.state()).await?;
        conversation.mark_saved();
        Ok(true)
    }

    fn fresh(&self) -> Conversation {
        Conversation::new(self.api_key.clone(), self.environment.clone())
    }
}
