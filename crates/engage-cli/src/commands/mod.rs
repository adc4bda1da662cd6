//! CLI command implementations.
//!
//! Every command runs against a [`Session`]: the conversation loaded (or
//! created/migrated) from the configured data directory, with an event
//! recorder attached.

pub mod engagement;
pub mod identity;
pub mod profile;
pub mod state;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use engage_core::conversation::{Conversation, ConversationLoader, EventRecorder};
use engage_core::snapshot::AttributeValue;
use engage_infrastructure::{ConfiguredEnvironment, EngageConfig, FileConversationRepository};

pub struct Session {
    pub conversation: Conversation,
    loader: ConversationLoader,
    repository: Arc<FileConversationRepository>,
    recorder: Arc<EventRecorder>,
}

impl Session {
    /// Loads the configuration and the conversation it points at.
    pub async fn open(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => EngageConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngageConfig::load_default()?,
        };
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config.resolve_data_dir()?,
        };
        tracing::debug!("Using data directory {}", data_dir.display());

        let repository = Arc::new(FileConversationRepository::with_base_path(data_dir));
        let environment = Arc::new(ConfiguredEnvironment::new(&config));
        let loader = ConversationLoader::new(repository.clone(), environment, config.api_key);

        let (mut conversation, outcome) = loader.load_or_create().await?;
        tracing::info!(
            "Conversation {} ready ({:?}, {})",
            conversation.local_id(),
            outcome,
            conversation.status()
        );

        let recorder = Arc::new(EventRecorder::new());
        conversation.set_observer(recorder.clone());

        Ok(Self {
            conversation,
            loader,
            repository,
            recorder,
        })
    }

    pub fn repository(&self) -> &FileConversationRepository {
        &self.repository
    }

    /// Events emitted so far, as JSON.
    pub fn events(&self) -> Value {
        serde_json::to_value(self.recorder.events()).unwrap_or(Value::Null)
    }

    /// Logs emitted events and saves the conversation if it changed.
    pub async fn finish(mut self) -> Result<()> {
        for event in self.recorder.drain() {
            tracing::info!(event = event.kind(), "{}", serde_json::to_string(&event)?);
        }

        if self.loader.save_if_dirty(&mut self.conversation).await? {
            tracing::info!("Saved conversation {}", self.conversation.local_id());
        }
        Ok(())
    }
}

/// Parses a `key=value` argument; the value is read as a literal.
pub fn parse_assignment(raw: &str) -> Result<(String, AttributeValue)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Expected key=value, got '{}'", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Missing key in '{}'", raw);
    }
    Ok((key.to_string(), AttributeValue::parse_literal(value)))
}

pub fn parse_assignments(raw: &[String]) -> Result<Vec<(String, AttributeValue)>> {
    raw.iter().map(|r| parse_assignment(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let (key, value) = parse_assignment("plan=pro").unwrap();
        assert_eq!(key, "plan");
        assert_eq!(value, AttributeValue::String("pro".to_string()));

        let (_, value) = parse_assignment("seats=3").unwrap();
        assert_eq!(value, AttributeValue::from(3i64));

        let (_, value) = parse_assignment("note=a=b").unwrap();
        assert_eq!(value, AttributeValue::String("a=b".to_string()));
    }

    #[test]
    fn test_parse_assignment_rejects_malformed() {
        assert!(parse_assignment("plan").is_err());
        assert!(parse_assignment("=pro").is_err());
    }
}
