//! Conversation repository implementation.
//!
//! Stores each conversation as a versioned JSON file and keeps a versioned
//! index of them. Uses version-migrate for automatic schema migration.
//!
//! Layout under the data directory:
//!
//! ```text
//! conversations/metadata.json       # index (ConversationIndex)
//! conversations/<local id>.json     # ConversationState
//! legacy_conversation.json          # read-only, from older SDK releases
//! ```

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use version_migrate::Migrator;

use engage_core::conversation::{
    ConversationMetadataItem, ConversationRepository, ConversationState, LegacyConversation,
    StoredConversation,
};
use engage_core::error::{EngageError, Result};

use crate::dto::{ConversationIndex, create_conversation_index_migrator, create_conversation_migrator};
use crate::paths::EngagePaths;
use crate::storage::{read_optional, write_atomic};

/// File-based conversation repository with version migration support.
pub struct FileConversationRepository {
    /// Storage root (the Engage data directory).
    base_dir: PathBuf,
    conversation_migrator: Migrator,
    index_migrator: Migrator,
}

impl FileConversationRepository {
    const CONVERSATIONS_DIR: &'static str = "conversations";
    const INDEX_FILENAME: &'static str = "metadata.json";
    const LEGACY_FILENAME: &'static str = "legacy_conversation.json";
    const RETIRED_SUFFIX: &'static str = ".migrated";

    /// Creates a repository rooted at the platform data directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_base_path(EngagePaths::data_dir()?))
    }

    /// Creates a repository rooted at a custom directory.
    pub fn with_base_path(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            conversation_migrator: create_conversation_migrator(),
            index_migrator: create_conversation_index_migrator(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn index_path(&self) -> PathBuf {
        self.base_dir
            .join(Self::CONVERSATIONS_DIR)
            .join(Self::INDEX_FILENAME)
    }

    fn legacy_path(&self) -> PathBuf {
        self.base_dir.join(Self::LEGACY_FILENAME)
    }

    fn retired_legacy_path(&self) -> PathBuf {
        self.base_dir
            .join(format!("{}{}", Self::LEGACY_FILENAME, Self::RETIRED_SUFFIX))
    }

    /// Index-relative file name for a conversation.
    fn conversation_file_name(local_id: &str) -> String {
        format!("{}/{}.json", Self::CONVERSATIONS_DIR, local_id)
    }

    async fn load_index(&self) -> Result<ConversationIndex> {
        let Some(content) = read_optional(&self.index_path()).await? else {
            return Ok(ConversationIndex::default());
        };

        let json_value: serde_json::Value = serde_json::from_str(&content)?;
        let index: ConversationIndex = self
            .index_migrator
            .load_flat_from("conversation_index", json_value)?;
        Ok(index)
    }

    async fn save_index(&self, index: ConversationIndex) -> Result<()> {
        let serialized = self
            .index_migrator
            .save_domain_flat("conversation_index", index)?;
        write_atomic(&self.index_path(), &serialized).await
    }

    async fn read_conversation(&self, file_name: &str) -> Result<Option<ConversationState>> {
        let Some(content) = read_optional(&self.base_dir.join(file_name)).await? else {
            return Ok(None);
        };

        let json_value: serde_json::Value = serde_json::from_str(&content)?;
        let state: ConversationState = self
            .conversation_migrator
            .load_flat_from("conversation", json_value)
            .map_err(|e| {
                EngageError::migration(format!("Failed to migrate {}: {}", file_name, e))
            })?;
        Ok(Some(state))
    }

    async fn read_legacy(&self) -> Result<Option<LegacyConversation>> {
        let Some(content) = read_optional(&self.legacy_path()).await? else {
            return Ok(None);
        };

        // An unreadable record still needs retiring, so it is surfaced as an
        // empty one and rejected by migration.
        let legacy = serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Legacy conversation is not valid JSON: {}", e);
            LegacyConversation::default()
        });
        Ok(Some(legacy))
    }
}

#[async_trait]
impl ConversationRepository for FileConversationRepository {
    async fn load(&self) -> Result<Option<StoredConversation>> {
        let index = self.load_index().await?;

        // Entries whose file has gone missing are skipped in favour of the
        // next most recent one.
        for item in index.sorted() {
            match self.read_conversation(&item.file_name).await? {
                Some(state) => return Ok(Some(StoredConversation::Current(state))),
                None => tracing::warn!(
                    "Conversation {} is indexed but {} is missing, skipping",
                    item.local_id,
                    item.file_name
                ),
            }
        }

        Ok(self.read_legacy().await?.map(StoredConversation::Legacy))
    }

    async fn find_by_local_id(&self, local_id: &str) -> Result<Option<ConversationState>> {
        let index = self.load_index().await?;
        match index.find(local_id) {
            Some(item) => self.read_conversation(&item.file_name).await,
            None => Ok(None),
        }
    }

    async fn save(&self, state: &ConversationState) -> Result<()> {
        let file_name = Self::conversation_file_name(&state.local_id);

        let serialized = self
            .conversation_migrator
            .save_domain_flat("conversation", state.clone())?;
        write_atomic(&self.base_dir.join(&file_name), &serialized).await?;

        let mut index = self.load_index().await?;
        index.upsert(ConversationMetadataItem::describe(
            state,
            file_name,
            Utc::now(),
        ));
        self.save_index(index).await?;

        tracing::debug!("Saved conversation {}", state.local_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConversationMetadataItem>> {
        Ok(self.load_index().await?.sorted())
    }

    async fn retire_legacy(&self) -> Result<()> {
        let legacy_path = self.legacy_path();
        let retired_path = self.retired_legacy_path();

        if fs::try_exists(&legacy_path).await? {
            fs::rename(&legacy_path, &retired_path).await.map_err(|e| {
                EngageError::io(format!("Failed to retire legacy conversation: {}", e))
            })?;
            tracing::info!("Retired legacy conversation to {}", retired_path.display());
            return Ok(());
        }

        if fs::try_exists(&retired_path).await? {
            return Err(EngageError::AlreadyMigrated);
        }

        Err(EngageError::not_found(
            "legacy_conversation",
            legacy_path.display().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engage_core::conversation::{ConversationLoader, Identity, LoadOutcome};
    use engage_core::engagement::Engagement;
    use engage_core::environment::StaticEnvironment;
    use engage_core::snapshot::{AppRelease, AttributeMap, Device, Person, Sdk};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn state(local_id: &str) -> ConversationState {
        ConversationState {
            local_id: local_id.to_string(),
            api_key: "key".to_string(),
            identity: None,
            app_release: AppRelease::default(),
            sdk: Sdk::default(),
            person: Person::default(),
            device: Device::default(),
            engagement: Engagement::default(),
            last_message_id: None,
            user_info: AttributeMap::new(),
            device_overrides: Default::default(),
        }
    }

    fn write_legacy(dir: &Path) {
        std::fs::write(
            dir.join("legacy_conversation.json"),
            r#"{"token": "t1", "personID": "p1", "deviceID": "d1"}"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileConversationRepository::with_base_path(temp_dir.path().to_path_buf());

        assert!(repo.load().await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileConversationRepository::with_base_path(temp_dir.path().to_path_buf());

        let mut saved = state("local-1");
        saved.person.name = Some("Ada".to_string());
        repo.save(&saved).await.unwrap();

        match repo.load().await.unwrap() {
            Some(StoredConversation::Current(loaded)) => assert_eq!(loaded, saved),
            other => panic!("unexpected load result: {:?}", other),
        }
        assert_eq!(
            repo.find_by_local_id("local-1").await.unwrap(),
            Some(saved)
        );
        assert!(repo.find_by_local_id("missing").await.unwrap().is_none());
        assert!(
            temp_dir
                .path()
                .join("conversations")
                .join("local-1.json")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_save_updates_index_entry() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileConversationRepository::with_base_path(temp_dir.path().to_path_buf());

        let mut conversation = state("local-1");
        repo.save(&conversation).await.unwrap();
        conversation.identity = Some(Identity {
            token: "t".to_string(),
            conversation_id: Some("c".to_string()),
            person_id: "p".to_string(),
            device_id: "d".to_string(),
        });
        repo.save(&conversation).await.unwrap();

        let items = repo.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].conversation_id.as_deref(), Some("c"));
        assert_eq!(items[0].file_name, "conversations/local-1.json");
    }

    #[tokio::test]
    async fn test_loads_v1_0_0_file() {
        let temp_dir = TempDir::new().unwrap();
        let conversations = temp_dir.path().join("conversations");
        std::fs::create_dir_all(&conversations).unwrap();
        std::fs::write(
            conversations.join("old.json"),
            r#"{
                "version": "1.0.0",
                "apiKey": "key",
                "appRelease": {"type": "desktop", "version": "1.0"},
                "sdk": {"version": "0.1.0", "programmingLanguage": "Rust", "authorName": "Engage"},
                "person": {},
                "device": {}
            }"#,
        )
        .unwrap();
        std::fs::write(
            conversations.join("metadata.json"),
            r#"{"version": "1.0.0", "items": [{
                "localId": "old",
                "status": "pending",
                "fileName": "conversations/old.json",
                "updatedAt": "2024-01-01T00:00:00Z"
            }]}"#,
        )
        .unwrap();

        let repo = FileConversationRepository::with_base_path(temp_dir.path().to_path_buf());
        match repo.load().await.unwrap() {
            Some(StoredConversation::Current(loaded)) => {
                assert_eq!(loaded.api_key, "key");
                assert_eq!(loaded.app_release.version.as_deref(), Some("1.0"));
                assert!(!loaded.local_id.is_empty());
            }
            other => panic!("unexpected load result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_skips_index_entry_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileConversationRepository::with_base_path(temp_dir.path().to_path_buf());

        repo.save(&state("older")).await.unwrap();
        repo.save(&state("newer")).await.unwrap();
        std::fs::remove_file(temp_dir.path().join("conversations").join("newer.json")).unwrap();

        match repo.load().await.unwrap() {
            Some(StoredConversation::Current(loaded)) => assert_eq!(loaded.local_id, "older"),
            other => panic!("unexpected load result: {:?}", other),
        }

        std::fs::remove_file(temp_dir.path().join("conversations").join("older.json")).unwrap();
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_data_shadows_legacy() {
        let temp_dir = TempDir::new().unwrap();
        write_legacy(temp_dir.path());
        let repo = FileConversationRepository::with_base_path(temp_dir.path().to_path_buf());

        assert!(matches!(
            repo.load().await.unwrap(),
            Some(StoredConversation::Legacy(_))
        ));

        repo.save(&state("local-1")).await.unwrap();
        assert!(matches!(
            repo.load().await.unwrap(),
            Some(StoredConversation::Current(_))
        ));
    }

    #[tokio::test]
    async fn test_retire_legacy_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        write_legacy(temp_dir.path());
        let repo = FileConversationRepository::with_base_path(temp_dir.path().to_path_buf());

        repo.retire_legacy().await.unwrap();
        assert!(!temp_dir.path().join("legacy_conversation.json").exists());
        assert!(
            temp_dir
                .path()
                .join("legacy_conversation.json.migrated")
                .exists()
        );

        let err = repo.retire_legacy().await.unwrap_err();
        assert!(matches!(err, EngageError::AlreadyMigrated));
    }

    #[tokio::test]
    async fn test_loader_migrates_legacy_file() {
        let temp_dir = TempDir::new().unwrap();
        write_legacy(temp_dir.path());
        let repo = Arc::new(FileConversationRepository::with_base_path(
            temp_dir.path().to_path_buf(),
        ));
        let environment = Arc::new(StaticEnvironment::default());

        let loader = ConversationLoader::new(repo.clone(), environment.clone(), "key");
        let (conversation, outcome) = loader.load_or_create().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Migrated);
        assert_eq!(conversation.token(), Some("t1"));
        assert!(!conversation.is_dirty());

        // A second start restores the migrated conversation.
        let loader = ConversationLoader::new(repo, environment, "key");
        let (restored, outcome) = loader.load_or_create().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Restored);
        assert_eq!(restored.local_id(), conversation.local_id());
        assert_eq!(restored.person_id(), Some("p1"));
    }

    #[tokio::test]
    async fn test_loader_replaces_unreadable_legacy_with_fresh() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("legacy_conversation.json"), "not json").unwrap();
        let repo = Arc::new(FileConversationRepository::with_base_path(
            temp_dir.path().to_path_buf(),
        ));

        let loader = ConversationLoader::new(repo, Arc::new(StaticEnvironment::default()), "key");
        let (conversation, outcome) = loader.load_or_create().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Fresh);
        assert!(conversation.identity().is_none());
        assert!(
            temp_dir
                .path()
                .join("legacy_conversation.json.migrated")
                .exists()
        );
    }
}
