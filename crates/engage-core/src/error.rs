//! Error types for the Engage SDK core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the conversation core and its collaborators.
///
/// Variants are typed so that callers can tell programming errors
/// (`AlreadyIdentified`) apart from recoverable storage failures.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum EngageError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "migration"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Legacy or schema migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// `set_token` was called on a conversation that already has an identity.
    #[error("Conversation is already identified (conversation id: {conversation_id:?})")]
    AlreadyIdentified { conversation_id: Option<String> },

    /// An identity value was missing or blank.
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// The legacy record has already been migrated and retired.
    #[error("Legacy conversation has already been migrated")]
    AlreadyMigrated,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngageError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Creates an InvalidIdentity error
    pub fn invalid_identity(message: impl Into<String>) -> Self {
        Self::InvalidIdentity(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_migration(&self) -> bool {
        matches!(self, Self::Migration(_))
    }

    pub fn is_invalid_identity(&self) -> bool {
        matches!(self, Self::InvalidIdentity(_))
    }

    pub fn is_already_identified(&self) -> bool {
        matches!(self, Self::AlreadyIdentified { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for EngageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for EngageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for EngageError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for EngageError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            _ => Self::Migration(err.to_string()),
        }
    }
}

impl From<String> for EngageError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, EngageError>`.
pub type Result<T> = std::result::Result<T, EngageError>;
