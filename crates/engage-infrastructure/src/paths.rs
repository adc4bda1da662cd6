//! Path management for Engage configuration and conversation data.
//!
//! Paths are resolved via AppPaths from the version-migrate crate, so the
//! layout follows platform conventions (XDG on Linux/macOS).
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/engage/
//! └── config.toml                      # EngageConfig
//!
//! ~/.local/share/engage/               # Data directory (overridable)
//! ├── legacy_conversation.json         # Written by older SDK releases
//! ├── legacy_conversation.json.migrated
//! └── conversations/
//!     ├── metadata.json                # Conversation index
//!     └── <local id>.json              # One file per conversation
//! ```

use std::path::PathBuf;
use version_migrate::AppPaths;

use engage_core::error::{EngageError, Result};

pub struct EngagePaths;

impl EngagePaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("engage")
    }

    /// Returns the configuration directory (e.g. `~/.config/engage/`).
    pub fn config_dir() -> Result<PathBuf> {
        Self::app_paths()
            .config_dir()
            .map_err(|e| EngageError::config(format!("Cannot resolve config directory: {}", e)))
    }

    /// Returns the data directory (e.g. `~/.local/share/engage/`).
    pub fn data_dir() -> Result<PathBuf> {
        Self::app_paths()
            .data_dir()
            .map_err(|e| EngageError::config(format!("Cannot resolve data directory: {}", e)))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
