//! Engage configuration loaded from `config.toml`.
//!
//! ```toml
//! api_key = "ENGAGE-KEY"
//! data_dir = "/var/lib/engage"   # optional
//!
//! [app]
//! version = "2.3.0"
//! build = "230"
//! bundle_identifier = "com.example.app"
//! debug_build = false
//!
//! [device]                       # optional overrides
//! os_version = "14.2"
//! locale = "en_US"
//! ```
//!
//! A missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use engage_core::error::{EngageError, Result};

use crate::paths::EngagePaths;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngageConfig {
    pub api_key: String,
    /// Overrides the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub app: AppConfig,
    pub device: DeviceConfig,
}

/// Facts about the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: String,
    pub build: String,
    pub bundle_identifier: Option<String>,
    pub debug_build: bool,
    pub has_app_store_receipt: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.0.0".to_string(),
            build: "0".to_string(),
            bundle_identifier: None,
            debug_build: false,
            has_app_store_receipt: false,
        }
    }
}

/// Device facts that override what is detected from the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub hardware: Option<String>,
    pub locale: Option<String>,
    /// Seconds east of UTC.
    pub utc_offset: Option<i32>,
}

impl EngageConfig {
    /// Loads the configuration at `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(EngageError::io(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let config: EngageConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `config.toml` from the platform config directory.
    pub fn load_default() -> Result<Self> {
        Self::load(&EngagePaths::config_file()?)
    }

    /// The directory conversation data is stored in.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => EngagePaths::data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngageConfig::load(&temp_dir.path().join("config.toml")).unwrap();

        assert_eq!(config, EngageConfig::default());
        assert_eq!(config.app.version, "0.0.0");
        assert_eq!(config.app.build, "0");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
api_key = "KEY"
data_dir = "/tmp/engage-data"

[app]
version = "2.3.0"

[device]
locale = "fr_CA"
"#,
        )
        .unwrap();

        let config = EngageConfig::load(&path).unwrap();
        assert_eq!(config.api_key, "KEY");
        assert_eq!(config.app.version, "2.3.0");
        assert_eq!(config.app.build, "0");
        assert_eq!(config.device.locale.as_deref(), Some("fr_CA"));
        assert_eq!(
            config.resolve_data_dir().unwrap(),
            PathBuf::from("/tmp/engage-data")
        );
    }

    #[test]
    fn test_invalid_toml_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "api_key = ").unwrap();

        let err = EngageConfig::load(&path).unwrap_err();
        assert!(err.is_serialization());
    }
}
