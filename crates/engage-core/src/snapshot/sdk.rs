use serde::{Deserialize, Serialize};

use super::Snapshot;

/// Version and distribution facts about the SDK embedded in the host app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sdk {
    pub version: String,

    pub programming_language: String,

    pub author_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_version: Option<String>,
}

impl Default for Sdk {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            programming_language: "Rust".to_string(),
            author_name: "Engage".to_string(),
            platform: None,
            distribution: None,
            distribution_version: None,
        }
    }
}

impl Snapshot for Sdk {
    const KEY: &'static str = "sdk";
}
