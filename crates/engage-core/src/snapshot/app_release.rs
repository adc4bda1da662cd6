use serde::{Deserialize, Serialize};

use super::Snapshot;

/// The host application's release as seen at the last `check_for_diffs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRelease {
    /// Release type reported to the server (e.g. "ios", "android", "desktop").
    #[serde(rename = "type")]
    pub release_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_identifier: Option<String>,

    #[serde(default)]
    pub has_app_store_receipt: bool,

    #[serde(default)]
    pub debug_build: bool,

    /// Set once the host application has customized the SDK's styling.
    #[serde(default)]
    pub overriding_styles: bool,
}

impl Default for AppRelease {
    fn default() -> Self {
        Self {
            release_type: "desktop".to_string(),
            version: None,
            build: None,
            bundle_identifier: None,
            has_app_store_receipt: false,
            debug_build: false,
            overriding_styles: false,
        }
    }
}

impl AppRelease {
    /// Carries over flags that are recorded by the conversation rather than
    /// reported by the environment.
    pub fn refreshed_from(&self, current: AppRelease) -> AppRelease {
        AppRelease {
            overriding_styles: self.overriding_styles || current.overriding_styles,
            ..current
        }
    }
}

impl Snapshot for AppRelease {
    const KEY: &'static str = "appRelease";
}
