//! Conversation DTOs and migrations
//!
//! ## Version History
//! - **1.0.0**: Initial schema (api key, identity, snapshots, engagement)
//! - **1.1.0**: Added `localId`, `lastMessageId`, `userInfo`; engagement records
//!   gained `totalCount`; optional `deviceOverrides`

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use engage_core::conversation::{ConversationState, Identity};
use engage_core::engagement::Engagement;
use engage_core::snapshot::{AppRelease, AttributeMap, Device, Person, Sdk};

/// Conversation V1.0.0 (initial version).
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConversationV1_0_0 {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    pub app_release: AppRelease,
    pub sdk: Sdk,
    pub person: Person,
    pub device: Device,
    /// Records carry `invocationCount` and `lastInvoked` only.
    #[serde(default)]
    pub engagement: Engagement,
}

/// Conversation V1.1.0.
///
/// Added local id, last message id and user info.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
#[serde(rename_all = "camelCase")]
pub struct ConversationV1_1_0 {
    pub local_id: String,
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    pub app_release: AppRelease,
    pub sdk: Sdk,
    pub person: Person,
    pub device: Device,
    #[serde(default)]
    pub engagement: Engagement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<String>,
    #[serde(default)]
    pub user_info: AttributeMap,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub device_overrides: BTreeSet<String>,
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from ConversationV1_0_0 to ConversationV1_1_0.
/// Mints a local id and seeds lifetime totals from the current counts.
impl MigratesTo<ConversationV1_1_0> for ConversationV1_0_0 {
    fn migrate(self) -> ConversationV1_1_0 {
        let mut engagement = self.engagement;
        for record in engagement
            .code_points
            .values_mut()
            .chain(engagement.interactions.values_mut())
        {
            record.total_count = record.total_count.max(record.invocation_count);
        }

        ConversationV1_1_0 {
            local_id: Uuid::new_v4().to_string(),
            api_key: self.api_key,
            identity: self.identity,
            app_release: self.app_release,
            sdk: self.sdk,
            person: self.person,
            device: self.device,
            engagement,
            last_message_id: None,
            user_info: AttributeMap::new(),
            device_overrides: BTreeSet::new(),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

/// Convert ConversationV1_1_0 DTO to domain model.
impl IntoDomain<ConversationState> for ConversationV1_1_0 {
    fn into_domain(self) -> ConversationState {
        ConversationState {
            local_id: self.local_id,
            api_key: self.api_key,
            identity: self.identity,
            app_release: self.app_release,
            sdk: self.sdk,
            person: self.person,
            device: self.device,
            engagement: self.engagement,
            last_message_id: self.last_message_id,
            user_info: self.user_info,
            device_overrides: self.device_overrides,
        }
    }
}

/// Convert domain model to ConversationV1_1_0 DTO for persistence.
impl FromDomain<ConversationState> for ConversationV1_1_0 {
    fn from_domain(state: ConversationState) -> Self {
        ConversationV1_1_0 {
            local_id: state.local_id,
            api_key: state.api_key,
            identity: state.identity,
            app_release: state.app_release,
            sdk: state.sdk,
            person: state.person,
            device: state.device,
            engagement: state.engagement,
            last_message_id: state.last_message_id,
            user_info: state.user_info,
            device_overrides: state.device_overrides,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates a Migrator for conversation entities.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Adds local id, last message id, user info and lifetime totals
/// - V1.1.0 → ConversationState: Converts DTO to domain model
///
/// # Example
///
/// ```ignore
/// let migrator = create_conversation_migrator();
/// let state: ConversationState = migrator.load_flat_from("conversation", json_value)?;
/// ```
pub fn create_conversation_migrator() -> version_migrate::Migrator {
    version_migrate::migrator!("conversation" => [
        ConversationV1_0_0,
        ConversationV1_1_0,
        ConversationState
    ], save = true)
    .expect("Failed to create conversation migrator")
}

#[cfg(test)]
mod tests {
    use super::*;
    use engage_core::engagement::EngagementNamespace;
    use serde_json::json;

    #[test]
    fn test_load_v1_0_0_migrates_to_latest() {
        let value = json!({
            "version": "1.0.0",
            "apiKey": "key",
            "identity": {"token": "t", "conversationId": "c", "personId": "p", "deviceId": "d"},
            "appRelease": {"type": "ios", "version": "3.4", "build": "34"},
            "sdk": {"version": "3.4.0", "programmingLanguage": "Objective-C", "authorName": "Engage"},
            "person": {"name": "Ada"},
            "device": {"osVersion": "16.0"},
            "engagement": {
                "codePoints": {"app#launch": {"invocationCount": 4, "lastInvoked": "2024-01-02T03:04:05Z"}},
                "interactions": {}
            }
        });

        let migrator = create_conversation_migrator();
        let state: ConversationState = migrator.load_flat_from("conversation", value).unwrap();

        assert!(Uuid::parse_str(&state.local_id).is_ok());
        assert_eq!(state.conversation_id(), Some("c"));
        assert_eq!(state.person.name.as_deref(), Some("Ada"));
        assert!(state.user_info.is_empty());
        let record = state
            .engagement
            .get("app#launch", EngagementNamespace::CodePoint)
            .unwrap();
        assert_eq!(record.invocation_count, 4);
        assert_eq!(record.total_count, 4);
    }

    #[test]
    fn test_save_writes_latest_version() {
        let migrator = create_conversation_migrator();
        let state = ConversationState {
            local_id: "local-1".to_string(),
            api_key: "key".to_string(),
            identity: None,
            app_release: AppRelease::default(),
            sdk: Sdk::default(),
            person: Person::default(),
            device: Device::default(),
            engagement: Engagement::default(),
            last_message_id: Some("m-9".to_string()),
            user_info: AttributeMap::new(),
            device_overrides: BTreeSet::from(["osVersion".to_string()]),
        };

        let saved = migrator
            .save_domain_flat("conversation", state.clone())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(value["version"], "1.1.0");
        assert_eq!(value["localId"], "local-1");

        let loaded: ConversationState = migrator.load_flat_from("conversation", value).unwrap();
        assert_eq!(loaded, state);
    }
}
