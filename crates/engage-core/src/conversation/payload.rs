//! Request bodies derived from the conversation.
//!
//! Unlike change events these are total snapshots, not deltas. Sending them is
//! the transport's job.

use serde_json::{Map, Value};

use super::Conversation;
use crate::snapshot::{AppRelease, Device, Person, Sdk, Snapshot};

impl Conversation {
    /// Body of the request that registers a new conversation with the server.
    ///
    /// Only meaningful before the conversation is identified; afterwards the
    /// full payload is still returned and a warning is logged.
    pub fn creation_json(&self) -> Value {
        if self.is_identified() {
            tracing::warn!(
                "Creation payload requested for identified conversation {}",
                self.local_id()
            );
        }

        let mut body = Map::new();
        body.insert(
            AppRelease::KEY.to_string(),
            Value::Object(self.app_release().to_attributes()),
        );
        body.insert(Sdk::KEY.to_string(), Value::Object(self.sdk().to_attributes()));
        body.insert(
            Person::KEY.to_string(),
            Value::Object(self.person().to_attributes()),
        );
        body.insert(
            Device::KEY.to_string(),
            Value::Object(self.device().to_attributes()),
        );
        Value::Object(body)
    }

    /// Body of the request that updates an identified conversation.
    ///
    /// Carries the server ids plus the current app release and SDK. The token is
    /// not included; it authorizes the request instead. Before identification
    /// the id fields are omitted and a warning is logged.
    pub fn update_json(&self) -> Value {
        let mut body = Map::new();

        match self.identity() {
            Some(identity) => {
                if let Some(conversation_id) = &identity.conversation_id {
                    body.insert(
                        "conversationId".to_string(),
                        Value::String(conversation_id.clone()),
                    );
                }
                body.insert(
                    "personId".to_string(),
                    Value::String(identity.person_id.clone()),
                );
                body.insert(
                    "deviceId".to_string(),
                    Value::String(identity.device_id.clone()),
                );
            }
            None => {
                tracing::warn!(
                    "Update payload requested for unidentified conversation {}",
                    self.local_id()
                );
            }
        }

        body.insert(
            AppRelease::KEY.to_string(),
            Value::Object(self.app_release().to_attributes()),
        );
        body.insert(Sdk::KEY.to_string(), Value::Object(self.sdk().to_attributes()));
        Value::Object(body)
    }
}
