//! Conversation data persisted by older SDK releases.
//!
//! Older releases stored only the authorization token and the server ids of
//! the person and device. The record is read once to seed a new conversation
//! and is never written back.

use serde::{Deserialize, Serialize};

use super::model::Identity;
use crate::error::{EngageError, Result};

/// The legacy `(token, personID, deviceID)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegacyConversation {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "personID")]
    pub person_id: Option<String>,
    #[serde(default, rename = "deviceID")]
    pub device_id: Option<String>,
}

impl LegacyConversation {
    pub fn new(
        token: impl Into<String>,
        person_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            token: Some(token.into()),
            person_id: Some(person_id.into()),
            device_id: Some(device_id.into()),
        }
    }

    /// Converts the triple into an identity without a conversation id.
    ///
    /// # Errors
    ///
    /// Returns `EngageError::Migration` if the token, person id or device id is
    /// missing or empty.
    pub fn into_identity(self) -> Result<Identity> {
        let token = required(self.token, "token")?;
        let person_id = required(self.person_id, "personID")?;
        let device_id = required(self.device_id, "deviceID")?;

        Ok(Identity {
            token,
            conversation_id: None,
            person_id,
            device_id,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(EngageError::migration(format!(
            "Legacy conversation is missing '{}'",
            field
        ))),
    }
}
