//! Conversation state domain model.
//!
//! `ConversationState` is the plain-data part of a conversation: everything that
//! gets persisted. The live [`Conversation`](super::Conversation) wraps it with an
//! environment, an observer and a dirty flag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::engagement::Engagement;
use crate::error::{EngageError, Result};
use crate::snapshot::{AppRelease, AttributeMap, Device, Person, Sdk};

/// Server-issued identity of a conversation.
///
/// Token, person id and device id are assigned together, exactly once. The
/// conversation id is absent only for conversations migrated from the legacy
/// format, which never recorded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Token used to authorize requests for this conversation.
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub person_id: String,
    pub device_id: String,
}

impl Identity {
    /// Builds a server-issued identity.
    ///
    /// # Errors
    ///
    /// Returns `EngageError::InvalidIdentity` if any value is empty or blank.
    pub fn new(
        token: impl Into<String>,
        conversation_id: impl Into<String>,
        person_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            token: non_blank(token.into(), "token")?,
            conversation_id: Some(non_blank(conversation_id.into(), "conversation id")?),
            person_id: non_blank(person_id.into(), "person id")?,
            device_id: non_blank(device_id.into(), "device id")?,
        })
    }
}

fn non_blank(value: String, field: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(EngageError::invalid_identity(format!("{} is blank", field)));
    }
    Ok(value)
}

/// Whether a conversation has been registered with the server yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Created locally, waiting for the server to issue an identity.
    Pending,
    /// Identity assigned.
    Identified,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Identified => write!(f, "identified"),
        }
    }
}

/// All locally known state for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    /// Local identifier (UUID format), stable across restarts.
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
    /// Identifier of the last message downloaded from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<String>,
    /// Free-form key/value data stored on behalf of the host app.
    #[serde(default)]
    pub user_info: AttributeMap,
    /// Environment-derived device attributes set by the host app through
    /// `update_device`. Refreshing from the environment leaves them alone.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub device_overrides: BTreeSet<String>,
}

impl ConversationState {
    pub fn status(&self) -> ConversationStatus {
        if self.identity.is_some() {
            ConversationStatus::Identified
        } else {
            ConversationStatus::Pending
        }
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .and_then(|identity| identity.conversation_id.as_deref())
    }
}
