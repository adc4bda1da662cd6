//! Read-mostly commands: status, diff check, payloads and listing.

use anyhow::Result;
use serde_json::{Value, json};

use engage_core::conversation::{ConversationRepository, ConversationState};

use super::Session;

pub fn status(session: &Session) -> Value {
    let conversation = &session.conversation;
    json!({
        "status": conversation.status(),
        "dirty": conversation.is_dirty(),
        "conversation": redacted(conversation.state()),
    })
}

/// The state as JSON with the auth token masked.
fn redacted(state: &ConversationState) -> Value {
    let mut value = serde_json::to_value(state).unwrap_or(Value::Null);
    if let Some(token) = value.pointer_mut("/identity/token") {
        *token = Value::String("<redacted>".to_string());
    }
    value
}

pub fn check(session: &mut Session) -> Value {
    session.conversation.check_for_diffs();
    json!({
        "events": session.events(),
        "appRelease": session.conversation.app_release(),
        "sdk": session.conversation.sdk(),
        "device": session.conversation.device(),
    })
}

pub fn creation_payload(session: &Session) -> Value {
    session.conversation.creation_json()
}

pub fn update_payload(session: &Session) -> Value {
    session.conversation.update_json()
}

pub async fn list(session: &Session) -> Result<Value> {
    let items = session.repository().list().await?;
    Ok(serde_json::to_value(items)?)
}
