use anyhow::Result;
use serde_json::{Value, json};

use super::Session;

/// Records the server-issued identity; fails if one is already set.
pub fn set_token(
    session: &mut Session,
    token: &str,
    conversation_id: &str,
    person_id: &str,
    device_id: &str,
) -> Result<Value> {
    session
        .conversation
        .set_token(token, conversation_id, person_id, device_id)?;

    Ok(json!({
        "status": session.conversation.status(),
        "identity": session.conversation.identity(),
        "events": session.events(),
    }))
}
