//! Person, device and user info updates.

use anyhow::Result;
use serde_json::{Value, json};

use engage_core::snapshot::AttributeValue;

use super::{Session, parse_assignments};

pub fn person(
    session: &mut Session,
    name: Option<String>,
    email: Option<String>,
    set: &[String],
    unset: &[String],
) -> Result<Value> {
    let assignments = parse_assignments(set)?;

    let diff = session.conversation.update_person(|mut person| {
        if let Some(name) = name {
            person.name = Some(name);
        }
        if let Some(email) = email {
            person.email_address = Some(email);
        }
        for (key, value) in assignments {
            person.set_custom_data(key, value);
        }
        for key in unset {
            person.remove_custom_data(key);
        }
        person
    });

    Ok(json!({
        "diff": diff,
        "person": session.conversation.person(),
        "events": session.events(),
    }))
}

pub fn device(session: &mut Session, set: &[String], unset: &[String]) -> Result<Value> {
    let assignments = parse_assignments(set)?;

    let diff = session.conversation.update_device(|mut device| {
        for (key, value) in assignments {
            device.set_custom_data(key, value);
        }
        for key in unset {
            device.remove_custom_data(key);
        }
        device
    });

    Ok(json!({
        "diff": diff,
        "device": session.conversation.device(),
        "events": session.events(),
    }))
}

pub fn set_user_info(session: &mut Session, key: String, value: &str) -> Value {
    session
        .conversation
        .set_user_info(key, AttributeValue::parse_literal(value));
    user_info(session)
}

pub fn remove_user_info(session: &mut Session, key: &str) -> Value {
    session.conversation.remove_user_info(key);
    user_info(session)
}

fn user_info(session: &Session) -> Value {
    json!({
        "userInfo": session.conversation.user_info(),
        "events": session.events(),
    })
}
