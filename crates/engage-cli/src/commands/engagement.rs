use serde_json::{Value, json};

use engage_core::engagement::EngagementNamespace;

use super::Session;

fn namespace(interaction: bool) -> EngagementNamespace {
    if interaction {
        EngagementNamespace::Interaction
    } else {
        EngagementNamespace::CodePoint
    }
}

pub fn warm(session: &mut Session, key: &str, interaction: bool) -> Value {
    let namespace = namespace(interaction);
    session.conversation.warm(key, namespace);
    record(session, key, namespace)
}

pub fn engage(session: &mut Session, key: &str, interaction: bool) -> Value {
    let namespace = namespace(interaction);
    session.conversation.engage(key, namespace);
    record(session, key, namespace)
}

fn record(session: &Session, key: &str, namespace: EngagementNamespace) -> Value {
    json!({
        "key": key,
        "namespace": namespace.to_string(),
        "record": session.conversation.engagement().get(key, namespace),
        "events": session.events(),
    })
}
