use serde::{Deserialize, Serialize};

use super::{AttributeMap, AttributeValue, Snapshot};

/// The person (end user) associated with a conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,

    /// Identifier of the person in an external analytics system, if linked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mparticle_id: Option<String>,

    /// Developer-supplied attributes used by targeting criteria.
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub custom_data: AttributeMap,
}

impl Person {
    pub fn set_custom_data(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.custom_data.insert(key.into(), value.into());
    }

    pub fn remove_custom_data(&mut self, key: &str) {
        self.custom_data.remove(key);
    }
}

impl Snapshot for Person {
    const KEY: &'static str = "person";
}
