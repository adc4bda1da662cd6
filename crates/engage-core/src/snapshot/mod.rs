//! Immutable-per-version records describing the person, device, app release
//! and SDK of a conversation.
//!
//! Snapshots are never mutated in place by the conversation: an update works on
//! a copy, and the copy replaces the retained snapshot only after it has been
//! diffed against it.
//!
//! # Module Structure
//!
//! - `attribute`: Closed value type for free-form custom data (`AttributeValue`)
//! - `person`, `device`, `app_release`, `sdk`: The snapshot records
//!
//! Diffs are computed over each snapshot's serialized attribute map, so the
//! attribute names in a [`DiffPayload`] are the same camelCase keys that appear in
//! creation/update payloads.

mod app_release;
mod attribute;
mod device;
mod person;
mod sdk;

pub use app_release::AppRelease;
pub use attribute::{AttributeMap, AttributeValue};
pub use device::Device;
pub use person::Person;
pub use sdk::Sdk;

use serde::Serialize;
use serde_json::{Map, Value};

/// Mapping from attribute name to its new value.
///
/// Removed attributes are encoded as an explicit `null`.
pub type DiffPayload = Map<String, Value>;

/// A record of named attributes that supports diffing against a previous version.
pub trait Snapshot: Serialize + Clone + PartialEq {
    /// Name used as the payload key for this snapshot (e.g. `"device"`).
    const KEY: &'static str;

    /// Returns the attributes that differ between `previous` and `self`.
    fn diff_from(&self, previous: &Self) -> DiffPayload {
        diff_attributes(&attributes_of(previous), &attributes_of(self))
    }

    /// Serializes the snapshot into its attribute map.
    fn to_attributes(&self) -> DiffPayload {
        attributes_of(self)
    }
}

/// Serializes a value into an attribute map.
///
/// Anything that does not serialize to a JSON object yields an empty map, so
/// diffing never fails.
fn attributes_of<T: Serialize>(value: &T) -> DiffPayload {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!("Snapshot did not serialize to an object: {}", other);
            Map::new()
        }
        Err(e) => {
            tracing::warn!("Failed to serialize snapshot for diffing: {}", e);
            Map::new()
        }
    }
}

/// Compares two attribute maps.
///
/// Added and changed attributes carry their new value; attributes missing from
/// `current` are reported as `null`.
pub fn diff_attributes(previous: &DiffPayload, current: &DiffPayload) -> DiffPayload {
    let mut diff = Map::new();

    for (key, value) in current {
        if previous.get(key) != Some(value) {
            diff.insert(key.clone(), value.clone());
        }
    }

    for key in previous.keys() {
        if !current.contains_key(key) {
            diff.insert(key.clone(), Value::Null);
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> DiffPayload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_diff_reports_added_changed_and_removed() {
        let previous = map(json!({"a": 1, "b": "x", "c": true}));
        let current = map(json!({"a": 1, "b": "y", "d": null}));

        let diff = diff_attributes(&previous, &current);

        assert_eq!(Value::Object(diff), json!({"b": "y", "c": null, "d": null}));
    }

    #[test]
    fn test_diff_of_identical_maps_is_empty() {
        let previous = map(json!({"a": {"nested": [1, 2]}}));
        assert!(diff_attributes(&previous, &previous.clone()).is_empty());
    }

    #[test]
    fn test_snapshot_diff_uses_serialized_names() {
        let previous = Device {
            os_version: Some("16.0".to_string()),
            ..Device::default()
        };
        let current = Device {
            os_version: Some("17.0".to_string()),
            ..Device::default()
        };

        assert_eq!(
            Value::Object(current.diff_from(&previous)),
            json!({"osVersion": "17.0"})
        );
    }
}
