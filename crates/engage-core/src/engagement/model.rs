//! Engagement history domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key space an engagement event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementNamespace {
    /// Application-defined events counted for targeting only.
    CodePoint,
    /// Presentable SDK features (surveys, message center, ...).
    Interaction,
}

impl fmt::Display for EngagementNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodePoint => write!(f, "code_point"),
            Self::Interaction => write!(f, "interaction"),
        }
    }
}

/// Invocation statistics for one event key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRecord {
    /// Invocations since the current app version/build was first seen.
    pub invocation_count: u64,

    /// Invocations over the lifetime of the conversation.
    #[serde(default)]
    pub total_count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_invoked: Option<DateTime<Utc>>,
}

impl EngagementRecord {
    /// A warm record: registered but never invoked.
    pub fn warm() -> Self {
        Self::default()
    }

    pub fn is_warm(&self) -> bool {
        self.invocation_count == 0 && self.last_invoked.is_none()
    }
}

/// Per-key engagement statistics for code points and interactions.
///
/// The two namespaces share structure but never keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    #[serde(default)]
    pub code_points: BTreeMap<String, EngagementRecord>,

    #[serde(default)]
    pub interactions: BTreeMap<String, EngagementRecord>,
}

impl Engagement {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self, namespace: EngagementNamespace) -> &BTreeMap<String, EngagementRecord> {
        match namespace {
            EngagementNamespace::CodePoint => &self.code_points,
            EngagementNamespace::Interaction => &self.interactions,
        }
    }

    fn records_mut(
        &mut self,
        namespace: EngagementNamespace,
    ) -> &mut BTreeMap<String, EngagementRecord> {
        match namespace {
            EngagementNamespace::CodePoint => &mut self.code_points,
            EngagementNamespace::Interaction => &mut self.interactions,
        }
    }

    /// Returns the record for `key`, if it has been warmed or engaged.
    pub fn get(&self, key: &str, namespace: EngagementNamespace) -> Option<&EngagementRecord> {
        self.records(namespace).get(key)
    }

    /// Invocation count since the last version/build change; 0 for unknown keys.
    pub fn invocation_count(&self, key: &str, namespace: EngagementNamespace) -> u64 {
        self.get(key, namespace)
            .map(|r| r.invocation_count)
            .unwrap_or(0)
    }

    /// Registers `key` with a zero count. Returns `true` if the key was new.
    pub fn warm(&mut self, key: &str, namespace: EngagementNamespace) -> bool {
        let records = self.records_mut(namespace);
        if records.contains_key(key) {
            return false;
        }
        records.insert(key.to_string(), EngagementRecord::warm());
        true
    }

    /// Records one invocation of `key` at `now`, warming it first if needed.
    pub fn engage(
        &mut self,
        key: &str,
        namespace: EngagementNamespace,
        now: DateTime<Utc>,
    ) -> &EngagementRecord {
        let record = self
            .records_mut(namespace)
            .entry(key.to_string())
            .or_insert_with(EngagementRecord::warm);
        record.invocation_count += 1;
        record.total_count += 1;
        record.last_invoked = Some(now);
        record
    }

    /// Zeroes every invocation count when the app version or build changed.
    ///
    /// Keys, lifetime totals and timestamps are retained. Returns `true` if a
    /// reset happened.
    pub fn reset_on_version_change(
        &mut self,
        current_version: Option<&str>,
        current_build: Option<&str>,
        stored_version: Option<&str>,
        stored_build: Option<&str>,
    ) -> bool {
        if current_version == stored_version && current_build == stored_build {
            return false;
        }

        tracing::debug!(
            "App release changed ({:?}/{:?} -> {:?}/{:?}), resetting invocation counts",
            stored_version,
            stored_build,
            current_version,
            current_build
        );

        for record in self
            .code_points
            .values_mut()
            .chain(self.interactions.values_mut())
        {
            record.invocation_count = 0;
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.code_points.is_empty() && self.interactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CP: EngagementNamespace = EngagementNamespace::CodePoint;
    const IX: EngagementNamespace = EngagementNamespace::Interaction;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_warm_registers_zero_count_once() {
        let mut engagement = Engagement::new();

        assert!(engagement.warm("app#launch", CP));
        assert!(!engagement.warm("app#launch", CP));

        let record = engagement.get("app#launch", CP).unwrap();
        assert!(record.is_warm());
        assert!(engagement.get("app#launch", IX).is_none());
    }

    #[test]
    fn test_warm_does_not_clear_engaged_record() {
        let mut engagement = Engagement::new();
        engagement.engage("app#launch", CP, at(10));
        engagement.warm("app#launch", CP);
        assert_eq!(engagement.invocation_count("app#launch", CP), 1);
    }

    #[test]
    fn test_engage_increments_by_one_and_stamps_time() {
        let mut engagement = Engagement::new();
        engagement.warm("survey-1", IX);

        let record = engagement.engage("survey-1", IX, at(100)).clone();
        assert_eq!(record.invocation_count, 1);
        assert_eq!(record.last_invoked, Some(at(100)));

        let record = engagement.engage("survey-1", IX, at(200)).clone();
        assert_eq!(record.invocation_count, 2);
        assert_eq!(record.total_count, 2);
        assert_eq!(record.last_invoked, Some(at(200)));
    }

    #[test]
    fn test_engage_unknown_key_creates_record() {
        let mut engagement = Engagement::new();
        engagement.engage("never-warmed", CP, at(5));
        assert_eq!(engagement.invocation_count("never-warmed", CP), 1);
    }

    #[test]
    fn test_reset_on_version_change() {
        let cases = [
            // (current_version, current_build, stored_version, stored_build, reset)
            (Some("1.0"), Some("1"), Some("1.0"), Some("1"), false),
            (Some("1.1"), Some("1"), Some("1.0"), Some("1"), true),
            (Some("1.0"), Some("2"), Some("1.0"), Some("1"), true),
            (Some("1.1"), Some("2"), Some("1.0"), Some("1"), true),
            (None, None, None, None, false),
            (Some("1.0"), None, None, None, true),
        ];

        for (cv, cb, sv, sb, expected) in cases {
            let mut engagement = Engagement::new();
            engagement.engage("a", CP, at(1));
            engagement.engage("b", IX, at(2));
            engagement.warm("c", CP);

            let reset = engagement.reset_on_version_change(cv, cb, sv, sb);
            assert_eq!(reset, expected, "case {:?}", (cv, cb, sv, sb));

            let expected_count = if expected { 0 } else { 1 };
            assert_eq!(engagement.invocation_count("a", CP), expected_count);
            assert_eq!(engagement.invocation_count("b", IX), expected_count);
            // Keys, totals and timestamps survive.
            assert!(engagement.get("c", CP).is_some());
            assert_eq!(engagement.get("a", CP).unwrap().total_count, 1);
            assert_eq!(engagement.get("b", IX).unwrap().last_invoked, Some(at(2)));
        }
    }

    #[test]
    fn test_reset_is_idempotent_when_unchanged() {
        let mut engagement = Engagement::new();
        engagement.engage("a", CP, at(1));
        assert!(!engagement.reset_on_version_change(Some("2"), Some("7"), Some("2"), Some("7")));
        assert!(!engagement.reset_on_version_change(Some("2"), Some("7"), Some("2"), Some("7")));
        assert_eq!(engagement.invocation_count("a", CP), 1);
    }
}
