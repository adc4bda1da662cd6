//! Closed value type for free-form attributes.
//!
//! Custom data on person/device snapshots and the conversation's user info
//! all store values of this type instead of arbitrary JSON.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// A free-form attribute value: string, number, boolean or null.
///
/// Numbers keep their JSON representation, so integers round-trip exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Mapping from attribute key to value, ordered for stable serialization.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    /// Parses a command-line style literal.
    ///
    /// `null`, `true`/`false`, integers and finite floats map to their typed
    /// variants; everything else is kept as a string.
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "null" => Self::Null,
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => {
                if let Ok(n) = raw.parse::<i64>() {
                    return Self::Number(n.into());
                }
                match raw.parse::<f64>().ok().and_then(Number::from_f64) {
                    Some(n) => Self::Number(n),
                    None => Self::String(raw.to_string()),
                }
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// NaN and infinities have no JSON form and become `Null`.
impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        assert_eq!(AttributeValue::parse_literal("null"), AttributeValue::Null);
        assert_eq!(AttributeValue::parse_literal("true"), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::parse_literal("42"), AttributeValue::from(42i64));
        assert_eq!(AttributeValue::parse_literal("2.5"), AttributeValue::from(2.5));
        assert_eq!(
            AttributeValue::parse_literal("gold"),
            AttributeValue::String("gold".to_string())
        );
        assert_eq!(
            AttributeValue::parse_literal("NaN"),
            AttributeValue::String("NaN".to_string())
        );
    }

    #[test]
    fn test_untagged_json_shape() {
        let mut map = AttributeMap::new();
        map.insert("tier".to_string(), "gold".into());
        map.insert("visits".to_string(), 3i64.into());
        map.insert("beta".to_string(), true.into());
        map.insert("cleared".to_string(), AttributeValue::Null);

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"beta": true, "cleared": null, "tier": "gold", "visits": 3})
        );

        let back: AttributeMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_numbers_survive_json() {
        let large = AttributeValue::from(9_007_199_254_740_993i64);
        let json = serde_json::to_string(&large).unwrap();
        assert_eq!(json, "9007199254740993");
        let back: AttributeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, large);

        let ratio = AttributeValue::from(0.25);
        let back: AttributeValue =
            serde_json::from_str(&serde_json::to_string(&ratio).unwrap()).unwrap();
        assert_eq!(back, ratio);
    }

    #[test]
    fn test_non_finite_floats_become_null() {
        assert_eq!(AttributeValue::from(f64::NAN), AttributeValue::Null);
        assert_eq!(AttributeValue::from(f64::INFINITY), AttributeValue::Null);
    }
}
