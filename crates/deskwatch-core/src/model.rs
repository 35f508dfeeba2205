//! Domain types shared across the crate: item kinds, tracked items, and
//! comments as observed from the service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of service-desk item the tracker follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Incident,
    Change,
}

impl ItemKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Incident => "incident",
            Self::Change => "change",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "incident" => Ok(Self::Incident),
            "change" => Ok(Self::Change),
            _ => Err(ParseEnumError {
                expected: "item kind",
                got: s.to_string(),
            }),
        }
    }
}

/// One incident or change as observed from the service.
///
/// Identity is `id`; two fetches with the same id describe the same logical
/// entity at different points in time. Everything else is a point-in-time
/// reading and may differ between fetches. Fields the service left out stay
/// `None` rather than being faked up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackedItem {
    pub id: String,
    pub number: String,
    pub subject: String,
    /// Human-readable status label, `"Unknown"` when the service omits it.
    pub status: String,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    pub category: Option<String>,
    pub caller: Option<String>,
    pub priority: Option<String>,
    /// Change template name; incidents never carry one.
    pub template: Option<String>,
    pub description: Option<String>,
}

/// A single comment on a tracked item.
///
/// Comments carry no stable id of their own; recency is decided purely by
/// `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub author: String,
    pub created_at: String,
    pub text: String,
}

/// Error returned when parsing an enum value from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_kind_json_roundtrips() {
        for kind in [ItemKind::Incident, ItemKind::Change] {
            let json = serde_json::to_string(&kind).expect("serialize");
            let back: ItemKind = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, kind);
        }
        assert_eq!(
            serde_json::to_string(&ItemKind::Incident).expect("serialize"),
            "\"incident\""
        );
    }

    #[test]
    fn item_kind_display_parse_roundtrips() {
        for kind in [ItemKind::Incident, ItemKind::Change] {
            let parsed: ItemKind = kind.to_string().parse().expect("parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn item_kind_parse_is_forgiving_about_case_and_whitespace() {
        assert_eq!(
            "  Incident ".parse::<ItemKind>().expect("parse"),
            ItemKind::Incident
        );
        assert_eq!(
            "CHANGE".parse::<ItemKind>().expect("parse"),
            ItemKind::Change
        );
    }

    #[test]
    fn item_kind_parse_rejects_unknown_values() {
        let err = "ticket".parse::<ItemKind>().expect_err("should reject");
        assert_eq!(err.to_string(), "invalid item kind: 'ticket'");
    }

    #[test]
    fn tracked_item_deserializes_with_missing_fields() {
        let item: TrackedItem =
            serde_json::from_str(r#"{"id": "abc", "status": "open"}"#).expect("deserialize");
        assert_eq!(item.id, "abc");
        assert_eq!(item.status, "open");
        assert_eq!(item.number, "");
        assert_eq!(item.priority, None);
    }
}
