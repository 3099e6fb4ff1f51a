//! Scouting entry record and its identity key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Alliance an entry was scouted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllianceColor {
    Red,
    Blue,
}

impl AllianceColor {
    /// Wire string (`"red"` / `"blue"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }

    /// Parse the wire string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for AllianceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One team's recorded performance for one match.
///
/// Unrecognized fields survive a deserialize/serialize cycle through `extra`, so
/// re-exporting an entry never drops data a newer app version attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoutingEntry {
    pub event_key: String,
    pub match_key: String,
    pub match_number: u32,
    pub team_number: u32,
    pub alliance_color: AllianceColor,
    pub scout_name: String,
    /// Submission time, milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub no_show: bool,
    /// Game-specific scored content. Opaque to this workspace.
    #[serde(default)]
    pub game_data: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScoutingEntry {
    /// Identity key of this entry.
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey {
            event_key: self.event_key.clone(),
            match_key: self.match_key.clone(),
            team_number: self.team_number,
            alliance_color: self.alliance_color,
        }
    }

    /// Store-level identifier, derived from the identity key.
    #[must_use]
    pub fn id(&self) -> String {
        self.key().id()
    }

    /// Whether this entry is a placeholder with no scored content.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.no_show || self.game_data.is_empty()
    }
}

/// Identity of a scouting entry: (eventKey, matchKey, teamNumber, allianceColor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryKey {
    pub event_key: String,
    pub match_key: String,
    pub team_number: u32,
    pub alliance_color: AllianceColor,
}

impl EntryKey {
    /// Store id: `{eventKey}_{matchKey}_{allianceColor}_{teamNumber}`.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.event_key, self.match_key, self.alliance_color, self.team_number
        )
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "eventKey": "2025mimid",
            "matchKey": "qm12",
            "matchNumber": 12,
            "teamNumber": 1234,
            "allianceColor": "red",
            "scoutName": "Ada",
            "timestamp": 1_740_000_000_000_u64,
            "comments": "fast cycler",
            "noShow": false,
            "gameData": {"autoCoral": 3, "endgame": "deep"},
            "deviceId": "tablet-7"
        })
    }

    #[test]
    fn deserializes_camel_case_and_keeps_extras() {
        let entry: ScoutingEntry = serde_json::from_value(sample()).unwrap();
        assert_eq!(entry.team_number, 1234);
        assert_eq!(entry.alliance_color, AllianceColor::Red);
        assert_eq!(entry.extra.get("deviceId"), Some(&json!("tablet-7")));

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn missing_optional_fields_default() {
        let mut value = sample();
        let obj = value.as_object_mut().unwrap();
        obj.remove("comments");
        obj.remove("noShow");
        obj.remove("gameData");

        let entry: ScoutingEntry = serde_json::from_value(value).unwrap();
        assert!(entry.comments.is_empty());
        assert!(!entry.no_show);
        assert!(entry.is_placeholder());
    }

    #[test]
    fn id_is_derived_from_identity_key() {
        let entry: ScoutingEntry = serde_json::from_value(sample()).unwrap();
        assert_eq!(entry.id(), "2025mimid_qm12_red_1234");
        assert_eq!(entry.key().to_string(), entry.id());
    }

    #[test]
    fn alliance_parse() {
        assert_eq!(AllianceColor::parse("blue"), Some(AllianceColor::Blue));
        assert_eq!(AllianceColor::parse("Blue"), None);
    }
}
