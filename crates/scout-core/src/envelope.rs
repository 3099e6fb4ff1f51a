//! Transfer envelopes, one shape per [`DataType`](crate::DataType).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ScoutingEntry;

/// Version string stamped on entry exports.
pub const EXPORT_VERSION: &str = "1.0";

/// `{entries, version, exportedAt}`, used for scouting and pit-scouting data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriesEnvelope<T = ScoutingEntry> {
    pub entries: Vec<T>,
    #[serde(default = "default_version")]
    pub version: String,
    /// Export time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub exported_at: i64,
}

fn default_version() -> String {
    EXPORT_VERSION.to_string()
}

impl<T> EntriesEnvelope<T> {
    /// Wrap entries, stamping the current time.
    #[must_use]
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            entries,
            version: default_version(),
            exported_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// `{matches}`: the match schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchScheduleEnvelope {
    pub matches: Vec<Value>,
}

/// `{scouts, predictions, achievements}`: scout profile data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default)]
    pub scouts: Vec<Value>,
    #[serde(default)]
    pub predictions: Vec<Value>,
    #[serde(default)]
    pub achievements: Vec<Value>,
}

impl ProfileEnvelope {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scouts.is_empty() && self.predictions.is_empty() && self.achievements.is_empty()
    }
}

/// Scouting entries and profile data in one transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedEnvelope {
    pub entries: EntriesEnvelope<ScoutingEntry>,
    #[serde(default)]
    pub profiles: ProfileEnvelope,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_envelope_defaults_version() {
        let env: EntriesEnvelope<Value> =
            serde_json::from_value(json!({"entries": [{"teamNumber": 1}]})).unwrap();
        assert_eq!(env.version, EXPORT_VERSION);
        assert_eq!(env.exported_at, 0);
    }

    #[test]
    fn entries_envelope_uses_camel_case() {
        let env = EntriesEnvelope::<Value> {
            entries: vec![],
            version: "1.0".into(),
            exported_at: 42,
        };
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"entries": [], "version": "1.0", "exportedAt": 42})
        );
    }

    #[test]
    fn profile_envelope_tolerates_missing_lists() {
        let env: ProfileEnvelope = serde_json::from_value(json!({"scouts": [{"name": "Ada"}]}))
            .unwrap();
        assert_eq!(env.scouts.len(), 1);
        assert!(env.predictions.is_empty());
        assert!(!env.is_empty());
    }
}
