//! Test fixtures for scouting data.
//!
//! Everything here is deterministic so sizes and classifications are stable
//! across runs.

use scout_core::{AllianceColor, EntriesEnvelope, ScoutingEntry};
use serde_json::{Map, Value, json};

/// Event key used by every fixture entry.
pub const EVENT_KEY: &str = "2025mimid";

/// Base timestamp (ms) for fixture entries.
pub const BASE_TIMESTAMP: u64 = 1_740_000_000_000;

const SCOUTS: [&str; 4] = ["Ada", "Grace", "Linus", "Margaret"];
const COMMENTS: [&str; 4] = [
    "",
    "fast cycles, strong defense",
    "tipped during endgame",
    "",
];

// ─────────────────────────────────────────────────────────────────────────────
// Entry Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// A scored entry for `(match_number, team, alliance)`.
#[must_use]
pub fn entry(match_number: u32, team: u32, alliance: AllianceColor) -> ScoutingEntry {
    entry_with_scores(
        match_number,
        team,
        alliance,
        &json!({
            "autoCoral": match_number % 4,
            "teleopCoral": (team + match_number) % 9,
            "teleopAlgae": team % 3,
            "endgame": if team % 2 == 0 { "deep" } else { "park" },
        }),
    )
}

/// An entry with the given `gameData` object.
///
/// # Panics
///
/// Panics if `game_data` is not a JSON object.
#[must_use]
pub fn entry_with_scores(
    match_number: u32,
    team: u32,
    alliance: AllianceColor,
    game_data: &Value,
) -> ScoutingEntry {
    ScoutingEntry {
        event_key: EVENT_KEY.to_string(),
        match_key: format!("qm{match_number}"),
        match_number,
        team_number: team,
        alliance_color: alliance,
        scout_name: "Ada".to_string(),
        timestamp: BASE_TIMESTAMP + u64::from(match_number) * 60_000,
        comments: String::new(),
        no_show: false,
        game_data: game_data
            .as_object()
            .cloned()
            .expect("game data fixture must be an object"),
        extra: Map::new(),
    }
}

/// A no-show placeholder entry with no scored content.
#[must_use]
pub fn placeholder_entry(match_number: u32, team: u32, alliance: AllianceColor) -> ScoutingEntry {
    ScoutingEntry {
        no_show: true,
        game_data: Map::new(),
        ..entry(match_number, team, alliance)
    }
}

/// `count` entries spread over matches of six teams each, with rotating scouts
/// and comments.
#[must_use]
pub fn synthetic_entries(count: usize) -> Vec<ScoutingEntry> {
    (0..count)
        .map(|i| {
            let index = u32::try_from(i).unwrap_or(u32::MAX);
            let match_number = index / 6 + 1;
            let slot = index % 6;
            let alliance = if slot < 3 {
                AllianceColor::Red
            } else {
                AllianceColor::Blue
            };
            let team = 100 + (index * 37) % 900;
            let mut e = entry(match_number, team, alliance);
            e.scout_name = SCOUTS[i % SCOUTS.len()].to_string();
            e.comments = COMMENTS[i % COMMENTS.len()].to_string();
            e.timestamp += u64::from(slot) * 1_000;
            e.game_data.insert("cycleTimes".into(), json!([12.5, 10.0, 9.75]));
            e.game_data.insert("defense".into(), json!(slot % 2 == 0));
            e
        })
        .collect()
}

/// A scouting export of `count` synthetic entries with a fixed export time.
#[must_use]
pub fn synthetic_export(count: usize) -> EntriesEnvelope {
    EntriesEnvelope {
        entries: synthetic_entries(count),
        version: scout_core::EXPORT_VERSION.to_string(),
        exported_at: 1_740_003_600_000,
    }
}

/// [`synthetic_export`] as a JSON value.
///
/// # Panics
///
/// Panics if the export cannot be serialized (never for fixture data).
#[must_use]
pub fn synthetic_export_value(count: usize) -> Value {
    serde_json::to_value(synthetic_export(count)).expect("fixture export serializes")
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// Generic JSON payloads.
pub mod json {
    use serde_json::{Value, json};

    /// An object whose compact serialization is exactly `bytes` long.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is smaller than the 10-byte wrapper `{"pad":""}`.
    #[must_use]
    pub fn padded_payload(bytes: usize) -> Value {
        const WRAPPER: usize = r#"{"pad":""}"#.len();
        assert!(bytes >= WRAPPER, "payload must be at least {WRAPPER} bytes");
        json!({ "pad": "x".repeat(bytes - WRAPPER) })
    }

    /// A payload of `values` pseudo-random integers that gzip barely
    /// shrinks, for transfers that must span several blocks.
    #[must_use]
    pub fn noisy_payload(values: usize) -> Value {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let samples: Vec<u64> = (0..values)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state % 1_000_000_007
            })
            .collect();
        json!({ "samples": samples })
    }

    /// A small match schedule.
    #[must_use]
    pub fn match_schedule(matches: u32) -> Value {
        let matches: Vec<Value> = (1..=matches)
            .map(|n| {
                json!({
                    "matchNumber": n,
                    "matchKey": format!("qm{n}"),
                    "redTeams": [100 + n, 200 + n, 300 + n],
                    "blueTeams": [400 + n, 500 + n, 600 + n],
                })
            })
            .collect();
        json!({ "matches": matches })
    }

    /// Scout profile data.
    #[must_use]
    pub fn profiles() -> Value {
        json!({
            "scouts": [{"name": "Ada", "stakes": 20}, {"name": "Grace", "stakes": 35}],
            "predictions": [{"scoutName": "Ada", "matchNumber": 3, "predictedWinner": "red"}],
            "achievements": [{"scoutName": "Grace", "achievementId": "first-match"}],
        })
    }

    /// A pit-scouting export.
    #[must_use]
    pub fn pit_scouting(teams: &[u32]) -> Value {
        let entries: Vec<Value> = teams
            .iter()
            .map(|team| {
                json!({
                    "eventKey": super::EVENT_KEY,
                    "teamNumber": team,
                    "scoutName": "Linus",
                    "timestamp": super::BASE_TIMESTAMP,
                    "drivetrain": "swerve",
                    "weight": 120,
                })
            })
            .collect();
        json!({ "entries": entries, "version": "1.0", "exportedAt": super::BASE_TIMESTAMP })
    }
}
