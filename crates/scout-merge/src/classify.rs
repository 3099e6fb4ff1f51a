//! Per-entry classification against the local replica.
//!
//! Rules, first match wins:
//!
//! 1. no stored entry under the identity key: auto-import
//! 2. stored entry equal in every field: duplicate, nothing to write
//! 3. stored entry is a placeholder (no-show or empty game data) and the
//!    incoming one is not: auto-replace
//! 4. equal material fingerprints, so only metadata differs: batch review
//! 5. anything else: conflict

use std::collections::BTreeSet;

use scout_core::ScoutingEntry;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Where an incoming entry goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    AutoImport,
    Duplicate,
    AutoReplace,
    BatchReview,
    Conflict,
}

/// Classify `incoming` against the stored entry with the same identity key.
#[must_use]
pub fn classify(incoming: &ScoutingEntry, existing: Option<&ScoutingEntry>) -> Classification {
    let Some(existing) = existing else {
        return Classification::AutoImport;
    };
    if incoming == existing {
        return Classification::Duplicate;
    }
    if existing.is_placeholder() && !incoming.is_placeholder() {
        return Classification::AutoReplace;
    }
    if material_fingerprint(incoming) == material_fingerprint(existing) {
        return Classification::BatchReview;
    }
    Classification::Conflict
}

/// BLAKE3 over the canonical JSON of the scored content
/// (`gameData`, `noShow`, `comments`).
///
/// Object keys serialize in sorted order, so the digest does not depend on
/// field order in the original payload.
#[must_use]
pub fn material_fingerprint(entry: &ScoutingEntry) -> blake3::Hash {
    let material = json!({
        "comments": entry.comments,
        "gameData": entry.game_data,
        "noShow": entry.no_show,
    });
    blake3::hash(material.to_string().as_bytes())
}

/// An incoming entry paired with the stored entry it collides with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictInfo {
    pub incoming: ScoutingEntry,
    pub existing: ScoutingEntry,
}

impl ConflictInfo {
    #[must_use]
    pub const fn new(incoming: ScoutingEntry, existing: ScoutingEntry) -> Self {
        Self { incoming, existing }
    }

    /// Fields that differ, for display. Game data keys are reported as
    /// `gameData.<key>`.
    #[must_use]
    pub fn differing_fields(&self) -> Vec<String> {
        let (a, b) = (&self.incoming, &self.existing);
        let mut fields = Vec::new();
        if a.scout_name != b.scout_name {
            fields.push("scoutName".to_string());
        }
        if a.timestamp != b.timestamp {
            fields.push("timestamp".to_string());
        }
        if a.comments != b.comments {
            fields.push("comments".to_string());
        }
        if a.no_show != b.no_show {
            fields.push("noShow".to_string());
        }
        let keys: BTreeSet<&String> = a.game_data.keys().chain(b.game_data.keys()).collect();
        fields.extend(
            keys.into_iter()
                .filter(|key| a.game_data.get(*key) != b.game_data.get(*key))
                .map(|key| format!("gameData.{key}")),
        );
        let extras: BTreeSet<&String> = a.extra.keys().chain(b.extra.keys()).collect();
        fields.extend(
            extras
                .into_iter()
                .filter(|key| a.extra.get(*key) != b.extra.get(*key))
                .map(String::clone),
        );
        fields
    }
}
