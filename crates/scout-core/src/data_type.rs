//! Dataset kinds exchanged between devices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of dataset carried by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    /// Match scouting entries.
    #[serde(rename = "scouting")]
    Scouting,
    /// Pit scouting entries.
    #[serde(rename = "pit-scouting")]
    PitScouting,
    /// Match schedule.
    #[serde(rename = "match")]
    Match,
    /// Scout profiles, predictions and achievements.
    #[serde(rename = "scout")]
    Scout,
    /// Scouting entries plus profile data.
    #[serde(rename = "combined")]
    Combined,
}

impl DataType {
    /// Every data type, in wire order.
    pub const ALL: [Self; 5] = [
        Self::Scouting,
        Self::PitScouting,
        Self::Match,
        Self::Scout,
        Self::Combined,
    ];

    /// Wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scouting => "scouting",
            Self::PitScouting => "pit-scouting",
            Self::Match => "match",
            Self::Scout => "scout",
            Self::Combined => "combined",
        }
    }

    /// Whether request filters apply to this data type.
    #[must_use]
    pub const fn supports_filters(self) -> bool {
        matches!(self, Self::Scouting | Self::PitScouting | Self::Combined)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown data type: {s}"))
    }
}
