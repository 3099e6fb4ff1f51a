//! Numeric room codes.

use std::fmt;

use rand::Rng;
use scout_core::ValidationError;
use serde::{Deserialize, Serialize};

/// Shortest accepted room code.
pub const MIN_ROOM_CODE_LEN: usize = 4;

/// Longest accepted room code.
pub const MAX_ROOM_CODE_LEN: usize = 8;

/// A short decimal code naming a signaling rendezvous.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Generate a random code of `len` digits, clamped to the accepted range.
    #[must_use]
    pub fn generate(len: usize) -> Self {
        let len = len.clamp(MIN_ROOM_CODE_LEN, MAX_ROOM_CODE_LEN);
        let mut rng = rand::thread_rng();
        Self(
            (0..len)
                .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                .collect(),
        )
    }

    /// Validate user input. Surrounding whitespace is ignored.
    pub fn parse(input: &str, expected_len: usize) -> Result<Self, ValidationError> {
        let code = input.trim();
        let invalid = |reason: String| ValidationError::InvalidRoomCode {
            code: code.to_string(),
            reason,
        };
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("room codes contain digits only".into()));
        }
        if code.len() != expected_len {
            return Err(invalid(format!("expected {expected_len} digits")));
        }
        Ok(Self(code.to_string()))
    }

    /// The digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
