//! Error types shared across the sync crates.

use thiserror::Error;

/// Errors from the local store collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entry not found: {0}")]
    NotFound(String),

    #[error("store write failed: {0}")]
    WriteFailed(String),

    #[error("store read failed: {0}")]
    ReadFailed(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// User input rejected before any transport happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid match range: start {start}, end {end}")]
    InvalidMatchRange { start: u32, end: u32 },

    #[error("last-matches count must be at least 1")]
    InvalidLastCount,

    #[error("team filter is empty")]
    EmptyTeamFilter,

    #[error("invalid room code {code:?}: {reason}")]
    InvalidRoomCode { code: String, reason: String },
}
