//! Sync error types.

use std::path::PathBuf;

use scout_compress::CompressError;
use scout_core::{DataType, StoreError, ValidationError};
use scout_fountain::{DecodeError, EncodeError};
use scout_merge::MergeError;
use scout_session::SessionError;
use thiserror::Error;

/// A received payload could not be imported. The pipeline keeps the payload
/// queued so the import can be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("no handler registered for {0}")]
    UnsupportedDataType(DataType),

    #[error("invalid {data_type} payload: {reason}")]
    InvalidPayload { data_type: DataType, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("local store failure: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl ImportError {
    pub(crate) fn invalid(data_type: DataType, reason: impl ToString) -> Self {
        Self::InvalidPayload {
            data_type,
            reason: reason.to_string(),
        }
    }
}

/// QR transfer failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The reconstructed payload is not a dataset message.
    #[error("reconstructed payload is not a dataset: {0}")]
    NotADataset(String),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Umbrella error for operations spanning the session and the local store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}
