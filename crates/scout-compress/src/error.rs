//! Compression error types.

use thiserror::Error;

/// Errors while encoding or decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressError {
    /// Empty byte string where an encoded payload was expected.
    #[error("cannot decode empty payload")]
    EmptyPayload,

    /// Variant tag not recognized.
    #[error("unknown encoding variant tag {0}")]
    UnknownVariant(u8),

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(String),

    /// Gzip stream failed.
    #[error("gzip error: {0}")]
    Gzip(String),

    /// Inflated payload exceeded the configured limit.
    #[error("decoded payload exceeds {limit} bytes")]
    DecodedTooLarge {
        /// Configured limit.
        limit: usize,
    },

    /// Encoded document is structurally invalid for its variant.
    #[error("malformed {variant} document: {reason}")]
    Malformed {
        /// Variant being decoded.
        variant: &'static str,
        /// What was wrong.
        reason: String,
    },
}

impl CompressError {
    pub(crate) fn malformed(variant: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            variant,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CompressError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
