//! Compression configuration.

use serde::{Deserialize, Serialize};

/// Serialized payloads larger than this are compressed.
pub const COMPRESSION_THRESHOLD_BYTES: usize = 10_000;

/// Compression selector configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Payloads whose JSON is at most this many bytes travel uncompressed.
    ///
    /// Default: 10000
    pub threshold_bytes: usize,

    /// Gzip level (0-9).
    ///
    /// Default: 9
    pub gzip_level: u32,

    /// Try the schema-aware scouting codec.
    ///
    /// Default: true
    pub schema_aware: bool,

    /// Minimum occurrences for a string value to enter the value dictionary.
    ///
    /// Default: 3
    pub value_min_occurrences: usize,

    /// Minimum length in characters for a dictionary string value.
    ///
    /// Default: 4
    pub value_min_chars: usize,

    /// Maximum number of dictionary string values.
    ///
    /// Default: 256
    pub value_dictionary_limit: usize,

    /// Refuse to inflate payloads beyond this many bytes.
    ///
    /// Default: 64MB
    pub max_decoded_bytes: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: COMPRESSION_THRESHOLD_BYTES,
            gzip_level: 9,
            schema_aware: true,
            value_min_occurrences: 3,
            value_min_chars: 4,
            value_dictionary_limit: 256,
            max_decoded_bytes: 64 * 1024 * 1024,
        }
    }
}
