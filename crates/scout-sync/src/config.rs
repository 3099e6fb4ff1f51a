//! Aggregate configuration loaded from TOML.
//!
//! ```toml
//! [compression]
//! threshold_bytes = 10000
//!
//! [fountain]
//! profile = "reliable"
//!
//! [session]
//! join_timeout = 30
//!
//! [session.reconnect]
//! max_attempts = 1
//!
//! [merge]
//! undo_depth = 10
//!
//! [telemetry]
//! log_level = "info"
//! ```
//!
//! Every section and every key is optional.

use std::path::Path;

use scout_compress::CompressionConfig;
use scout_fountain::FountainConfig;
use scout_merge::MergeConfig;
use scout_session::{MAX_ROOM_CODE_LEN, MIN_ROOM_CODE_LEN, SessionConfig};
use scout_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Configuration for every subsystem.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub compression: CompressionConfig,
    pub fountain: FountainConfig,
    pub session: SessionConfig,
    pub merge: MergeConfig,
    pub telemetry: TelemetryConfig,
}

impl SyncConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let len = self.session.room_code_length;
        if !(MIN_ROOM_CODE_LEN..=MAX_ROOM_CODE_LEN).contains(&len) {
            return Err(ConfigError::Invalid(format!(
                "session.room_code_length must be {MIN_ROOM_CODE_LEN}-{MAX_ROOM_CODE_LEN}, got {len}"
            )));
        }
        if self.session.join_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "session.join_timeout must be positive".to_string(),
            ));
        }
        if self.compression.gzip_level > 9 {
            return Err(ConfigError::Invalid(format!(
                "compression.gzip_level must be 0-9, got {}",
                self.compression.gzip_level
            )));
        }
        if self.merge.undo_depth == 0 {
            return Err(ConfigError::Invalid(
                "merge.undo_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
