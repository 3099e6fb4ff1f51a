//! Logging for the scout sync tools.
//!
//! Everything is written to stderr so binaries can keep stdout for data.
//! `RUST_LOG` wins over the configured level when set. Payloads that reach
//! the logs go through a [`Redactor`] first; by default it masks SDP blobs
//! and room codes, which are enough to join someone else's session.
//!
//! ```rust,ignore
//! let config = scout_telemetry::TelemetryConfig::default();
//! scout_telemetry::init_telemetry(&config)?;
//! config.redactor().log("received", &payload);
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

mod logging;

pub use logging::{Redactor, init_telemetry, redact_sensitive};

use serde::{Deserialize, Serialize};

/// The `[telemetry]` section of the sync config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Stamped on the startup event.
    pub service_name: String,

    /// Filter directive used when `RUST_LOG` is unset, e.g.
    /// `"info,scout_session=debug"`.
    pub log_level: String,

    /// One JSON object per line instead of the human format.
    pub json_logs: bool,

    /// Object keys to mask, matched case-insensitively as substrings.
    pub redact_fields: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "scout".into(),
            log_level: "info".into(),
            json_logs: false,
            redact_fields: ["sdp", "roomCode", "room_code"].map(String::from).to_vec(),
        }
    }
}

impl TelemetryConfig {
    /// A redactor for this config's fields.
    #[must_use]
    pub fn redactor(&self) -> Redactor {
        Redactor::new(&self.redact_fields)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A global subscriber was installed before us.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(String),

    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mask_signaling_secrets() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "scout");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
        let redactor = config.redactor();
        assert!(redactor.is_sensitive("remoteSdp"));
        assert!(redactor.is_sensitive("lastRoomCode"));
        assert!(!redactor.is_sensitive("comments"));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: TelemetryConfig = serde_json::from_str(r#"{"json_logs": true}"#).unwrap();
        assert!(config.json_logs);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.redact_fields.len(), 3);
    }

    #[test]
    fn filter_error_names_the_directive() {
        let error = TelemetryError::InvalidFilter {
            filter: "scout=loud".into(),
            reason: "invalid level".into(),
        };
        assert!(error.to_string().contains("scout=loud"));
    }
}
