//! Subscriber setup and payload redaction.

use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{TelemetryConfig, TelemetryError};

const MASK: &str = "[REDACTED]";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
                filter: config.log_level.clone(),
                reason: e.to_string(),
            })?
        }
    };

    // Exactly one of the two layers is present.
    let (json, human) = if config.json_logs {
        let layer = fmt::layer().json().with_current_span(true).with_writer(std::io::stderr);
        (Some(layer), None)
    } else {
        (None, Some(fmt::layer().with_writer(std::io::stderr)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(human)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInstalled(e.to_string()))?;

    tracing::debug!(service = %config.service_name, json = config.json_logs, "logging ready");
    Ok(())
}

/// Masks sensitive object keys anywhere in a JSON value.
#[derive(Debug, Clone)]
pub struct Redactor {
    needles: Vec<String>,
}

impl Redactor {
    #[must_use]
    pub fn new(fields: &[String]) -> Self {
        Self {
            needles: fields.iter().map(|f| f.to_lowercase()).collect(),
        }
    }

    #[must_use]
    pub fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.needles.iter().any(|needle| key.contains(needle.as_str()))
    }

    #[must_use]
    pub fn redact(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, inner)| {
                        let inner = if self.is_sensitive(key) {
                            Value::String(MASK.into())
                        } else {
                            self.redact(inner)
                        };
                        (key.clone(), inner)
                    })
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.redact(v)).collect()),
            scalar => scalar.clone(),
        }
    }

    /// Debug-log a payload after masking. Skips the copy when debug is off.
    pub fn log(&self, direction: &str, payload: &Value) {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(direction, payload = %self.redact(payload), "payload");
        }
    }
}

/// One-shot form of [`Redactor::redact`].
#[must_use]
pub fn redact_sensitive(value: &Value, fields: &[String]) -> Value {
    Redactor::new(fields).redact(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Redactor {
        TelemetryConfig::default().redactor()
    }

    #[test]
    fn offer_keeps_routing_fields() {
        let offer = json!({
            "type": "offer",
            "from": "s1",
            "sdp": "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1",
            "meta": {"roomCode": "123456", "attempt": 1}
        });
        let masked = defaults().redact(&offer);
        assert_eq!(masked["type"], "offer");
        assert_eq!(masked["from"], "s1");
        assert_eq!(masked["sdp"], MASK);
        assert_eq!(masked["meta"]["roomCode"], MASK);
        assert_eq!(masked["meta"]["attempt"], 1);
    }

    #[test]
    fn peers_list_is_walked() {
        let value = json!({"peers": [
            {"name": "Ada", "room_code": "111111"},
            {"name": "Grace", "room_code": "222222"}
        ]});
        let masked = redact_sensitive(&value, &["room_code".to_string()]);
        assert_eq!(masked["peers"][0]["name"], "Ada");
        assert_eq!(masked["peers"][1]["room_code"], MASK);
    }

    #[test]
    fn matching_ignores_case() {
        let masked = defaults().redact(&json!({"SDP": 1, "ROOMCODE": 2, "comments": "ok"}));
        assert_eq!(masked["SDP"], MASK);
        assert_eq!(masked["ROOMCODE"], MASK);
        assert_eq!(masked["comments"], "ok");
    }

    #[test]
    fn scouting_payload_is_untouched() {
        let entry = json!({"entries": [{"matchNumber": 12, "teamNumber": 1234}]});
        assert_eq!(defaults().redact(&entry), entry);
        assert_eq!(defaults().redact(&json!(42)), json!(42));
    }
}
