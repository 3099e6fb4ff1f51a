//! Fountain transfer configuration.

use serde::{Deserialize, Serialize};

use crate::{TransferProfile, WireFormat};

/// Fountain transfer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FountainConfig {
    /// Profile used when the caller does not pick one.
    ///
    /// Default: fast
    pub profile: TransferProfile,

    /// Wire shape for emitted packets.
    ///
    /// Default: compact
    pub wire_format: WireFormat,

    /// Largest payload accepted for encoding or reassembly. The erasure code
    /// caps a transfer at 204 blocks regardless.
    ///
    /// Default: 128KB
    pub max_payload_bytes: usize,

    /// Distinct packets from another session, with none from the active one
    /// in between, after which the receiver drops the active reassembly and
    /// follows the new sender.
    ///
    /// Default: 3
    pub session_switch_packets: usize,
}

impl Default for FountainConfig {
    fn default() -> Self {
        Self {
            profile: TransferProfile::Fast,
            wire_format: WireFormat::Compact,
            max_payload_bytes: 128 * 1024,
            session_switch_packets: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = FountainConfig::default();
        assert_eq!(config.profile, TransferProfile::Fast);
        assert_eq!(config.wire_format, WireFormat::Compact);
        assert_eq!(config.max_payload_bytes, 128 * 1024);
        assert_eq!(config.session_switch_packets, 3);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: FountainConfig = serde_json::from_str(r#"{"profile": "reliable"}"#).unwrap();
        assert_eq!(config.profile, TransferProfile::Reliable);
        assert_eq!(config.wire_format, WireFormat::Compact);
    }
}
