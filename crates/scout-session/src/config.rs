//! Session manager configuration.

use std::time::Duration;

use scout_core::serde_helpers::duration_secs;
use serde::{Deserialize, Serialize};

use crate::ReconnectPolicy;

/// Storage key under which the scout's last room code is kept.
pub const LAST_ROOM_CODE_KEY: &str = "lastRoomCode";

/// Session manager configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a scout waits for a lead before giving up.
    ///
    /// Default: 30s
    #[serde(with = "duration_secs")]
    pub join_timeout: Duration,

    /// Driver tick period; also the countdown resolution.
    ///
    /// Default: 1s
    #[serde(with = "duration_secs")]
    pub tick_interval: Duration,

    /// Digits in generated and accepted room codes (4-8).
    ///
    /// Default: 6
    pub room_code_length: usize,

    /// Durable storage key for the last-used room code.
    ///
    /// Default: "lastRoomCode"
    pub room_code_storage_key: String,

    /// Behaviour after an unexpected channel drop.
    pub reconnect: ReconnectPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            join_timeout: Duration::from_secs(30),
            tick_interval: Duration::from_secs(1),
            room_code_length: 6,
            room_code_storage_key: LAST_ROOM_CODE_KEY.to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Set the join timeout.
    #[must_use]
    pub const fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Set the reconnect policy.
    #[must_use]
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }
}
