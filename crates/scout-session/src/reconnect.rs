//! Reconnection policy.
//!
//! Reconnection is edge-triggered: each detected drop grants at most
//! `max_attempts` automatic rejoins, and the budget refills only when a
//! connection succeeds again.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What raises a reconnection attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconnectTrigger {
    /// A channel closed without the local side asking for it.
    #[default]
    UnexpectedDrop,
    /// Never reconnect automatically.
    Never,
}

/// Reconnection policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Condition that starts a reconnection.
    ///
    /// Default: unexpected-drop
    pub trigger: ReconnectTrigger,

    /// Automatic rejoins per detected drop.
    ///
    /// Default: 1
    pub max_attempts: u32,

    /// Delay before the rejoin is issued.
    ///
    /// Default: 0s
    #[serde(with = "scout_core::serde_helpers::duration_secs")]
    pub backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            trigger: ReconnectTrigger::UnexpectedDrop,
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

impl ReconnectPolicy {
    /// Policy that never reconnects.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trigger: ReconnectTrigger::Never,
            max_attempts: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Set the attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the backoff.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Attempt bookkeeping for one [`ReconnectPolicy`].
#[derive(Clone, Debug, Default)]
pub struct ReconnectTracker {
    attempts: u32,
    pending: bool,
}

impl ReconnectTracker {
    /// Record a detected drop. Returns whether an automatic attempt should be
    /// made.
    pub fn on_drop(&mut self, policy: &ReconnectPolicy) -> bool {
        if policy.trigger == ReconnectTrigger::Never || self.attempts >= policy.max_attempts {
            self.pending = false;
            return false;
        }
        self.attempts += 1;
        self.pending = true;
        true
    }

    /// A connection succeeded; the next drop gets a fresh budget.
    pub fn on_connected(&mut self) {
        self.attempts = 0;
        self.pending = false;
    }

    /// The pending attempt was issued or abandoned.
    pub fn clear_pending(&mut self) {
        self.pending = false;
    }

    /// Whether a reconnection is in progress (the "reconnecting" flag).
    #[must_use]
    pub const fn is_reconnecting(&self) -> bool {
        self.pending
    }

    /// Automatic attempts since the last successful connection.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_attempt_per_drop() {
        let policy = ReconnectPolicy::default();
        let mut tracker = ReconnectTracker::default();

        assert!(tracker.on_drop(&policy));
        assert!(tracker.is_reconnecting());
        assert_eq!(tracker.attempts(), 1);

        // The rejoin failed and the channel dropped again before connecting.
        assert!(!tracker.on_drop(&policy));
        assert!(!tracker.is_reconnecting());

        tracker.on_connected();
        assert!(tracker.on_drop(&policy));
    }

    #[test]
    fn disabled_policy_never_attempts() {
        let mut tracker = ReconnectTracker::default();
        assert!(!tracker.on_drop(&ReconnectPolicy::disabled()));
        assert!(!tracker.on_drop(&ReconnectPolicy::default().with_max_attempts(0)));
    }

    #[test]
    fn larger_budget() {
        let policy = ReconnectPolicy::default().with_max_attempts(3);
        let mut tracker = ReconnectTracker::default();
        assert!(tracker.on_drop(&policy));
        assert!(tracker.on_drop(&policy));
        assert!(tracker.on_drop(&policy));
        assert!(!tracker.on_drop(&policy));
    }

    #[test]
    fn policy_serde() {
        let policy: ReconnectPolicy =
            serde_json::from_str(r#"{"trigger": "never", "backoff": 5}"#).unwrap();
        assert_eq!(policy.trigger, ReconnectTrigger::Never);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff, Duration::from_secs(5));
    }
}
