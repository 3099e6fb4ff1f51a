//! Signaling and data-channel ports.
//!
//! The WebRTC stack and the signaling rendezvous live outside this crate. The
//! manager drives them through these traits and learns about their progress
//! through [`SessionInput`](crate::SessionInput)s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{RoomCode, TransportError};

/// Data channel ready state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// One peer's data channel.
pub trait DataChannel: Send + Sync + fmt::Debug {
    /// Current ready state.
    fn ready_state(&self) -> ChannelState;

    /// Send one text message.
    fn send(&self, text: &str) -> Result<(), TransportError>;

    /// Release the channel. Idempotent.
    fn close(&self);
}

/// SDP exchange over the signaling rendezvous.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Signal {
    /// Scout to lead.
    Offer { from: String, name: String, sdp: String },
    /// Lead to one scout.
    Answer { from: String, to: String, sdp: String },
}

impl Signal {
    /// Sender id.
    #[must_use]
    pub fn sender(&self) -> &str {
        match self {
            Self::Offer { from, .. } | Self::Answer { from, .. } => from,
        }
    }

    /// Addressed recipient, if any.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        match self {
            Self::Offer { .. } => None,
            Self::Answer { to, .. } => Some(to),
        }
    }
}

/// Pub/sub signaling keyed by room code.
///
/// Calls are non-blocking; delivery results come back as session inputs.
pub trait SignalingPort: Send + Sync {
    /// Subscribe to a room.
    fn join(&self, room: &RoomCode) -> Result<(), TransportError>;

    /// Unsubscribe from a room. Idempotent.
    fn leave(&self, room: &RoomCode);

    /// Whether the signaling service is reachable.
    fn is_connected(&self) -> bool;

    /// Publish a signal to a room.
    fn publish(&self, room: &RoomCode, signal: &Signal) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signal_wire_shape() {
        let offer = Signal::Offer {
            from: "s1".into(),
            name: "Ada".into(),
            sdp: "v=0".into(),
        };
        assert_eq!(
            serde_json::to_value(&offer).unwrap(),
            json!({"type": "offer", "from": "s1", "name": "Ada", "sdp": "v=0"})
        );
        assert_eq!(offer.sender(), "s1");
        assert_eq!(offer.recipient(), None);

        let answer: Signal = serde_json::from_value(
            json!({"type": "answer", "from": "lead", "to": "s1", "sdp": "v=0"}),
        )
        .unwrap();
        assert_eq!(answer.recipient(), Some("s1"));
    }

    #[test]
    fn channel_state_strings() {
        assert_eq!(
            serde_json::to_string(&ChannelState::Open).unwrap(),
            "\"open\""
        );
    }
}
