//! Session error types.

use scout_core::{StoreError, ValidationError};
use thiserror::Error;

use crate::{StateKind, TransitionEvent};

/// Signaling or data-channel failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Signaling rendezvous could not be reached.
    #[error("signaling unavailable: {0}")]
    SignalingUnavailable(String),

    /// Data channel is not open.
    #[error("channel to {peer_id} is closed")]
    ChannelClosed {
        /// Peer whose channel closed.
        peer_id: String,
    },

    /// Sending on an open channel failed.
    #[error("send to {peer_id} failed: {reason}")]
    SendFailed {
        /// Target peer.
        peer_id: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Errors surfaced by the session manager, either returned from an API call or
/// delivered as a notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{event:?} is not valid in state {from}")]
    InvalidTransition {
        from: StateKind,
        event: TransitionEvent,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("no lead answered in room {room_code} before the timeout")]
    JoinTimedOut { room_code: String },

    #[error("connection lost and no saved room code; rejoin manually")]
    ManualRejoinRequired,

    #[error("unknown peer {0}")]
    UnknownPeer(String),

    #[error("no connected peer has an open channel")]
    NoOpenPeers,

    #[error("message serialization failed: {0}")]
    Serialization(String),

    #[error("session driver stopped")]
    DriverStopped,
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
