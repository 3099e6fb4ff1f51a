//! Room-code peer session management.
//!
//! A lead opens a room identified by a short numeric code; scouts join it
//! through a signaling rendezvous and end up with a data channel to the lead.
//!
//! # Overview
//!
//! - [`SessionManager`]: sans-IO state machine (select, lead, scout, connected,
//!   disconnected) with the join countdown and reconnection policy
//! - [`SessionDriver`]: tokio loop feeding the manager inputs and clock ticks
//! - [`SignalingPort`] / [`DataChannel`]: the transport seams
//! - [`WireMessage`]: JSON framing of requests, pushes and payloads

#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

mod config;
mod driver;
mod error;
mod manager;
mod message;
mod ports;
mod reconnect;
mod room_code;
mod state;

pub use config::{LAST_ROOM_CODE_KEY, SessionConfig};
pub use driver::{SessionDriver, SessionHandle};
pub use error::{SessionError, TransportError};
pub use manager::{
    ActiveTransfer, PeerInfo, SessionInput, SessionManager, SessionNotice, Target,
};
pub use message::{MessageClass, WireMessage};
pub use ports::{ChannelState, DataChannel, Signal, SignalingPort};
pub use reconnect::{ReconnectPolicy, ReconnectTracker, ReconnectTrigger};
pub use room_code::{MAX_ROOM_CODE_LEN, MIN_ROOM_CODE_LEN, RoomCode};
pub use state::{Role, SessionState, StateKind, TransitionEvent, transition};
