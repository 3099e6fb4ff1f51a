//! Session state machine.
//!
//! ```text
//!            HostRoom             PeerConnected
//!   select ───────────▶ lead ─────────────────┐
//!     │ ▲                ▲                     ▼
//!     │ │ JoinTimedOut   │ LastPeerLeft    connected ◀─┐ PeerConnected
//!     │ │ JoinFailed     └─────────────────────┤ └─────┘
//!     │ │ CancelJoin                           │ ChannelDropped
//!     ▼ │       PeerConnected                  ▼
//!   scout ────────────────────▶ connected   disconnected
//!     ▲                                        │   │ GiveUp ──▶ select
//!     └──────────────── Rejoin ────────────────┘
//!
//!   Reset: any state ──▶ select
//! ```

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::RoomCode;

/// Which side of a session this device plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Lead,
    Scout,
}

/// State discriminant used by the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    Select,
    Lead,
    Scout,
    Connected,
    Disconnected,
}

impl StateKind {
    /// Wire / log name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Lead => "lead",
            Self::Scout => "scout",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that move the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionEvent {
    HostRoom,
    JoinRoom,
    PeerConnected,
    JoinTimedOut,
    JoinFailed,
    CancelJoin,
    LastPeerLeft,
    ChannelDropped,
    Rejoin,
    GiveUp,
    Reset,
}

/// The transition table. `None` means the event is not valid in `from`.
#[must_use]
pub const fn transition(from: StateKind, event: TransitionEvent) -> Option<StateKind> {
    use StateKind as S;
    use TransitionEvent as E;

    match (from, event) {
        (_, E::Reset) | (S::Disconnected, E::GiveUp) => Some(S::Select),
        (S::Select, E::HostRoom) | (S::Connected, E::LastPeerLeft) => Some(S::Lead),
        (S::Select, E::JoinRoom) | (S::Disconnected, E::Rejoin) => Some(S::Scout),
        (S::Lead | S::Scout | S::Connected, E::PeerConnected) => Some(S::Connected),
        (S::Scout, E::JoinTimedOut | E::JoinFailed | E::CancelJoin) => Some(S::Select),
        (S::Connected, E::ChannelDropped) => Some(S::Disconnected),
        _ => None,
    }
}

/// Full session state, carrying the data each state needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Choosing a role; room entry is available.
    Select,
    /// Hosting a room, waiting for scouts.
    Lead { room_code: RoomCode },
    /// Joining a room; times out at `deadline`.
    Scout {
        room_code: RoomCode,
        deadline: Instant,
        remaining_secs: u64,
    },
    /// At least one peer channel is established.
    Connected { role: Role, room_code: RoomCode },
    /// The lead's channel dropped unexpectedly.
    Disconnected {
        room_code: Option<RoomCode>,
        rejoin_at: Option<Instant>,
    },
}

impl SessionState {
    /// Discriminant.
    #[must_use]
    pub const fn kind(&self) -> StateKind {
        match self {
            Self::Select => StateKind::Select,
            Self::Lead { .. } => StateKind::Lead,
            Self::Scout { .. } => StateKind::Scout,
            Self::Connected { .. } => StateKind::Connected,
            Self::Disconnected { .. } => StateKind::Disconnected,
        }
    }

    /// Room this state is bound to.
    #[must_use]
    pub const fn room_code(&self) -> Option<&RoomCode> {
        match self {
            Self::Select => None,
            Self::Lead { room_code }
            | Self::Scout { room_code, .. }
            | Self::Connected { room_code, .. } => Some(room_code),
            Self::Disconnected { room_code, .. } => room_code.as_ref(),
        }
    }

    /// Active role, if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Select => None,
            Self::Lead { .. } => Some(Role::Lead),
            Self::Scout { .. } | Self::Disconnected { .. } => Some(Role::Scout),
            Self::Connected { role, .. } => Some(*role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [StateKind; 5] = [
        StateKind::Select,
        StateKind::Lead,
        StateKind::Scout,
        StateKind::Connected,
        StateKind::Disconnected,
    ];

    #[test]
    fn documented_transitions() {
        use StateKind as S;
        use TransitionEvent as E;

        let table = [
            (S::Select, E::HostRoom, S::Lead),
            (S::Select, E::JoinRoom, S::Scout),
            (S::Lead, E::PeerConnected, S::Connected),
            (S::Scout, E::PeerConnected, S::Connected),
            (S::Connected, E::PeerConnected, S::Connected),
            (S::Scout, E::JoinTimedOut, S::Select),
            (S::Scout, E::JoinFailed, S::Select),
            (S::Scout, E::CancelJoin, S::Select),
            (S::Connected, E::LastPeerLeft, S::Lead),
            (S::Connected, E::ChannelDropped, S::Disconnected),
            (S::Disconnected, E::Rejoin, S::Scout),
            (S::Disconnected, E::GiveUp, S::Select),
        ];
        for (from, event, to) in table {
            assert_eq!(transition(from, event), Some(to), "{from} + {event:?}");
        }
    }

    #[test]
    fn reset_always_returns_to_select() {
        for from in ALL_STATES {
            assert_eq!(
                transition(from, TransitionEvent::Reset),
                Some(StateKind::Select)
            );
        }
    }

    #[test]
    fn invalid_transitions_rejected() {
        use StateKind as S;
        use TransitionEvent as E;

        assert_eq!(transition(S::Select, E::PeerConnected), None);
        assert_eq!(transition(S::Lead, E::JoinRoom), None);
        assert_eq!(transition(S::Scout, E::HostRoom), None);
        assert_eq!(transition(S::Connected, E::JoinTimedOut), None);
        assert_eq!(transition(S::Select, E::Rejoin), None);
        assert_eq!(transition(S::Lead, E::ChannelDropped), None);
    }

    #[test]
    fn one_role_at_a_time() {
        // Neither role can be entered while the other is active.
        for from in [StateKind::Lead, StateKind::Scout, StateKind::Connected] {
            assert_eq!(transition(from, TransitionEvent::HostRoom), None);
            assert_eq!(transition(from, TransitionEvent::JoinRoom), None);
        }
    }

    #[test]
    fn state_accessors() {
        let code = RoomCode::parse("123456", 6).unwrap();
        let state = SessionState::Connected {
            role: Role::Lead,
            room_code: code.clone(),
        };
        assert_eq!(state.kind(), StateKind::Connected);
        assert_eq!(state.room_code(), Some(&code));
        assert_eq!(state.role(), Some(Role::Lead));
        assert_eq!(SessionState::Select.role(), None);
    }
}
