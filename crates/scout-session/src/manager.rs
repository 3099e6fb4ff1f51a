//! Sans-IO session manager.
//!
//! The manager owns the session state, the peer table and the reconnect
//! bookkeeping. It never blocks and never reads a clock: every call to
//! [`SessionManager::handle`] receives the current instant and one
//! [`SessionInput`], and returns the [`SessionNotice`]s it produced. Outbound
//! effects go through the injected [`SignalingPort`] and each peer's
//! [`DataChannel`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use scout_core::{DataType, KeyValueStore, TransferFilters};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    ChannelState, DataChannel, ReconnectTracker, Role, RoomCode, SessionConfig, SessionError,
    SessionState, Signal, SignalingPort, StateKind, TransitionEvent, TransportError, WireMessage,
    transition,
};

/// Something that happened: a user action, a transport event or a clock tick.
#[derive(Debug)]
pub enum SessionInput {
    /// Open a room as lead.
    HostRoom,
    /// Join a room as scout with a user-entered code.
    JoinRoom { room_code: String },
    /// Abandon an in-flight join.
    CancelJoin,
    /// Manually rejoin after a drop.
    Rejoin,
    /// Tear everything down and return to role selection.
    Reset,
    /// Local WebRTC stack produced an offer or answer to publish.
    LocalSignal(Signal),
    /// Signaling delivered a remote offer or answer.
    RemoteSignal(Signal),
    /// A peer's data channel finished connecting.
    PeerConnected {
        peer_id: String,
        name: String,
        channel: Box<dyn DataChannel>,
    },
    /// Text arrived on a peer's data channel.
    ChannelMessage { peer_id: String, text: String },
    /// A peer's data channel closed without the local side asking.
    ChannelClosed { peer_id: String },
    /// The user disconnected a peer.
    DisconnectPeer { peer_id: String },
    /// Clock tick.
    Tick,
}

/// Something the UI or the sync layer should know about.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionNotice {
    StateChanged {
        from: StateKind,
        to: StateKind,
    },
    /// Lead room is open; show the code.
    RoomOpened {
        room_code: RoomCode,
    },
    /// Scout started waiting for a lead.
    JoinStarted {
        room_code: RoomCode,
    },
    /// Seconds left before the join times out.
    Countdown {
        remaining_secs: u64,
    },
    PeerJoined {
        peer_id: String,
        name: String,
    },
    PeerLeft {
        peer_id: String,
    },
    /// Signal for the local WebRTC stack to apply.
    Negotiate(Signal),
    /// A peer asked for a dataset.
    Request {
        peer_id: String,
        request_id: String,
        data_type: DataType,
        filters: TransferFilters,
    },
    /// A dataset arrived for import.
    Payload {
        peer_id: String,
        peer_name: String,
        data_type: DataType,
        data: Value,
        pushed: bool,
    },
    Declined {
        peer_id: String,
        request_id: String,
    },
    PushDeclined {
        peer_id: String,
    },
    PushConfirmed {
        peer_id: String,
        data_type: DataType,
    },
    /// An automatic or manual rejoin was issued.
    Reconnecting {
        room_code: RoomCode,
        attempt: u32,
    },
    Error(SessionError),
}

/// Where an outbound message goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Peer(String),
    /// Every connected peer whose channel is open.
    AllOpen,
}

/// Snapshot of one connected peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: String,
    pub name: String,
    pub ready_state: ChannelState,
}

/// The request this device is waiting on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveTransfer {
    pub request_id: String,
    pub data_type: DataType,
    pub filters: TransferFilters,
}

#[derive(Debug)]
struct Peer {
    name: String,
    channel: Box<dyn DataChannel>,
}

impl Peer {
    fn send(&self, peer_id: &str, text: &str) -> Result<(), TransportError> {
        if self.channel.ready_state() != ChannelState::Open {
            return Err(TransportError::ChannelClosed {
                peer_id: peer_id.to_string(),
            });
        }
        self.channel.send(text)
    }
}

type Notices = Vec<SessionNotice>;

/// Room-code session manager.
pub struct SessionManager {
    config: SessionConfig,
    signaling: Arc<dyn SignalingPort>,
    storage: Arc<dyn KeyValueStore>,
    local_id: String,
    local_name: String,
    state: SessionState,
    peers: BTreeMap<String, Peer>,
    reconnect: ReconnectTracker,
    active_transfer: Option<ActiveTransfer>,
    next_request: u64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("local_id", &self.local_id)
            .field("state", &self.state)
            .field("peers", &self.peers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager in the `select` state.
    pub fn new(
        config: SessionConfig,
        signaling: Arc<dyn SignalingPort>,
        storage: Arc<dyn KeyValueStore>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            config,
            signaling,
            storage,
            local_id: format!("{:016x}", rand::random::<u64>()),
            local_name: local_name.into(),
            state: SessionState::Select,
            peers: BTreeMap::new(),
            reconnect: ReconnectTracker::default(),
            active_transfer: None,
            next_request: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn kind(&self) -> StateKind {
        self.state.kind()
    }

    #[must_use]
    pub const fn room_code(&self) -> Option<&RoomCode> {
        self.state.room_code()
    }

    /// Id this device signs its signals with.
    #[must_use]
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether the room-code entry should be offered to the user.
    #[must_use]
    pub const fn shows_room_entry(&self) -> bool {
        matches!(
            self.state,
            SessionState::Select | SessionState::Disconnected { .. }
        )
    }

    /// Whether an automatic reconnection is in progress.
    #[must_use]
    pub const fn is_reconnecting(&self) -> bool {
        self.reconnect.is_reconnecting()
    }

    #[must_use]
    pub const fn active_transfer(&self) -> Option<&ActiveTransfer> {
        self.active_transfer.as_ref()
    }

    /// Connected peers in id order.
    #[must_use]
    pub fn peers(&self) -> Vec<PeerInfo> {
        self.peers
            .iter()
            .map(|(id, peer)| PeerInfo {
                id: id.clone(),
                name: peer.name.clone(),
                ready_state: peer.channel.ready_state(),
            })
            .collect()
    }

    /// Process one input.
    pub fn handle(&mut self, now: Instant, input: SessionInput) -> Vec<SessionNotice> {
        let mut notices = Vec::new();
        let result = match input {
            SessionInput::HostRoom => self.host_room(&mut notices),
            SessionInput::JoinRoom { room_code } => self.join_room(now, &room_code, &mut notices),
            SessionInput::CancelJoin => self.cancel_join(&mut notices),
            SessionInput::Rejoin => self.rejoin(now, &mut notices),
            SessionInput::Reset => self.reset(&mut notices),
            SessionInput::LocalSignal(signal) => self.publish(&signal),
            SessionInput::RemoteSignal(signal) => {
                self.remote_signal(signal, &mut notices);
                Ok(())
            }
            SessionInput::PeerConnected {
                peer_id,
                name,
                channel,
            } => self.peer_connected(peer_id, name, channel, &mut notices),
            SessionInput::ChannelMessage { peer_id, text } => {
                self.channel_message(peer_id, &text, &mut notices)
            }
            SessionInput::ChannelClosed { peer_id } => {
                self.channel_closed(now, peer_id, &mut notices)
            }
            SessionInput::DisconnectPeer { peer_id } => {
                self.disconnect_peer(&peer_id, &mut notices)
            }
            SessionInput::Tick => self.tick(now, &mut notices),
        };
        if let Err(err) = result {
            notices.push(SessionNotice::Error(err));
        }
        notices
    }

    /// Ask a peer (or every open peer) for a dataset.
    ///
    /// Filters are validated before anything is sent.
    pub fn request(
        &mut self,
        target: &Target,
        data_type: DataType,
        filters: TransferFilters,
    ) -> Result<String, SessionError> {
        filters.validate()?;
        self.next_request += 1;
        let request_id = format!("{}-{}", self.local_id, self.next_request);
        let message = WireMessage::Request {
            data_type,
            filters: filters.clone(),
            request_id: request_id.clone(),
        };
        self.dispatch(target, &message)?;
        self.active_transfer = Some(ActiveTransfer {
            request_id: request_id.clone(),
            data_type,
            filters,
        });
        Ok(request_id)
    }

    /// Offer a dataset. Returns how many peers it was sent to.
    pub fn push(
        &self,
        target: &Target,
        data_type: DataType,
        data: Value,
    ) -> Result<usize, SessionError> {
        self.dispatch(target, &WireMessage::Push { data_type, data })
    }

    /// Answer a request with an already filtered dataset.
    pub fn respond(
        &self,
        peer_id: &str,
        data_type: DataType,
        data: Value,
    ) -> Result<(), SessionError> {
        self.send(peer_id, &WireMessage::payload(data_type, data))
    }

    pub fn decline(&self, peer_id: &str, request_id: &str) -> Result<(), SessionError> {
        self.send(
            peer_id,
            &WireMessage::Declined {
                request_id: request_id.to_string(),
            },
        )
    }

    pub fn decline_push(&self, peer_id: &str) -> Result<(), SessionError> {
        self.send(peer_id, &WireMessage::PushDeclined)
    }

    pub fn confirm_push(&self, peer_id: &str, data_type: DataType) -> Result<(), SessionError> {
        self.send(peer_id, &WireMessage::Pushed { data_type })
    }

    /// Send one message to one peer.
    pub fn send(&self, peer_id: &str, message: &WireMessage) -> Result<(), SessionError> {
        self.dispatch(&Target::Peer(peer_id.to_string()), message)
            .map(|_| ())
    }

    fn dispatch(&self, target: &Target, message: &WireMessage) -> Result<usize, SessionError> {
        let text = message.to_text()?;
        match target {
            Target::Peer(peer_id) => {
                let peer = self
                    .peers
                    .get(peer_id)
                    .ok_or_else(|| SessionError::UnknownPeer(peer_id.clone()))?;
                peer.send(peer_id, &text)?;
                Ok(1)
            }
            Target::AllOpen => {
                let mut sent = 0;
                for (peer_id, peer) in self
                    .peers
                    .iter()
                    .filter(|(_, peer)| peer.channel.ready_state() == ChannelState::Open)
                {
                    match peer.send(peer_id, &text) {
                        Ok(()) => sent += 1,
                        Err(err) => warn!(peer_id = %peer_id, error = %err, "broadcast send failed"),
                    }
                }
                if sent == 0 {
                    return Err(SessionError::NoOpenPeers);
                }
                debug!(sent, "broadcast sent");
                Ok(sent)
            }
        }
    }

    fn check(&self, event: TransitionEvent) -> Result<StateKind, SessionError> {
        let from = self.state.kind();
        transition(from, event).ok_or(SessionError::InvalidTransition { from, event })
    }

    fn apply(
        &mut self,
        event: TransitionEvent,
        next: SessionState,
        notices: &mut Notices,
    ) -> Result<(), SessionError> {
        let from = self.state.kind();
        let to = self.check(event)?;
        if to != next.kind() {
            return Err(SessionError::InvalidTransition { from, event });
        }
        self.state = next;
        if from != to {
            info!(from = %from, to = %to, ?event, "session state changed");
            notices.push(SessionNotice::StateChanged { from, to });
        }
        Ok(())
    }

    fn saved_room_code(&self) -> Option<RoomCode> {
        let saved = self.storage.get(&self.config.room_code_storage_key)?;
        RoomCode::parse(&saved, self.config.room_code_length).ok()
    }

    fn host_room(&mut self, notices: &mut Notices) -> Result<(), SessionError> {
        self.check(TransitionEvent::HostRoom)?;
        let room_code = RoomCode::generate(self.config.room_code_length);
        self.signaling.join(&room_code)?;
        self.apply(
            TransitionEvent::HostRoom,
            SessionState::Lead {
                room_code: room_code.clone(),
            },
            notices,
        )?;
        info!(room_code = %room_code, "room opened");
        notices.push(SessionNotice::RoomOpened { room_code });
        Ok(())
    }

    fn join_room(
        &mut self,
        now: Instant,
        input: &str,
        notices: &mut Notices,
    ) -> Result<(), SessionError> {
        self.check(TransitionEvent::JoinRoom)?;
        let room_code = RoomCode::parse(input, self.config.room_code_length)?;
        if let Err(err) = self
            .storage
            .set(&self.config.room_code_storage_key, room_code.as_str())
        {
            warn!(error = %err, "could not save room code; automatic rejoin unavailable");
        }
        self.start_join(now, TransitionEvent::JoinRoom, room_code, notices)
    }

    fn start_join(
        &mut self,
        now: Instant,
        event: TransitionEvent,
        room_code: RoomCode,
        notices: &mut Notices,
    ) -> Result<(), SessionError> {
        let remaining_secs = ceil_secs(self.config.join_timeout);
        self.apply(
            event,
            SessionState::Scout {
                room_code: room_code.clone(),
                deadline: now + self.config.join_timeout,
                remaining_secs,
            },
            notices,
        )?;
        notices.push(SessionNotice::JoinStarted {
            room_code: room_code.clone(),
        });
        notices.push(SessionNotice::Countdown { remaining_secs });

        if let Err(err) = self.signaling.join(&room_code) {
            warn!(room_code = %room_code, error = %err, "signaling join failed");
            self.reconnect.clear_pending();
            self.apply(TransitionEvent::JoinFailed, SessionState::Select, notices)?;
            return Err(err.into());
        }
        Ok(())
    }

    fn cancel_join(&mut self, notices: &mut Notices) -> Result<(), SessionError> {
        self.check(TransitionEvent::CancelJoin)?;
        if let Some(room_code) = self.state.room_code() {
            self.signaling.leave(room_code);
        }
        self.reconnect.clear_pending();
        self.apply(TransitionEvent::CancelJoin, SessionState::Select, notices)
    }

    fn rejoin(&mut self, now: Instant, notices: &mut Notices) -> Result<(), SessionError> {
        self.check(TransitionEvent::Rejoin)?;
        let Some(room_code) = self.saved_room_code() else {
            self.apply(TransitionEvent::GiveUp, SessionState::Select, notices)?;
            return Err(SessionError::ManualRejoinRequired);
        };
        self.rejoin_with(now, room_code, notices)
    }

    fn rejoin_with(
        &mut self,
        now: Instant,
        room_code: RoomCode,
        notices: &mut Notices,
    ) -> Result<(), SessionError> {
        let attempt = self.reconnect.attempts();
        info!(room_code = %room_code, attempt, "rejoining room");
        notices.push(SessionNotice::Reconnecting {
            room_code: room_code.clone(),
            attempt,
        });
        self.start_join(now, TransitionEvent::Rejoin, room_code, notices)
    }

    fn reset(&mut self, notices: &mut Notices) -> Result<(), SessionError> {
        for (peer_id, peer) in std::mem::take(&mut self.peers) {
            peer.channel.close();
            notices.push(SessionNotice::PeerLeft { peer_id });
        }
        if let Some(room_code) = self.state.room_code() {
            self.signaling.leave(room_code);
        }
        self.active_transfer = None;
        self.reconnect.clear_pending();
        if self.state.kind() == StateKind::Select {
            return Ok(());
        }
        self.apply(TransitionEvent::Reset, SessionState::Select, notices)
    }

    fn publish(&self, signal: &Signal) -> Result<(), SessionError> {
        let room_code = self.state.room_code().ok_or_else(|| {
            TransportError::SignalingUnavailable("not in a room".to_string())
        })?;
        self.signaling.publish(room_code, signal)?;
        Ok(())
    }

    fn remote_signal(&self, signal: Signal, notices: &mut Notices) {
        if signal.sender() == self.local_id {
            return;
        }
        if signal.recipient().is_some_and(|to| to != self.local_id) {
            return;
        }
        let accepted = match (&signal, &self.state) {
            (Signal::Offer { .. }, SessionState::Lead { .. })
            | (
                Signal::Offer { .. },
                SessionState::Connected {
                    role: Role::Lead, ..
                },
            )
            | (Signal::Answer { .. }, SessionState::Scout { .. }) => true,
            _ => false,
        };
        if accepted {
            notices.push(SessionNotice::Negotiate(signal));
        } else {
            debug!(from = signal.sender(), state = %self.state.kind(), "ignoring signal");
        }
    }

    fn peer_connected(
        &mut self,
        peer_id: String,
        name: String,
        channel: Box<dyn DataChannel>,
        notices: &mut Notices,
    ) -> Result<(), SessionError> {
        let (Ok(_), Some(role), Some(room_code)) = (
            self.check(TransitionEvent::PeerConnected),
            self.state.role(),
            self.state.room_code().cloned(),
        ) else {
            warn!(peer_id = %peer_id, state = %self.state.kind(), "rejecting unexpected peer");
            channel.close();
            return Err(SessionError::InvalidTransition {
                from: self.state.kind(),
                event: TransitionEvent::PeerConnected,
            });
        };

        self.apply(
            TransitionEvent::PeerConnected,
            SessionState::Connected { role, room_code },
            notices,
        )?;
        if role == Role::Scout {
            self.reconnect.on_connected();
        }
        info!(peer_id = %peer_id, name = %name, "peer connected");
        if let Some(previous) = self.peers.insert(peer_id.clone(), Peer {
            name: name.clone(),
            channel,
        }) {
            previous.channel.close();
        }
        notices.push(SessionNotice::PeerJoined { peer_id, name });
        Ok(())
    }

    fn channel_message(
        &mut self,
        peer_id: String,
        text: &str,
        notices: &mut Notices,
    ) -> Result<(), SessionError> {
        let peer_name = self
            .peers
            .get(&peer_id)
            .map(|peer| peer.name.clone())
            .ok_or_else(|| SessionError::UnknownPeer(peer_id.clone()))?;
        let message = match WireMessage::from_text(text) {
            Ok(message) => message,
            Err(err) => {
                debug!(peer_id = %peer_id, error = %err, "dropping unparseable message");
                return Ok(());
            }
        };

        let payload = |data_type: DataType, data: Value, pushed: bool| SessionNotice::Payload {
            peer_id: peer_id.clone(),
            peer_name: peer_name.clone(),
            data_type,
            data,
            pushed,
        };
        let notice = match message {
            WireMessage::Request {
                data_type,
                filters,
                request_id,
            } => SessionNotice::Request {
                peer_id: peer_id.clone(),
                request_id,
                data_type,
                filters,
            },
            WireMessage::Push { data_type, data } => payload(data_type, data, true),
            WireMessage::Declined { request_id } => {
                if self
                    .active_transfer
                    .as_ref()
                    .is_some_and(|active| active.request_id == request_id)
                {
                    self.active_transfer = None;
                }
                SessionNotice::Declined {
                    peer_id: peer_id.clone(),
                    request_id,
                }
            }
            WireMessage::PushDeclined => SessionNotice::PushDeclined {
                peer_id: peer_id.clone(),
            },
            WireMessage::Pushed { data_type } => SessionNotice::PushConfirmed {
                peer_id: peer_id.clone(),
                data_type,
            },
            WireMessage::Scouting { data } => payload(DataType::Scouting, data, false),
            WireMessage::PitScouting { data } => payload(DataType::PitScouting, data, false),
            WireMessage::Match { data } => payload(DataType::Match, data, false),
            WireMessage::Scout { data } => payload(DataType::Scout, data, false),
            WireMessage::Combined { data } => payload(DataType::Combined, data, false),
        };

        if let SessionNotice::Payload {
            data_type,
            pushed: false,
            ..
        } = &notice
        {
            if self
                .active_transfer
                .as_ref()
                .is_some_and(|active| active.data_type == *data_type)
            {
                self.active_transfer = None;
            }
        }
        debug!(peer_id = %peer_id, "channel message received");
        notices.push(notice);
        Ok(())
    }

    fn remove_peer(&mut self, peer_id: &str, notices: &mut Notices) -> bool {
        let Some(peer) = self.peers.remove(peer_id) else {
            debug!(peer_id, "no such peer");
            return false;
        };
        peer.channel.close();
        notices.push(SessionNotice::PeerLeft {
            peer_id: peer_id.to_string(),
        });
        true
    }

    fn lead_after_removal(&mut self, room_code: RoomCode, notices: &mut Notices) -> Result<(), SessionError> {
        if self.peers.is_empty() {
            self.apply(
                TransitionEvent::LastPeerLeft,
                SessionState::Lead { room_code },
                notices,
            )?;
        }
        Ok(())
    }

    fn channel_closed(
        &mut self,
        now: Instant,
        peer_id: String,
        notices: &mut Notices,
    ) -> Result<(), SessionError> {
        if !self.remove_peer(&peer_id, notices) {
            return Ok(());
        }
        match self.state.clone() {
            SessionState::Connected {
                role: Role::Lead,
                room_code,
            } => self.lead_after_removal(room_code, notices),
            SessionState::Connected {
                role: Role::Scout,
                room_code,
            } => {
                warn!(peer_id = %peer_id, room_code = %room_code, "connection to lead dropped");
                self.signaling.leave(&room_code);
                self.active_transfer = None;
                self.apply(
                    TransitionEvent::ChannelDropped,
                    SessionState::Disconnected {
                        room_code: Some(room_code),
                        rejoin_at: None,
                    },
                    notices,
                )?;
                self.after_drop(now, peer_id, notices)
            }
            _ => Ok(()),
        }
    }

    fn after_drop(
        &mut self,
        now: Instant,
        peer_id: String,
        notices: &mut Notices,
    ) -> Result<(), SessionError> {
        if !self.reconnect.on_drop(&self.config.reconnect) {
            warn!("automatic reconnection not attempted");
            return Err(TransportError::ChannelClosed { peer_id }.into());
        }
        let Some(room_code) = self.saved_room_code() else {
            warn!("no saved room code; manual rejoin required");
            self.reconnect.clear_pending();
            self.apply(TransitionEvent::GiveUp, SessionState::Select, notices)?;
            return Err(SessionError::ManualRejoinRequired);
        };
        let backoff = self.config.reconnect.backoff;
        if backoff.is_zero() {
            return self.rejoin_with(now, room_code, notices);
        }
        self.state = SessionState::Disconnected {
            room_code: Some(room_code),
            rejoin_at: Some(now + backoff),
        };
        Ok(())
    }

    fn disconnect_peer(&mut self, peer_id: &str, notices: &mut Notices) -> Result<(), SessionError> {
        if !self.peers.contains_key(peer_id) {
            return Err(SessionError::UnknownPeer(peer_id.to_string()));
        }
        match self.state.clone() {
            SessionState::Connected {
                role: Role::Lead,
                room_code,
            } => {
                self.remove_peer(peer_id, notices);
                self.lead_after_removal(room_code, notices)
            }
            // A scout disconnecting from its lead is leaving the room.
            _ => self.reset(notices),
        }
    }

    fn tick(&mut self, now: Instant, notices: &mut Notices) -> Result<(), SessionError> {
        match &mut self.state {
            SessionState::Scout {
                room_code,
                deadline,
                remaining_secs,
            } => {
                if now >= *deadline {
                    let room_code = room_code.clone();
                    warn!(room_code = %room_code, "no lead answered; join timed out");
                    self.signaling.leave(&room_code);
                    self.reconnect.clear_pending();
                    notices.push(SessionNotice::Error(SessionError::JoinTimedOut {
                        room_code: room_code.to_string(),
                    }));
                    return self.apply(TransitionEvent::JoinTimedOut, SessionState::Select, notices);
                }
                let left = ceil_secs(deadline.saturating_duration_since(now));
                if left != *remaining_secs {
                    *remaining_secs = left;
                    notices.push(SessionNotice::Countdown {
                        remaining_secs: left,
                    });
                }
                Ok(())
            }
            SessionState::Disconnected {
                room_code: Some(room_code),
                rejoin_at: Some(rejoin_at),
            } if now >= *rejoin_at => {
                let room_code = room_code.clone();
                self.rejoin_with(now, room_code, notices)
            }
            _ => Ok(()),
        }
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
