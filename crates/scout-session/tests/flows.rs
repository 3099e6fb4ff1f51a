//! Lead and scout flows driven directly through the sans-IO manager.

use std::sync::Arc;
use std::time::{Duration, Instant};

use scout_core::{DataType, KeyValueStore, MatchRange, MemoryKeyValueStore, TransferFilters};
use scout_session::{
    ChannelState, LAST_ROOM_CODE_KEY, ReconnectPolicy, SessionConfig, SessionError, SessionInput,
    SessionManager, SessionNotice, Signal, StateKind, Target,
};
use scout_testkit::{MockChannel, MockSignaling};
use serde_json::json;

struct Harness {
    manager: SessionManager,
    signaling: Arc<MockSignaling>,
    storage: Arc<MemoryKeyValueStore>,
    now: Instant,
}

impl Harness {
    fn new(config: SessionConfig) -> Self {
        let signaling = MockSignaling::new();
        let storage = Arc::new(MemoryKeyValueStore::new());
        let manager =
            SessionManager::new(config, signaling.clone(), storage.clone(), "Local");
        Self {
            manager,
            signaling,
            storage,
            now: Instant::now(),
        }
    }

    fn handle(&mut self, input: SessionInput) -> Vec<SessionNotice> {
        self.manager.handle(self.now, input)
    }

    fn advance(&mut self, by: Duration) -> Vec<SessionNotice> {
        self.now += by;
        self.handle(SessionInput::Tick)
    }

    fn connect(&mut self, peer_id: &str) -> MockChannel {
        let channel = MockChannel::open(peer_id);
        self.handle(SessionInput::PeerConnected {
            peer_id: peer_id.into(),
            name: format!("name-{peer_id}"),
            channel: channel.boxed(),
        });
        channel
    }

    fn lead_with(peers: &[&str]) -> (Self, Vec<MockChannel>) {
        let mut harness = Self::new(SessionConfig::default());
        harness.handle(SessionInput::HostRoom);
        let channels = peers.iter().map(|id| harness.connect(id)).collect();
        (harness, channels)
    }

    fn connected_scout(config: SessionConfig) -> (Self, MockChannel) {
        let mut harness = Self::new(config);
        harness.handle(SessionInput::JoinRoom {
            room_code: "246810".into(),
        });
        let channel = harness.connect("lead");
        (harness, channel)
    }
}

fn has_error(notices: &[SessionNotice], pred: impl Fn(&SessionError) -> bool) -> bool {
    notices
        .iter()
        .any(|n| matches!(n, SessionNotice::Error(err) if pred(err)))
}

#[test]
fn hosting_opens_a_six_digit_room() {
    let mut h = Harness::new(SessionConfig::default());
    let notices = h.handle(SessionInput::HostRoom);

    let code = h.manager.room_code().unwrap().clone();
    assert_eq!(code.as_str().len(), 6);
    assert_eq!(h.signaling.joined(), vec![code.to_string()]);
    assert_eq!(notices, vec![
        SessionNotice::StateChanged {
            from: StateKind::Select,
            to: StateKind::Lead,
        },
        SessionNotice::RoomOpened { room_code: code },
    ]);
    assert!(!h.manager.shows_room_entry());
}

#[test]
fn cannot_hold_two_roles() {
    let mut h = Harness::new(SessionConfig::default());
    h.handle(SessionInput::HostRoom);
    let notices = h.handle(SessionInput::JoinRoom {
        room_code: "123456".into(),
    });
    assert!(has_error(&notices, |e| matches!(
        e,
        SessionError::InvalidTransition { .. }
    )));
    assert_eq!(h.manager.kind(), StateKind::Lead);
}

#[test]
fn scout_join_saves_code_and_suppresses_entry_once_connected() {
    let mut h = Harness::new(SessionConfig::default());
    h.handle(SessionInput::JoinRoom {
        room_code: " 246810 ".into(),
    });
    assert_eq!(
        h.storage.get(LAST_ROOM_CODE_KEY).as_deref(),
        Some("246810")
    );
    assert_eq!(h.manager.kind(), StateKind::Scout);
    assert!(!h.manager.shows_room_entry());

    h.connect("lead");
    assert_eq!(h.manager.kind(), StateKind::Connected);

    // The countdown is gone: ticking past the old deadline changes nothing.
    let notices = h.advance(Duration::from_secs(45));
    assert!(notices.is_empty());
    assert_eq!(h.manager.kind(), StateKind::Connected);
}

#[test]
fn signaling_failure_returns_to_select() {
    let mut h = Harness::new(SessionConfig::default());
    h.signaling.fail_joins(true);
    let notices = h.handle(SessionInput::JoinRoom {
        room_code: "123456".into(),
    });
    assert!(has_error(&notices, |e| matches!(e, SessionError::Transport(_))));
    assert_eq!(h.manager.kind(), StateKind::Select);
}

#[test]
fn negotiation_signals_are_routed_by_role() {
    let mut h = Harness::new(SessionConfig::default());
    h.handle(SessionInput::HostRoom);
    let offer = Signal::Offer {
        from: "scout-1".into(),
        name: "Ada".into(),
        sdp: "v=0".into(),
    };
    let notices = h.handle(SessionInput::RemoteSignal(offer.clone()));
    assert_eq!(notices, vec![SessionNotice::Negotiate(offer)]);

    let stray_answer = Signal::Answer {
        from: "other".into(),
        to: "someone-else".into(),
        sdp: "v=0".into(),
    };
    assert!(h.handle(SessionInput::RemoteSignal(stray_answer)).is_empty());

    let own = Signal::Offer {
        from: h.manager.local_id().to_string(),
        name: "Local".into(),
        sdp: "v=0".into(),
    };
    assert!(h.handle(SessionInput::RemoteSignal(own)).is_empty());

    let answer = Signal::Answer {
        from: h.manager.local_id().to_string(),
        to: "scout-1".into(),
        sdp: "v=0".into(),
    };
    assert!(h.handle(SessionInput::LocalSignal(answer)).is_empty());
    assert_eq!(h.signaling.published().len(), 1);
}

#[test]
fn lead_broadcast_reaches_open_channels_only() {
    let (mut h, channels) = Harness::lead_with(&["s1", "s2", "s3"]);
    channels[1].set_state(ChannelState::Closing);

    let request_id = h
        .manager
        .request(&Target::AllOpen, DataType::Scouting, TransferFilters::all())
        .unwrap();
    assert_eq!(channels[0].sent().len(), 1);
    assert!(channels[1].sent().is_empty());
    assert_eq!(channels[2].sent().len(), 1);

    let sent = &channels[0].sent_json()[0];
    assert_eq!(sent["type"], "request");
    assert_eq!(sent["dataType"], "scouting");
    assert_eq!(sent["requestId"], request_id.as_str());
    assert_eq!(
        h.manager.active_transfer().map(|t| t.data_type),
        Some(DataType::Scouting)
    );
}

#[test]
fn broadcast_with_no_open_channel_fails() {
    let (h, channels) = Harness::lead_with(&["s1"]);
    channels[0].set_state(ChannelState::Closed);
    let err = h
        .manager
        .push(&Target::AllOpen, DataType::Match, json!({"matches": []}))
        .unwrap_err();
    assert_eq!(err, SessionError::NoOpenPeers);
}

#[test]
fn one_failing_peer_does_not_block_the_broadcast() {
    let (h, channels) = Harness::lead_with(&["s1", "s2"]);
    channels[0].fail_sends(true);
    let sent = h
        .manager
        .push(&Target::AllOpen, DataType::Scout, json!({"scouts": []}))
        .unwrap();
    assert_eq!(sent, 1);
    assert_eq!(channels[1].sent_json()[0]["type"], "push");
}

#[test]
fn targeted_request_carries_filters() {
    let (mut h, channels) = Harness::lead_with(&["s1", "s2"]);
    let filters = TransferFilters::all()
        .with_match_range(MatchRange::Last { count: 3 })
        .with_teams(vec![1234]);
    h.manager
        .request(&Target::Peer("s2".into()), DataType::PitScouting, filters)
        .unwrap();
    assert!(channels[0].sent().is_empty());
    let sent = &channels[1].sent_json()[0];
    assert_eq!(sent["filters"]["matchRange"], json!({"last": {"count": 3}}));
    assert_eq!(sent["filters"]["teams"], json!([1234]));
}

#[test]
fn invalid_filters_block_the_request() {
    let (mut h, channels) = Harness::lead_with(&["s1"]);
    let filters = TransferFilters::all().with_match_range(MatchRange::Custom { start: 10, end: 2 });
    let err = h
        .manager
        .request(&Target::AllOpen, DataType::Scouting, filters)
        .unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert!(channels[0].sent().is_empty());
}

#[test]
fn incoming_messages_become_notices() {
    let (mut h, _channels) = Harness::lead_with(&["s1"]);

    let notices = h.handle(SessionInput::ChannelMessage {
        peer_id: "s1".into(),
        text: json!({"type": "scouting", "data": {"entries": []}}).to_string(),
    });
    assert_eq!(notices, vec![SessionNotice::Payload {
        peer_id: "s1".into(),
        peer_name: "name-s1".into(),
        data_type: DataType::Scouting,
        data: json!({"entries": []}),
        pushed: false,
    }]);

    let notices = h.handle(SessionInput::ChannelMessage {
        peer_id: "s1".into(),
        text: r#"{"type":"pushed","dataType":"match"}"#.into(),
    });
    assert_eq!(notices, vec![SessionNotice::PushConfirmed {
        peer_id: "s1".into(),
        data_type: DataType::Match,
    }]);

    // Garbage is dropped without an error.
    let notices = h.handle(SessionInput::ChannelMessage {
        peer_id: "s1".into(),
        text: "{not json".into(),
    });
    assert!(notices.is_empty());

    let notices = h.handle(SessionInput::ChannelMessage {
        peer_id: "ghost".into(),
        text: "{}".into(),
    });
    assert!(has_error(&notices, |e| matches!(e, SessionError::UnknownPeer(_))));
}

#[test]
fn scout_answers_and_declines_requests() {
    let (mut h, lead) = Harness::connected_scout(SessionConfig::default());
    let notices = h.handle(SessionInput::ChannelMessage {
        peer_id: "lead".into(),
        text: json!({"type": "request", "dataType": "combined", "requestId": "r9"}).to_string(),
    });
    assert!(matches!(
        notices.as_slice(),
        [SessionNotice::Request { request_id, data_type: DataType::Combined, .. }] if request_id == "r9"
    ));

    h.manager
        .respond("lead", DataType::Combined, json!({"entries": {}, "profiles": {}}))
        .unwrap();
    h.manager.decline("lead", "r10").unwrap();
    let sent = lead.sent_json();
    assert_eq!(sent[0]["type"], "combined");
    assert_eq!(sent[1], json!({"type": "declined", "requestId": "r10"}));
}

#[test]
fn lead_survives_single_scout_drop() {
    let (mut h, _channels) = Harness::lead_with(&["s1", "s2"]);
    let notices = h.handle(SessionInput::ChannelClosed {
        peer_id: "s1".into(),
    });
    assert_eq!(notices, vec![SessionNotice::PeerLeft {
        peer_id: "s1".into()
    }]);
    assert_eq!(h.manager.kind(), StateKind::Connected);
    assert_eq!(h.manager.peers().len(), 1);
    assert!(h.signaling.left().is_empty());
}

#[test]
fn lead_disconnecting_last_scout_goes_back_to_waiting() {
    let (mut h, channels) = Harness::lead_with(&["s1"]);
    h.handle(SessionInput::DisconnectPeer {
        peer_id: "s1".into(),
    });
    assert!(channels[0].is_closed());
    assert_eq!(h.manager.kind(), StateKind::Lead);
}

#[test]
fn dropped_scout_rejoins_saved_room_once() {
    let (mut h, _lead) = Harness::connected_scout(SessionConfig::default());
    let notices = h.handle(SessionInput::ChannelClosed {
        peer_id: "lead".into(),
    });

    assert!(notices.contains(&SessionNotice::StateChanged {
        from: StateKind::Connected,
        to: StateKind::Disconnected,
    }));
    assert!(notices.iter().any(|n| matches!(
        n,
        SessionNotice::Reconnecting { attempt: 1, .. }
    )));
    assert_eq!(h.manager.kind(), StateKind::Scout);
    assert!(h.manager.is_reconnecting());
    assert_eq!(h.signaling.joined(), vec!["246810", "246810"]);

    // The rejoin never reaches a lead: the join times out and the scout is
    // back at room entry with no second automatic attempt.
    let notices = h.advance(Duration::from_secs(30));
    assert!(has_error(&notices, |e| matches!(
        e,
        SessionError::JoinTimedOut { .. }
    )));
    assert_eq!(h.manager.kind(), StateKind::Select);
    assert!(!h.manager.is_reconnecting());
}

#[test]
fn reconnect_budget_is_per_drop() {
    let (mut h, _lead) = Harness::connected_scout(SessionConfig::default());
    h.handle(SessionInput::ChannelClosed {
        peer_id: "lead".into(),
    });
    h.connect("lead");
    assert!(!h.manager.is_reconnecting());

    let notices = h.handle(SessionInput::ChannelClosed {
        peer_id: "lead".into(),
    });
    assert!(notices.iter().any(|n| matches!(
        n,
        SessionNotice::Reconnecting { attempt: 1, .. }
    )));
}

#[test]
fn drop_without_saved_code_requires_manual_rejoin() {
    let (mut h, _lead) = Harness::connected_scout(SessionConfig::default());
    h.storage.remove(LAST_ROOM_CODE_KEY);
    let notices = h.handle(SessionInput::ChannelClosed {
        peer_id: "lead".into(),
    });
    assert!(has_error(&notices, |e| *e == SessionError::ManualRejoinRequired));
    assert_eq!(h.manager.kind(), StateKind::Select);
    assert!(h.manager.shows_room_entry());
}

#[test]
fn disabled_policy_waits_for_manual_rejoin() {
    let config = SessionConfig::default().with_reconnect(ReconnectPolicy::disabled());
    let (mut h, _lead) = Harness::connected_scout(config);
    let notices = h.handle(SessionInput::ChannelClosed {
        peer_id: "lead".into(),
    });
    assert!(has_error(&notices, |e| matches!(e, SessionError::Transport(_))));
    assert_eq!(h.manager.kind(), StateKind::Disconnected);
    assert!(h.manager.shows_room_entry());

    h.handle(SessionInput::Rejoin);
    assert_eq!(h.manager.kind(), StateKind::Scout);
    assert_eq!(h.manager.room_code().unwrap().as_str(), "246810");
}

#[test]
fn backoff_delays_the_rejoin() {
    let config = SessionConfig::default()
        .with_reconnect(ReconnectPolicy::default().with_backoff(Duration::from_secs(3)));
    let (mut h, _lead) = Harness::connected_scout(config);
    h.handle(SessionInput::ChannelClosed {
        peer_id: "lead".into(),
    });
    assert_eq!(h.manager.kind(), StateKind::Disconnected);

    h.advance(Duration::from_secs(2));
    assert_eq!(h.manager.kind(), StateKind::Disconnected);
    h.advance(Duration::from_secs(1));
    assert_eq!(h.manager.kind(), StateKind::Scout);
}

#[test]
fn reset_releases_everything() {
    let (mut h, channels) = Harness::lead_with(&["s1", "s2"]);
    let code = h.manager.room_code().unwrap().to_string();
    let notices = h.handle(SessionInput::Reset);

    assert!(channels.iter().all(MockChannel::is_closed));
    assert_eq!(h.signaling.left(), vec![code]);
    assert!(h.manager.peers().is_empty());
    assert_eq!(notices.last(), Some(&SessionNotice::StateChanged {
        from: StateKind::Connected,
        to: StateKind::Select,
    }));

    // Reset in select is a no-op.
    assert!(h.handle(SessionInput::Reset).is_empty());
}

#[test]
fn scout_disconnect_leaves_the_room_without_reconnecting() {
    let (mut h, lead) = Harness::connected_scout(SessionConfig::default());
    h.handle(SessionInput::DisconnectPeer {
        peer_id: "lead".into(),
    });
    assert!(lead.is_closed());
    assert_eq!(h.manager.kind(), StateKind::Select);
    assert!(!h.manager.is_reconnecting());
    assert_eq!(h.signaling.joined(), vec!["246810"]);
}
