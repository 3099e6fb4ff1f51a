//! Lead and scout exchanging datasets over connected data channels.

use std::sync::Arc;
use std::time::Instant;

use scout_core::{
    AllianceColor, DataType, EntryStore, MatchRange, MemoryDatasetStore, MemoryEntryStore,
    MemoryKeyValueStore, TransferFilters,
};
use scout_merge::{FixedResolver, MergeConfig, Resolution};
use scout_session::{SessionConfig, SessionInput, SessionManager, SessionNotice, Target};
use scout_sync::{DataTypeRegistry, ImportPipeline, SyncError, answer_request};
use scout_testkit::{MockChannel, MockSignaling, fixtures};

struct Device {
    manager: SessionManager,
    entries: Arc<MemoryEntryStore>,
    registry: DataTypeRegistry,
    /// Channel towards the other device.
    channel: MockChannel,
    delivered: usize,
}

impl Device {
    fn new(name: &str, entries: MemoryEntryStore) -> Self {
        let entries = Arc::new(entries);
        let registry = DataTypeRegistry::with_stores(
            entries.clone(),
            Arc::new(MemoryDatasetStore::new()),
            MergeConfig::default(),
        );
        let manager = SessionManager::new(
            SessionConfig::default(),
            MockSignaling::new(),
            Arc::new(MemoryKeyValueStore::new()),
            name,
        );
        Self {
            manager,
            entries,
            registry,
            channel: MockChannel::open("unset"),
            delivered: 0,
        }
    }

    fn connect(&mut self, peer_id: &str, name: &str) {
        self.channel = MockChannel::open(peer_id);
        self.manager.handle(
            Instant::now(),
            SessionInput::PeerConnected {
                peer_id: peer_id.into(),
                name: name.into(),
                channel: self.channel.boxed(),
            },
        );
    }

    /// Messages this device sent since the last call.
    fn outbox(&mut self) -> Vec<String> {
        let sent = self.channel.sent();
        let fresh = sent[self.delivered..].to_vec();
        self.delivered = sent.len();
        fresh
    }

    fn receive(&mut self, from: &str, texts: Vec<String>) -> Vec<SessionNotice> {
        texts
            .into_iter()
            .flat_map(|text| {
                self.manager.handle(
                    Instant::now(),
                    SessionInput::ChannelMessage {
                        peer_id: from.into(),
                        text,
                    },
                )
            })
            .collect()
    }
}

fn pair(scout_entries: MemoryEntryStore) -> (Device, Device) {
    let mut lead = Device::new("Lead", MemoryEntryStore::new());
    lead.manager.handle(Instant::now(), SessionInput::HostRoom);
    lead.connect("scout-1", "Ada");

    let mut scout = Device::new("Ada", scout_entries);
    scout.manager.handle(
        Instant::now(),
        SessionInput::JoinRoom {
            room_code: "135790".into(),
        },
    );
    scout.connect("lead", "Lead");
    (lead, scout)
}

#[tokio::test]
async fn lead_pulls_filtered_entries_from_scout() {
    scout_testkit::init_test_tracing();
    let scout_entries = MemoryEntryStore::with_entries(
        (1..=10).flat_map(|m| {
            [
                fixtures::entry(m, 254, AllianceColor::Blue),
                fixtures::entry(m, 1678, AllianceColor::Red),
            ]
        }),
    );
    let (mut lead, mut scout) = pair(scout_entries);

    let filters = TransferFilters::all()
        .with_match_range(MatchRange::Last { count: 3 })
        .with_teams(vec![254]);
    lead.manager
        .request(&Target::AllOpen, DataType::Scouting, filters)
        .unwrap();

    let requests = lead.outbox();
    let notices = scout.receive("lead", requests);
    let request = notices
        .iter()
        .find(|n| matches!(n, SessionNotice::Request { .. }))
        .unwrap();
    assert!(answer_request(&scout.registry, &scout.manager, request).await.unwrap());

    let payloads = scout.outbox();
    let notices = lead.receive("scout-1", payloads);
    let mut pipeline = ImportPipeline::new(
        lead.registry.clone(),
        Arc::new(FixedResolver(Resolution::Skip)),
    );
    for notice in &notices {
        pipeline.offer(notice);
    }
    assert_eq!(pipeline.pending(), 1);

    let outcomes = pipeline.process_all().await.unwrap();
    assert_eq!(outcomes[0].report.added, 3);
    assert_eq!(pipeline.processed(), 1);

    let stored = lead.entries.load_entries().await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|e| e.team_number == 254 && e.match_number >= 8));
}

#[tokio::test]
async fn pushed_dataset_is_acknowledged() {
    let (mut lead, mut scout) = pair(MemoryEntryStore::new());

    let schedule = fixtures::json::match_schedule(4);
    let sent = lead
        .manager
        .push(&Target::AllOpen, DataType::Match, schedule)
        .unwrap();
    assert_eq!(sent, 1);

    let pushes = lead.outbox();
    let notices = scout.receive("lead", pushes);
    let mut pipeline = ImportPipeline::new(
        scout.registry.clone(),
        Arc::new(FixedResolver(Resolution::Skip)),
    );
    assert!(notices.iter().any(|n| pipeline.offer(n)));

    let outcome = pipeline.process_next().await.unwrap().unwrap();
    assert!(outcome.pushed);
    assert_eq!(outcome.report.added, 4);
    outcome.acknowledge(&scout.manager).unwrap();

    let acks = scout.outbox();
    let notices = lead.receive("scout-1", acks);
    assert!(notices.iter().any(|n| matches!(
        n,
        SessionNotice::PushConfirmed {
            data_type: DataType::Match,
            ..
        }
    )));
}

#[tokio::test]
async fn failed_export_declines_request() {
    scout_testkit::init_test_tracing_with_filter("scout_sync=debug");
    let (mut lead, mut scout) = pair(MemoryEntryStore::new());
    // The scout cannot export pit scouting without a handler.
    scout.registry = DataTypeRegistry::new();

    lead.manager
        .request(&Target::AllOpen, DataType::PitScouting, TransferFilters::all())
        .unwrap();
    let requests = lead.outbox();
    let notices = scout.receive("lead", requests);
    let err = answer_request(&scout.registry, &scout.manager, &notices[0])
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Import(_)));

    let replies = scout.outbox();
    let notices = lead.receive("scout-1", replies);
    assert!(notices.iter().any(|n| matches!(n, SessionNotice::Declined { .. })));
}

#[tokio::test]
async fn other_notices_are_not_answered() {
    let (_lead, scout) = pair(MemoryEntryStore::new());
    let notice = SessionNotice::PeerLeft {
        peer_id: "lead".into(),
    };
    assert!(!answer_request(&scout.registry, &scout.manager, &notice).await.unwrap());
}
