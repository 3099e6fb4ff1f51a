//! In-memory stand-ins for the transport and store collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use scout_core::{AllianceColor, EntryKey, EntryStore, MemoryEntryStore, ScoutingEntry, StoreError};
use scout_session::{ChannelState, DataChannel, RoomCode, Signal, SignalingPort, TransportError};

// ─────────────────────────────────────────────────────────────────────────────
// Signaling
// ─────────────────────────────────────────────────────────────────────────────

/// Recording signaling rendezvous.
///
/// Nothing is ever delivered: tests feed remote signals to the manager
/// themselves. Join failures can be switched on to simulate an unreachable
/// service.
#[derive(Debug)]
pub struct MockSignaling {
    joined: Mutex<Vec<String>>,
    left: Mutex<Vec<String>>,
    published: Mutex<Vec<(String, Signal)>>,
    fail_join: AtomicBool,
    connected: AtomicBool,
}

impl Default for MockSignaling {
    fn default() -> Self {
        Self {
            joined: Mutex::new(Vec::new()),
            left: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            fail_join: AtomicBool::new(false),
            connected: AtomicBool::new(true),
        }
    }
}

impl MockSignaling {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every following `join` fail.
    pub fn fail_joins(&self, fail: bool) {
        self.fail_join.store(fail, Ordering::SeqCst);
        self.connected.store(!fail, Ordering::SeqCst);
    }

    /// Rooms joined, in order.
    #[must_use]
    pub fn joined(&self) -> Vec<String> {
        self.joined.lock().clone()
    }

    /// Rooms left, in order.
    #[must_use]
    pub fn left(&self) -> Vec<String> {
        self.left.lock().clone()
    }

    /// Signals published, with their room.
    #[must_use]
    pub fn published(&self) -> Vec<(String, Signal)> {
        self.published.lock().clone()
    }
}

impl SignalingPort for MockSignaling {
    fn join(&self, room: &RoomCode) -> Result<(), TransportError> {
        if self.fail_join.load(Ordering::SeqCst) {
            return Err(TransportError::SignalingUnavailable(
                "mock signaling offline".to_string(),
            ));
        }
        self.joined.lock().push(room.to_string());
        Ok(())
    }

    fn leave(&self, room: &RoomCode) {
        self.left.lock().push(room.to_string());
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn publish(&self, room: &RoomCode, signal: &Signal) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::SignalingUnavailable(
                "mock signaling offline".to_string(),
            ));
        }
        self.published.lock().push((room.to_string(), signal.clone()));
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Data channel
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct ChannelInner {
    peer_id: String,
    state: ChannelState,
    sent: Vec<String>,
    fail_sends: bool,
}

/// Recording data channel.
///
/// Clones share state, so a test keeps one clone and hands the other to the
/// session manager.
#[derive(Clone, Debug)]
pub struct MockChannel {
    inner: Arc<Mutex<ChannelInner>>,
}

impl MockChannel {
    /// An open channel to `peer_id`.
    #[must_use]
    pub fn open(peer_id: &str) -> Self {
        Self::with_state(peer_id, ChannelState::Open)
    }

    #[must_use]
    pub fn with_state(peer_id: &str, state: ChannelState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChannelInner {
                peer_id: peer_id.to_string(),
                state,
                sent: Vec::new(),
                fail_sends: false,
            })),
        }
    }

    /// Boxed clone for `SessionInput::PeerConnected`.
    #[must_use]
    pub fn boxed(&self) -> Box<dyn DataChannel> {
        Box::new(self.clone())
    }

    pub fn set_state(&self, state: ChannelState) {
        self.inner.lock().state = state;
    }

    /// Make sends fail while the channel still reports open.
    pub fn fail_sends(&self, fail: bool) {
        self.inner.lock().fail_sends = fail;
    }

    /// Messages sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.inner.lock().sent.clone()
    }

    /// Sent messages parsed as JSON.
    #[must_use]
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().state == ChannelState::Closed
    }
}

impl DataChannel for MockChannel {
    fn ready_state(&self) -> ChannelState {
        self.inner.lock().state
    }

    fn send(&self, text: &str) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.state != ChannelState::Open {
            return Err(TransportError::ChannelClosed {
                peer_id: inner.peer_id.clone(),
            });
        }
        if inner.fail_sends {
            return Err(TransportError::SendFailed {
                peer_id: inner.peer_id.clone(),
                reason: "mock send failure".to_string(),
            });
        }
        inner.sent.push(text.to_string());
        Ok(())
    }

    fn close(&self) {
        self.inner.lock().state = ChannelState::Closed;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry store
// ─────────────────────────────────────────────────────────────────────────────

/// Entry store whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyEntryStore {
    inner: MemoryEntryStore,
    fail_writes: AtomicBool,
}

impl FlakyEntryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = ScoutingEntry>) -> Self {
        Self {
            inner: MemoryEntryStore::with_entries(entries),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make saves and deletes fail until switched off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The backing store.
    #[must_use]
    pub const fn inner(&self) -> &MemoryEntryStore {
        &self.inner
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EntryStore for FlakyEntryStore {
    async fn load_entries(&self) -> Result<Vec<ScoutingEntry>, StoreError> {
        self.inner.load_entries().await
    }

    async fn save_entry(&self, entry: ScoutingEntry) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.save_entry(entry).await
    }

    async fn delete_entry(&self, id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.delete_entry(id).await
    }

    async fn find_existing_entry(
        &self,
        match_number: u32,
        team_number: u32,
        alliance_color: AllianceColor,
        event_key: &str,
    ) -> Result<Option<ScoutingEntry>, StoreError> {
        self.inner
            .find_existing_entry(match_number, team_number, alliance_color, event_key)
            .await
    }

    async fn find_by_key(&self, key: &EntryKey) -> Result<Option<ScoutingEntry>, StoreError> {
        self.inner.find_by_key(key).await
    }
}
