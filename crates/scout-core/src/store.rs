//! Local store ports.
//!
//! The device's database is an external collaborator; the sync engine only reads
//! and writes through these traits. Each single-entry write must be atomic, but
//! there is no cross-entry transaction.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::{AllianceColor, EntryKey, ScoutingEntry, StoreError};

/// Scouting entry store (NORMATIVE contract).
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Load every stored entry.
    async fn load_entries(&self) -> Result<Vec<ScoutingEntry>, StoreError>;

    /// Insert or overwrite the entry stored under `entry.id()`.
    async fn save_entry(&self, entry: ScoutingEntry) -> Result<(), StoreError>;

    /// Delete an entry by id.
    ///
    /// # Errors
    /// Returns `NotFound` if no entry has that id.
    async fn delete_entry(&self, id: &str) -> Result<(), StoreError>;

    /// Find the entry recorded for a team in a match, by match number.
    ///
    /// Match numbers are not unique across match types (a qualification and a
    /// playoff can share one), so identity checks go through
    /// [`find_by_key`](Self::find_by_key).
    async fn find_existing_entry(
        &self,
        match_number: u32,
        team_number: u32,
        alliance_color: AllianceColor,
        event_key: &str,
    ) -> Result<Option<ScoutingEntry>, StoreError>;

    /// Find the entry stored under an identity key.
    async fn find_by_key(&self, key: &EntryKey) -> Result<Option<ScoutingEntry>, StoreError> {
        Ok(self
            .load_entries()
            .await?
            .into_iter()
            .find(|entry| entry.key() == *key))
    }
}

/// In-memory entry store.
///
/// Suitable for testing and the CLI's file-backed merge.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: RwLock<BTreeMap<String, ScoutingEntry>>,
}

impl MemoryEntryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = ScoutingEntry>) -> Self {
        let map = entries.into_iter().map(|e| (e.id(), e)).collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of every entry, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ScoutingEntry> {
        self.entries.read().values().cloned().collect()
    }
}

impl fmt::Debug for MemoryEntryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEntryStore")
            .field("entries", &self.len())
            .finish()
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn load_entries(&self) -> Result<Vec<ScoutingEntry>, StoreError> {
        Ok(self.snapshot())
    }

    async fn save_entry(&self, entry: ScoutingEntry) -> Result<(), StoreError> {
        self.entries.write().insert(entry.id(), entry);
        Ok(())
    }

    async fn delete_entry(&self, id: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn find_existing_entry(
        &self,
        match_number: u32,
        team_number: u32,
        alliance_color: AllianceColor,
        event_key: &str,
    ) -> Result<Option<ScoutingEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .values()
            .find(|e| {
                e.match_number == match_number
                    && e.team_number == team_number
                    && e.alliance_color == alliance_color
                    && e.event_key == event_key
            })
            .cloned())
    }

    async fn find_by_key(&self, key: &EntryKey) -> Result<Option<ScoutingEntry>, StoreError> {
        Ok(self.entries.read().get(&key.id()).cloned())
    }
}

/// Non-entry datasets held by the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKind {
    PitScouting,
    MatchSchedule,
    Profiles,
}

/// Store for whole datasets that are not match scouting entries.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Load a dataset, `None` if nothing has been stored yet.
    async fn load_dataset(&self, kind: DatasetKind) -> Result<Option<Value>, StoreError>;

    /// Replace a dataset wholesale.
    async fn replace_dataset(&self, kind: DatasetKind, value: Value) -> Result<(), StoreError>;
}

/// In-memory dataset store.
#[derive(Debug, Default)]
pub struct MemoryDatasetStore {
    datasets: RwLock<HashMap<DatasetKind, Value>>,
}

impl MemoryDatasetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetStore for MemoryDatasetStore {
    async fn load_dataset(&self, kind: DatasetKind) -> Result<Option<Value>, StoreError> {
        Ok(self.datasets.read().get(&kind).cloned())
    }

    async fn replace_dataset(&self, kind: DatasetKind, value: Value) -> Result<(), StoreError> {
        self.datasets.write().insert(kind, value);
        Ok(())
    }
}

/// Durable string key-value storage (the device's local storage).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str);
}

/// In-memory key-value storage.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.values.lock().remove(key);
    }
}
