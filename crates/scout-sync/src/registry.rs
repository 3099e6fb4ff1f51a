//! Data-type registry: one [`TransferHandler`] per [`DataType`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use scout_core::{
    CombinedEnvelope, DataType, DatasetStore, EntriesEnvelope, EntryStore, MatchScheduleEnvelope,
    ProfileEnvelope, TransferFilters,
};
use scout_merge::{ConflictResolver, MergeConfig, MergeSummary};
use serde::Serialize;
use serde_json::Value;

use crate::ImportError;
use crate::handlers::{
    CombinedHandler, MatchScheduleHandler, PitScoutingHandler, ProfileHandler, ScoutingHandler,
};

/// A deserialized payload, typed by data type.
#[derive(Clone, Debug, PartialEq)]
pub enum Dataset {
    Scouting(EntriesEnvelope),
    PitScouting(EntriesEnvelope<Value>),
    Matches(MatchScheduleEnvelope),
    Profiles(ProfileEnvelope),
    Combined(CombinedEnvelope),
}

impl Dataset {
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Scouting(_) => DataType::Scouting,
            Self::PitScouting(_) => DataType::PitScouting,
            Self::Matches(_) => DataType::Match,
            Self::Profiles(_) => DataType::Scout,
            Self::Combined(_) => DataType::Combined,
        }
    }

    /// Records carried.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Scouting(env) => env.entries.len(),
            Self::PitScouting(env) => env.entries.len(),
            Self::Matches(env) => env.matches.len(),
            Self::Profiles(env) => profile_len(env),
            Self::Combined(env) => env.entries.entries.len() + profile_len(&env.profiles),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn profile_len(env: &ProfileEnvelope) -> usize {
    env.scouts.len() + env.predictions.len() + env.achievements.len()
}

/// Who sent a payload and who decides its conflicts.
#[derive(Clone, Copy)]
pub struct ImportContext<'a> {
    pub source: &'a str,
    pub resolver: &'a dyn ConflictResolver,
}

/// Counters for one imported payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub data_type: DataType,
    /// Records in the payload.
    pub records: usize,
    pub added: usize,
    pub replaced: usize,
    /// Unchanged or declined records.
    pub skipped: usize,
    pub conflicts_resolved: usize,
}

impl ImportReport {
    #[must_use]
    pub const fn empty(data_type: DataType, records: usize) -> Self {
        Self {
            data_type,
            records,
            added: 0,
            replaced: 0,
            skipped: 0,
            conflicts_resolved: 0,
        }
    }

    #[must_use]
    pub const fn from_merge(data_type: DataType, records: usize, summary: MergeSummary) -> Self {
        Self {
            data_type,
            records,
            added: summary.added,
            replaced: summary.replaced,
            skipped: summary.duplicates_skipped,
            conflicts_resolved: summary.conflicts_resolved,
        }
    }

    /// Add another report's counters into this one.
    #[must_use]
    pub const fn combine(mut self, other: Self) -> Self {
        self.records += other.records;
        self.added += other.added;
        self.replaced += other.replaced;
        self.skipped += other.skipped;
        self.conflicts_resolved += other.conflicts_resolved;
        self
    }
}

/// Serialize, deserialize and import strategy for one data type.
#[async_trait]
pub trait TransferHandler: Send + Sync {
    fn data_type(&self) -> DataType;

    /// Export local data for a peer, applying the request filters.
    async fn serialize(&self, filters: &TransferFilters) -> Result<Value, ImportError>;

    /// Check an incoming payload's shape.
    fn deserialize(&self, data: Value) -> Result<Dataset, ImportError>;

    /// Write a deserialized payload into the local store.
    async fn import(
        &self,
        dataset: Dataset,
        ctx: ImportContext<'_>,
    ) -> Result<ImportReport, ImportError>;
}

/// Handlers keyed by data type.
#[derive(Clone, Default)]
pub struct DataTypeRegistry {
    handlers: BTreeMap<DataType, Arc<dyn TransferHandler>>,
}

impl std::fmt::Debug for DataTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTypeRegistry")
            .field("data_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DataTypeRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard handler for every data type.
    #[must_use]
    pub fn with_stores(
        entries: Arc<dyn EntryStore>,
        datasets: Arc<dyn DatasetStore>,
        merge: MergeConfig,
    ) -> Self {
        let scouting = ScoutingHandler::new(entries, merge);
        let profiles = ProfileHandler::new(datasets.clone());
        let mut registry = Self::new();
        registry.register(Arc::new(scouting.clone()));
        registry.register(Arc::new(PitScoutingHandler::new(datasets.clone())));
        registry.register(Arc::new(MatchScheduleHandler::new(datasets)));
        registry.register(Arc::new(profiles.clone()));
        registry.register(Arc::new(CombinedHandler::new(scouting, profiles)));
        registry
    }

    /// Register a handler, returning the one it displaced.
    pub fn register(&mut self, handler: Arc<dyn TransferHandler>) -> Option<Arc<dyn TransferHandler>> {
        self.handlers.insert(handler.data_type(), handler)
    }

    pub fn get(&self, data_type: DataType) -> Result<&Arc<dyn TransferHandler>, ImportError> {
        self.handlers
            .get(&data_type)
            .ok_or(ImportError::UnsupportedDataType(data_type))
    }

    /// Registered data types.
    pub fn data_types(&self) -> impl Iterator<Item = DataType> + '_ {
        self.handlers.keys().copied()
    }

    /// Export local data of `data_type` for a peer. Filters are validated first.
    pub async fn serialize(
        &self,
        data_type: DataType,
        filters: &TransferFilters,
    ) -> Result<Value, ImportError> {
        filters.validate()?;
        self.get(data_type)?.serialize(filters).await
    }
}
