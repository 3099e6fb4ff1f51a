//! Standard [`TransferHandler`] strategies.
//!
//! | data type      | export                 | import                                   |
//! |----------------|------------------------|------------------------------------------|
//! | `scouting`     | filtered entries       | merge engine with the injected resolver  |
//! | `pit-scouting` | filtered entries       | keyed by (event, team), newer wins       |
//! | `match`        | whole schedule         | replaces the stored schedule             |
//! | `scout`        | whole profile dataset  | keyed union, incoming record wins        |
//! | `combined`     | filtered entries + all profiles | both of the above               |

use std::sync::Arc;

use async_trait::async_trait;
use scout_core::{
    CombinedEnvelope, DataType, DatasetKind, DatasetStore, EntriesEnvelope, EntryStore,
    MatchScheduleEnvelope, ProfileEnvelope, TransferFilters,
};
use scout_merge::{MergeConfig, MergeSession, resolve_with};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::{Dataset, ImportContext, ImportError, ImportReport, TransferHandler};

fn to_value<T: Serialize>(data_type: DataType, value: &T) -> Result<Value, ImportError> {
    serde_json::to_value(value).map_err(|err| ImportError::invalid(data_type, err))
}

fn from_value<T: DeserializeOwned>(data_type: DataType, data: Value) -> Result<T, ImportError> {
    serde_json::from_value(data).map_err(|err| ImportError::invalid(data_type, err))
}

fn mismatch(expected: DataType, got: &Dataset) -> ImportError {
    ImportError::invalid(expected, format!("handler received {} dataset", got.data_type()))
}

/// Match scouting entries, merged through the conflict engine.
#[derive(Clone)]
pub struct ScoutingHandler {
    store: Arc<dyn EntryStore>,
    merge: MergeConfig,
}

impl ScoutingHandler {
    #[must_use]
    pub fn new(store: Arc<dyn EntryStore>, merge: MergeConfig) -> Self {
        Self { store, merge }
    }

    async fn export(&self, filters: &TransferFilters) -> Result<EntriesEnvelope, ImportError> {
        let entries = filters.apply(self.store.load_entries().await?);
        debug!(entries = entries.len(), "exporting scouting entries");
        Ok(EntriesEnvelope::new(entries))
    }

    async fn merge(
        &self,
        envelope: EntriesEnvelope,
        ctx: ImportContext<'_>,
    ) -> Result<ImportReport, ImportError> {
        let records = envelope.entries.len();
        let session =
            MergeSession::begin(self.store.as_ref(), envelope.entries, ctx.source, &self.merge)
                .await?;
        let summary = resolve_with(session, ctx.resolver).await?;
        Ok(ImportReport::from_merge(DataType::Scouting, records, summary))
    }
}

#[async_trait]
impl TransferHandler for ScoutingHandler {
    fn data_type(&self) -> DataType {
        DataType::Scouting
    }

    async fn serialize(&self, filters: &TransferFilters) -> Result<Value, ImportError> {
        to_value(DataType::Scouting, &self.export(filters).await?)
    }

    fn deserialize(&self, data: Value) -> Result<Dataset, ImportError> {
        from_value(DataType::Scouting, data).map(Dataset::Scouting)
    }

    async fn import(
        &self,
        dataset: Dataset,
        ctx: ImportContext<'_>,
    ) -> Result<ImportReport, ImportError> {
        match dataset {
            Dataset::Scouting(envelope) => self.merge(envelope, ctx).await,
            other => Err(mismatch(DataType::Scouting, &other)),
        }
    }
}

/// Pit scouting records: one per team per event.
#[derive(Clone)]
pub struct PitScoutingHandler {
    store: Arc<dyn DatasetStore>,
}

impl PitScoutingHandler {
    #[must_use]
    pub fn new(store: Arc<dyn DatasetStore>) -> Self {
        Self { store }
    }

    async fn stored(&self) -> Result<Vec<Value>, ImportError> {
        match self.store.load_dataset(DatasetKind::PitScouting).await? {
            None => Ok(Vec::new()),
            Some(value) => from_value(DataType::PitScouting, value),
        }
    }
}

fn pit_key(record: &Value) -> Option<(String, u64)> {
    let event = record.get("eventKey")?.as_str()?.to_string();
    let team = record.get("teamNumber")?.as_u64()?;
    Some((event, team))
}

fn record_timestamp(record: &Value) -> i64 {
    record.get("timestamp").and_then(Value::as_i64).unwrap_or(0)
}

#[async_trait]
impl TransferHandler for PitScoutingHandler {
    fn data_type(&self) -> DataType {
        DataType::PitScouting
    }

    async fn serialize(&self, filters: &TransferFilters) -> Result<Value, ImportError> {
        let entries = filters.apply(self.stored().await?);
        to_value(DataType::PitScouting, &EntriesEnvelope::new(entries))
    }

    fn deserialize(&self, data: Value) -> Result<Dataset, ImportError> {
        let envelope: EntriesEnvelope<Value> = from_value(DataType::PitScouting, data)?;
        if let Some(bad) = envelope.entries.iter().position(|e| pit_key(e).is_none()) {
            return Err(ImportError::invalid(
                DataType::PitScouting,
                format!("entry {bad} lacks eventKey or teamNumber"),
            ));
        }
        Ok(Dataset::PitScouting(envelope))
    }

    async fn import(
        &self,
        dataset: Dataset,
        _ctx: ImportContext<'_>,
    ) -> Result<ImportReport, ImportError> {
        let envelope = match dataset {
            Dataset::PitScouting(envelope) => envelope,
            other => return Err(mismatch(DataType::PitScouting, &other)),
        };
        let mut stored = self.stored().await?;
        let mut report = ImportReport::empty(DataType::PitScouting, envelope.entries.len());
        for incoming in envelope.entries {
            let key = pit_key(&incoming);
            let slot = stored.iter().position(|s| key.is_some() && pit_key(s) == key);
            match slot {
                None => {
                    stored.push(incoming);
                    report.added += 1;
                }
                Some(i) if stored[i] != incoming
                    && record_timestamp(&incoming) >= record_timestamp(&stored[i]) =>
                {
                    stored[i] = incoming;
                    report.replaced += 1;
                }
                Some(_) => report.skipped += 1,
            }
        }
        if report.added + report.replaced > 0 {
            self.store
                .replace_dataset(DatasetKind::PitScouting, Value::Array(stored))
                .await?;
        }
        Ok(report)
    }
}

/// Match schedule: the incoming schedule replaces the local one.
#[derive(Clone)]
pub struct MatchScheduleHandler {
    store: Arc<dyn DatasetStore>,
}

impl MatchScheduleHandler {
    #[must_use]
    pub fn new(store: Arc<dyn DatasetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TransferHandler for MatchScheduleHandler {
    fn data_type(&self) -> DataType {
        DataType::Match
    }

    async fn serialize(&self, _filters: &TransferFilters) -> Result<Value, ImportError> {
        let matches = match self.store.load_dataset(DatasetKind::MatchSchedule).await? {
            None => Vec::new(),
            Some(value) => from_value(DataType::Match, value)?,
        };
        to_value(DataType::Match, &MatchScheduleEnvelope { matches })
    }

    fn deserialize(&self, data: Value) -> Result<Dataset, ImportError> {
        from_value(DataType::Match, data).map(Dataset::Matches)
    }

    async fn import(
        &self,
        dataset: Dataset,
        _ctx: ImportContext<'_>,
    ) -> Result<ImportReport, ImportError> {
        let envelope = match dataset {
            Dataset::Matches(envelope) => envelope,
            other => return Err(mismatch(DataType::Match, &other)),
        };
        let had_schedule = self
            .store
            .load_dataset(DatasetKind::MatchSchedule)
            .await?
            .is_some();
        let records = envelope.matches.len();
        self.store
            .replace_dataset(DatasetKind::MatchSchedule, Value::Array(envelope.matches))
            .await?;
        let mut report = ImportReport::empty(DataType::Match, records);
        if had_schedule {
            report.replaced = records;
        } else {
            report.added = records;
        }
        info!(matches = records, replaced = had_schedule, "match schedule imported");
        Ok(report)
    }
}

const SCOUT_KEY: &[&str] = &["name"];
const PREDICTION_KEY: &[&str] = &["scoutName", "eventKey", "matchNumber"];
const ACHIEVEMENT_KEY: &[&str] = &["scoutName", "achievementId"];

/// Scout profiles, predictions and achievements.
#[derive(Clone)]
pub struct ProfileHandler {
    store: Arc<dyn DatasetStore>,
}

impl ProfileHandler {
    #[must_use]
    pub fn new(store: Arc<dyn DatasetStore>) -> Self {
        Self { store }
    }

    async fn stored(&self) -> Result<ProfileEnvelope, ImportError> {
        match self.store.load_dataset(DatasetKind::Profiles).await? {
            None => Ok(ProfileEnvelope::default()),
            Some(value) => from_value(DataType::Scout, value),
        }
    }

    async fn union(&self, incoming: ProfileEnvelope) -> Result<ImportReport, ImportError> {
        let mut stored = self.stored().await?;
        let mut report = ImportReport::empty(
            DataType::Scout,
            incoming.scouts.len() + incoming.predictions.len() + incoming.achievements.len(),
        );
        union_into(&mut stored.scouts, incoming.scouts, SCOUT_KEY, &mut report);
        union_into(&mut stored.predictions, incoming.predictions, PREDICTION_KEY, &mut report);
        union_into(&mut stored.achievements, incoming.achievements, ACHIEVEMENT_KEY, &mut report);
        if report.added + report.replaced > 0 {
            self.store
                .replace_dataset(DatasetKind::Profiles, to_value(DataType::Scout, &stored)?)
                .await?;
        }
        Ok(report)
    }
}

/// Key fields joined; `None` when a record carries none of them.
fn profile_key(record: &Value, fields: &[&str]) -> Option<String> {
    let parts: Vec<String> = fields
        .iter()
        .map(|field| record.get(*field).map_or_else(String::new, Value::to_string))
        .collect();
    parts.iter().any(|p| !p.is_empty()).then(|| parts.join("\u{1f}"))
}

fn union_into(stored: &mut Vec<Value>, incoming: Vec<Value>, key: &[&str], report: &mut ImportReport) {
    for record in incoming {
        let slot = profile_key(&record, key).and_then(|k| {
            stored
                .iter()
                .position(|s| profile_key(s, key).as_deref() == Some(k.as_str()))
        });
        match slot {
            Some(i) if stored[i] == record => report.skipped += 1,
            Some(i) => {
                stored[i] = record;
                report.replaced += 1;
            }
            None if stored.contains(&record) => report.skipped += 1,
            None => {
                stored.push(record);
                report.added += 1;
            }
        }
    }
}

#[async_trait]
impl TransferHandler for ProfileHandler {
    fn data_type(&self) -> DataType {
        DataType::Scout
    }

    async fn serialize(&self, _filters: &TransferFilters) -> Result<Value, ImportError> {
        to_value(DataType::Scout, &self.stored().await?)
    }

    fn deserialize(&self, data: Value) -> Result<Dataset, ImportError> {
        from_value(DataType::Scout, data).map(Dataset::Profiles)
    }

    async fn import(
        &self,
        dataset: Dataset,
        _ctx: ImportContext<'_>,
    ) -> Result<ImportReport, ImportError> {
        match dataset {
            Dataset::Profiles(envelope) => self.union(envelope).await,
            other => Err(mismatch(DataType::Scout, &other)),
        }
    }
}

/// Scouting entries and profile data together.
#[derive(Clone)]
pub struct CombinedHandler {
    scouting: ScoutingHandler,
    profiles: ProfileHandler,
}

impl CombinedHandler {
    #[must_use]
    pub const fn new(scouting: ScoutingHandler, profiles: ProfileHandler) -> Self {
        Self { scouting, profiles }
    }
}

#[async_trait]
impl TransferHandler for CombinedHandler {
    fn data_type(&self) -> DataType {
        DataType::Combined
    }

    async fn serialize(&self, filters: &TransferFilters) -> Result<Value, ImportError> {
        let envelope = CombinedEnvelope {
            entries: self.scouting.export(filters).await?,
            profiles: self.profiles.stored().await?,
        };
        to_value(DataType::Combined, &envelope)
    }

    fn deserialize(&self, data: Value) -> Result<Dataset, ImportError> {
        from_value(DataType::Combined, data).map(Dataset::Combined)
    }

    async fn import(
        &self,
        dataset: Dataset,
        ctx: ImportContext<'_>,
    ) -> Result<ImportReport, ImportError> {
        let envelope = match dataset {
            Dataset::Combined(envelope) => envelope,
            other => return Err(mismatch(DataType::Combined, &other)),
        };
        let entries = self.scouting.merge(envelope.entries, ctx).await?;
        let profiles = self.profiles.union(envelope.profiles).await?;
        let mut report = entries.combine(profiles);
        report.data_type = DataType::Combined;
        Ok(report)
    }
}
