//! Merge session: classify a batch, apply the automatic cases, then walk the
//! user through whatever needs a decision.

use std::collections::{BTreeMap, VecDeque};

use scout_core::{EntryStore, ScoutingEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Classification, ConflictInfo, MergeConfig, MergeError, classify};

/// One decision for the whole batch-review queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchDecision {
    ReplaceAll,
    SkipAll,
    /// Move every queued entry into the one-at-a-time conflict queue.
    ReviewEach,
}

/// Decision for a single conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Skip,
    Replace,
}

/// Outcome of a finished merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    pub added: usize,
    pub replaced: usize,
    pub duplicates_skipped: usize,
    pub conflicts_resolved: usize,
}

impl MergeSummary {
    /// Entries written (added or replaced).
    #[must_use]
    pub const fn written(&self) -> usize {
        self.added + self.replaced
    }
}

#[derive(Debug)]
struct Decided {
    conflict: ConflictInfo,
    resolution: Resolution,
}

/// An in-progress merge against one store.
///
/// Automatic imports and replacements are written by [`MergeSession::begin`].
/// Batch-review and conflict entries wait for decisions; every write is a
/// single-entry save so a failure never leaves a half-written entry.
pub struct MergeSession<'s, S: EntryStore + ?Sized> {
    store: &'s S,
    source: String,
    undo_depth: usize,
    batch: Vec<ConflictInfo>,
    conflicts: VecDeque<ConflictInfo>,
    undo: VecDeque<Decided>,
    summary: MergeSummary,
}

impl<S: EntryStore + ?Sized> std::fmt::Debug for MergeSession<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeSession")
            .field("source", &self.source)
            .field("batch", &self.batch.len())
            .field("conflicts", &self.conflicts.len())
            .field("undo", &self.undo.len())
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl<'s, S: EntryStore + ?Sized> MergeSession<'s, S> {
    /// Classify `incoming` from scout `source` and apply the automatic cases.
    ///
    /// Entries repeated within `incoming` collapse to their last occurrence.
    pub async fn begin(
        store: &'s S,
        incoming: Vec<ScoutingEntry>,
        source: &str,
        config: &MergeConfig,
    ) -> Result<Self, MergeError> {
        let mut session = Self {
            store,
            source: source.to_string(),
            undo_depth: config.undo_depth,
            batch: Vec::new(),
            conflicts: VecDeque::new(),
            undo: VecDeque::new(),
            summary: MergeSummary::default(),
        };

        let received = incoming.len();
        let mut latest: BTreeMap<String, ScoutingEntry> = BTreeMap::new();
        for entry in incoming {
            latest.insert(entry.id(), entry);
        }
        if latest.len() < received {
            debug!(
                received,
                unique = latest.len(),
                "collapsed repeated entries in incoming batch"
            );
        }

        let mut auto_replaced = 0_usize;
        for entry in latest.into_values() {
            let existing = store.find_by_key(&entry.key()).await?;
            match classify(&entry, existing.as_ref()) {
                Classification::AutoImport => {
                    store.save_entry(entry).await?;
                    session.summary.added += 1;
                }
                Classification::Duplicate => session.summary.duplicates_skipped += 1,
                Classification::AutoReplace => {
                    if let Some(existing) = existing {
                        session.write_replacement(&existing, entry).await?;
                        auto_replaced += 1;
                    }
                }
                Classification::BatchReview => {
                    if let Some(existing) = existing {
                        session.batch.push(ConflictInfo::new(entry, existing));
                    }
                }
                Classification::Conflict => {
                    if let Some(existing) = existing {
                        session.conflicts.push_back(ConflictInfo::new(entry, existing));
                    }
                }
            }
        }

        info!(
            source = %session.source,
            added = session.summary.added,
            auto_replaced,
            duplicates = session.summary.duplicates_skipped,
            batch_review = session.batch.len(),
            conflicts = session.conflicts.len(),
            "incoming entries classified"
        );
        Ok(session)
    }

    /// Name of the scout the entries came from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Entries waiting for a whole-batch decision.
    #[must_use]
    pub fn batch_review(&self) -> &[ConflictInfo] {
        &self.batch
    }

    /// Conflicts still queued, current one first.
    #[must_use]
    pub fn conflicts(&self) -> impl ExactSizeIterator<Item = &ConflictInfo> {
        self.conflicts.iter()
    }

    /// The conflict currently waiting for a decision.
    #[must_use]
    pub fn current_conflict(&self) -> Option<&ConflictInfo> {
        if self.batch.is_empty() {
            self.conflicts.front()
        } else {
            None
        }
    }

    /// Entries still needing any decision.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.batch.len() + self.conflicts.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Decisions that can currently be undone.
    #[must_use]
    pub fn undo_available(&self) -> usize {
        self.undo.len()
    }

    /// Counters so far.
    #[must_use]
    pub const fn summary(&self) -> MergeSummary {
        self.summary
    }

    /// Decide the whole batch-review queue.
    pub async fn apply_batch(&mut self, decision: BatchDecision) -> Result<(), MergeError> {
        let count = self.batch.len();
        match decision {
            BatchDecision::ReplaceAll => {
                while let Some(item) = self.batch.pop() {
                    if let Err(err) = self.write_replacement(&item.existing, item.incoming.clone()).await {
                        self.batch.push(item);
                        return Err(err);
                    }
                }
            }
            BatchDecision::SkipAll => {
                self.summary.duplicates_skipped += count;
                self.batch.clear();
            }
            BatchDecision::ReviewEach => {
                // Batch entries go ahead of the original conflicts.
                for item in self.batch.drain(..).rev() {
                    self.conflicts.push_front(item);
                }
            }
        }
        info!(?decision, count, "batch review decided");
        Ok(())
    }

    /// Decide the current conflict.
    pub async fn resolve(&mut self, resolution: Resolution) -> Result<(), MergeError> {
        if !self.batch.is_empty() {
            return Err(MergeError::BatchReviewPending);
        }
        let conflict = self
            .conflicts
            .pop_front()
            .ok_or(MergeError::NoPendingConflict)?;

        if resolution == Resolution::Replace {
            if let Err(err) = self
                .write_replacement(&conflict.existing, conflict.incoming.clone())
                .await
            {
                self.conflicts.push_front(conflict);
                return Err(err);
            }
        }
        self.summary.conflicts_resolved += 1;
        debug!(id = %conflict.incoming.id(), ?resolution, "conflict resolved");

        self.undo.push_back(Decided {
            conflict,
            resolution,
        });
        while self.undo.len() > self.undo_depth {
            self.undo.pop_front();
        }
        Ok(())
    }

    /// Revert the last interactive decision and make its conflict current again.
    pub async fn undo(&mut self) -> Result<&ConflictInfo, MergeError> {
        let decided = self.undo.pop_back().ok_or(MergeError::NothingToUndo)?;
        if decided.resolution == Resolution::Replace {
            let restore = self.restore(&decided.conflict).await;
            if let Err(err) = restore {
                self.undo.push_back(decided);
                return Err(err);
            }
            self.summary.replaced -= 1;
        }
        self.summary.conflicts_resolved -= 1;
        debug!(id = %decided.conflict.incoming.id(), "decision undone");
        self.conflicts.push_front(decided.conflict);
        self.conflicts.front().ok_or(MergeError::NoPendingConflict)
    }

    /// Resolve everything left with one strategy: the batch queue with the
    /// matching batch decision, then every conflict.
    pub async fn resolve_all(&mut self, resolution: Resolution) -> Result<(), MergeError> {
        let decision = match resolution {
            Resolution::Skip => BatchDecision::SkipAll,
            Resolution::Replace => BatchDecision::ReplaceAll,
        };
        if !self.batch.is_empty() {
            self.apply_batch(decision).await?;
        }
        while !self.conflicts.is_empty() {
            self.resolve(resolution).await?;
        }
        Ok(())
    }

    /// Close the session and report.
    pub fn finish(self) -> Result<MergeSummary, MergeError> {
        let remaining = self.remaining();
        if remaining > 0 {
            return Err(MergeError::Unresolved { remaining });
        }
        info!(
            source = %self.source,
            added = self.summary.added,
            replaced = self.summary.replaced,
            duplicates_skipped = self.summary.duplicates_skipped,
            conflicts_resolved = self.summary.conflicts_resolved,
            "merge finished"
        );
        Ok(self.summary)
    }

    async fn write_replacement(
        &mut self,
        existing: &ScoutingEntry,
        incoming: ScoutingEntry,
    ) -> Result<(), MergeError> {
        let incoming_id = incoming.id();
        self.store.save_entry(incoming).await?;
        let existing_id = existing.id();
        if existing_id != incoming_id {
            self.store.delete_entry(&existing_id).await?;
        }
        self.summary.replaced += 1;
        Ok(())
    }

    async fn restore(&self, conflict: &ConflictInfo) -> Result<(), MergeError> {
        let incoming_id = conflict.incoming.id();
        self.store.save_entry(conflict.existing.clone()).await?;
        if conflict.existing.id() != incoming_id {
            self.store.delete_entry(&incoming_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::{AllianceColor, MemoryEntryStore};
    use scout_testkit::fixtures;

    fn conflicting(n: u32) -> (ScoutingEntry, ScoutingEntry) {
        let existing = fixtures::entry(n, 1000 + n, AllianceColor::Red);
        let mut incoming = existing.clone();
        incoming.comments = format!("revised {n}");
        (existing, incoming)
    }

    #[tokio::test]
    async fn undo_is_bounded() {
        let pairs: Vec<_> = (1..=4).map(conflicting).collect();
        let store = MemoryEntryStore::with_entries(pairs.iter().map(|(e, _)| e.clone()));
        let incoming = pairs.iter().map(|(_, i)| i.clone()).collect();
        let config = MergeConfig { undo_depth: 2 };

        let mut session = MergeSession::begin(&store, incoming, "Grace", &config)
            .await
            .unwrap();
        for _ in 0..4 {
            session.resolve(Resolution::Skip).await.unwrap();
        }
        assert_eq!(session.undo_available(), 2);
        session.undo().await.unwrap();
        session.undo().await.unwrap();
        assert_eq!(session.undo().await.unwrap_err(), MergeError::NothingToUndo);
        assert_eq!(session.remaining(), 2);
    }

    #[tokio::test]
    async fn undoing_a_replace_restores_the_previous_entry() {
        let (existing, incoming) = conflicting(12);
        let store = MemoryEntryStore::with_entries([existing.clone()]);
        let mut session =
            MergeSession::begin(&store, vec![incoming.clone()], "Grace", &MergeConfig::default())
                .await
                .unwrap();

        session.resolve(Resolution::Replace).await.unwrap();
        assert_eq!(store.snapshot(), vec![incoming.clone()]);
        assert_eq!(session.summary().replaced, 1);

        let current = session.undo().await.unwrap();
        assert_eq!(current.incoming, incoming);
        assert_eq!(store.snapshot(), vec![existing]);
        assert_eq!(session.summary(), MergeSummary::default());
    }

    #[tokio::test]
    async fn conflicts_wait_for_the_batch_decision() {
        let (existing, incoming) = conflicting(3);
        let dup_existing = fixtures::entry(5, 55, AllianceColor::Blue);
        let mut dup_incoming = dup_existing.clone();
        dup_incoming.scout_name = "Linus".into();

        let store = MemoryEntryStore::with_entries([existing, dup_existing]);
        let mut session = MergeSession::begin(
            &store,
            vec![incoming, dup_incoming],
            "Linus",
            &MergeConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(session.batch_review().len(), 1);
        assert!(session.current_conflict().is_none());
        assert_eq!(
            session.resolve(Resolution::Skip).await.unwrap_err(),
            MergeError::BatchReviewPending
        );

        session.apply_batch(BatchDecision::ReviewEach).await.unwrap();
        assert_eq!(session.conflicts().len(), 2);
        assert_eq!(
            session.current_conflict().map(|c| c.incoming.scout_name.as_str()),
            Some("Linus")
        );
    }

    #[tokio::test]
    async fn finish_refuses_open_decisions() {
        let (existing, incoming) = conflicting(8);
        let store = MemoryEntryStore::with_entries([existing]);
        let session = MergeSession::begin(&store, vec![incoming], "Ada", &MergeConfig::default())
            .await
            .unwrap();
        assert_eq!(
            session.finish().unwrap_err(),
            MergeError::Unresolved { remaining: 1 }
        );
    }
}
