//! Injected source of merge decisions.
//!
//! The interactive UI implements [`ConflictResolver`]; the CLI and tests use
//! [`FixedResolver`].

use async_trait::async_trait;
use scout_core::EntryStore;

use crate::{BatchDecision, ConflictInfo, MergeError, MergeSession, MergeSummary, Resolution};

/// Makes the decisions a merge session cannot make on its own.
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    /// Decide the batch-review queue.
    async fn decide_batch(&self, source: &str, pending: &[ConflictInfo]) -> BatchDecision;

    /// Decide one conflict.
    async fn resolve(&self, source: &str, conflict: &ConflictInfo) -> Resolution;
}

/// Same answer for everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedResolver(pub Resolution);

#[async_trait]
impl ConflictResolver for FixedResolver {
    async fn decide_batch(&self, _source: &str, _pending: &[ConflictInfo]) -> BatchDecision {
        match self.0 {
            Resolution::Skip => BatchDecision::SkipAll,
            Resolution::Replace => BatchDecision::ReplaceAll,
        }
    }

    async fn resolve(&self, _source: &str, _conflict: &ConflictInfo) -> Resolution {
        self.0
    }
}

/// Drive `session` to completion with `resolver` and return the summary.
pub async fn resolve_with<S, R>(
    mut session: MergeSession<'_, S>,
    resolver: &R,
) -> Result<MergeSummary, MergeError>
where
    S: EntryStore + ?Sized,
    R: ConflictResolver + ?Sized,
{
    if !session.batch_review().is_empty() {
        let decision = resolver
            .decide_batch(session.source(), session.batch_review())
            .await;
        session.apply_batch(decision).await?;
    }
    while let Some(conflict) = session.current_conflict() {
        let resolution = resolver.resolve(session.source(), conflict).await;
        session.resolve(resolution).await?;
    }
    session.finish()
}
