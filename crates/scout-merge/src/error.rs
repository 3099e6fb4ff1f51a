//! Merge error types.

use scout_core::StoreError;
use thiserror::Error;

/// Errors from a merge session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A local store read or write failed. The merge can be retried.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no conflict is waiting for a decision")]
    NoPendingConflict,

    #[error("the batch-review queue needs a decision first")]
    BatchReviewPending,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("{remaining} entries still need a decision")]
    Unresolved { remaining: usize },
}
