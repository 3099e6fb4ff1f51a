//! Merge configuration.

use serde::{Deserialize, Serialize};

/// Merge engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Interactive decisions that can be undone.
    ///
    /// Default: 10
    pub undo_depth: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { undo_depth: 10 }
    }
}
