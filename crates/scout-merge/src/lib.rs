//! Conflict detection and merge of incoming scouting entries.
//!
//! Incoming entries are classified against the local replica by identity key:
//! new entries are imported, exact duplicates skipped, placeholders replaced,
//! metadata-only differences queued for one batch decision and scored-content
//! differences queued for one-at-a-time review with undo.
//!
//! ```rust,ignore
//! let session = MergeSession::begin(&store, entries, "Ada", &MergeConfig::default()).await?;
//! let summary = resolve_with(session, &FixedResolver(Resolution::Replace)).await?;
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

mod classify;
mod config;
mod error;
mod resolver;
mod session;

pub use classify::{Classification, ConflictInfo, classify, material_fingerprint};
pub use config::MergeConfig;
pub use error::MergeError;
pub use resolver::{ConflictResolver, FixedResolver, resolve_with};
pub use session::{BatchDecision, MergeSession, MergeSummary, Resolution};
