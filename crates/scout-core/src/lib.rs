//! Shared data model for offline scout data synchronization.
//!
//! # Overview
//!
//! - **`ScoutingEntry`**: one team's recorded performance for one match, keyed by
//!   (eventKey, matchKey, teamNumber, allianceColor)
//! - **`DataType`** and the transfer envelopes exchanged between devices
//! - **`TransferFilters`**: match-range and team filters applied by the responding side
//! - **Store ports**: `EntryStore`, `DatasetStore`, `KeyValueStore`, plus in-memory
//!   implementations used by tests and the CLI
//!
//! The storage engine itself lives outside this workspace; everything here consumes
//! it through the small async contract in [`store`].

#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

mod data_type;
mod entry;
mod envelope;
mod error;
mod filter;
pub mod serde_helpers;
pub mod store;

pub use data_type::DataType;
pub use entry::{AllianceColor, EntryKey, ScoutingEntry};
pub use envelope::{
    CombinedEnvelope, EXPORT_VERSION, EntriesEnvelope, MatchScheduleEnvelope, ProfileEnvelope,
};
pub use error::{StoreError, ValidationError};
pub use filter::{Filterable, MatchRange, TransferFilters};
pub use store::{
    DatasetKind, DatasetStore, EntryStore, KeyValueStore, MemoryDatasetStore, MemoryEntryStore,
    MemoryKeyValueStore,
};
