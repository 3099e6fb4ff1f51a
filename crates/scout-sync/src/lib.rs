//! Composition of the scout sync subsystems.
//!
//! # Overview
//!
//! - [`DataTypeRegistry`]: one [`TransferHandler`] per data type, deciding how
//!   local data is exported and how received data is imported
//! - [`ImportPipeline`]: received payloads imported one at a time, with a
//!   processed counter that only advances on success
//! - [`QrTransfer`] / [`QrReceiver`]: dataset to QR frames and back, through the
//!   compression selector and the fountain codec
//! - [`SyncConfig`]: every subsystem's configuration from one TOML file
//!
//! In-session transfers skip the fountain layer: the session manager carries
//! the JSON payload directly and hands it to the pipeline.

#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

mod config;
mod error;
mod handlers;
mod pipeline;
mod qr;
mod registry;

pub use config::SyncConfig;
pub use error::{ConfigError, ImportError, SyncError, TransferError};
pub use handlers::{
    CombinedHandler, MatchScheduleHandler, PitScoutingHandler, ProfileHandler, ScoutingHandler,
};
pub use pipeline::{ImportOutcome, ImportPipeline, ReceivedPayload, answer_request};
pub use qr::{QrReceiver, QrTransfer, ScanOutcome, decode_scans, encode_frames};
pub use registry::{DataTypeRegistry, Dataset, ImportContext, ImportReport, TransferHandler};
