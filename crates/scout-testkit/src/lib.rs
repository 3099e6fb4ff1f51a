//! Test kit for the scout sync crates.
//!
//! - Deterministic fixtures: entries, placeholder entries, the synthetic
//!   60-entry export and generic JSON datasets
//! - In-memory transport mocks: [`MockSignaling`] and [`MockChannel`]
//! - [`FlakyEntryStore`] for driving import failure paths
//! - Tracing configuration for test output
//!
//! # Example
//!
//! ```rust,ignore
//! use scout_testkit::{MockSignaling, fixtures};
//!
//! #[tokio::test]
//! async fn scout_times_out() {
//!     scout_testkit::init_test_tracing();
//!     let signaling = MockSignaling::new();
//!     // build a SessionManager around `signaling` ...
//! }
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::missing_panics_doc)]

pub mod fixtures;
mod mocks;
mod tracing_config;

pub use mocks::*;
pub use tracing_config::*;
