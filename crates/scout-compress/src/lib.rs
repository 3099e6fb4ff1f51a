//! Payload compression and encoding selection.
//!
//! # Overview
//!
//! A dataset is serialized to JSON and, once it crosses
//! [`COMPRESSION_THRESHOLD_BYTES`], every applicable encoding is tried and the
//! smallest wins:
//!
//! 1. **Gzip** of the raw JSON
//! 2. **Key dictionary**: object keys replaced by integer indices, then gzip
//! 3. **Key + value dictionary**: frequent long string values also replaced, then gzip
//! 4. **Schema-aware**: a row-oriented codec for scouting-entry exports, then gzip
//!
//! The winning [`EncodingVariant`] travels with the bytes as a one-byte tag so the
//! receiver knows how to invert it. Every variant decodes back to exactly the
//! input value.

#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

mod config;
mod dictionary;
mod error;
mod gzip;
mod schema;
mod selector;

pub use config::{COMPRESSION_THRESHOLD_BYTES, CompressionConfig};
pub use error::CompressError;
pub use schema::matches_scouting_shape;
pub use selector::{
    CompressionReport, CompressionSelector, EncodedPayload, EncodingVariant, VariantSize,
    should_use_compression,
};
