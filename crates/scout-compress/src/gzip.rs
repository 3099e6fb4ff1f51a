//! Gzip helpers.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::CompressError;

pub(crate) fn compress(data: &[u8], level: u32) -> Result<Vec<u8>, CompressError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder
        .write_all(data)
        .map_err(|e| CompressError::Gzip(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CompressError::Gzip(e.to_string()))
}

/// Inflate at most `limit` bytes.
pub(crate) fn decompress(data: &[u8], limit: usize) -> Result<Vec<u8>, CompressError> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| CompressError::Gzip(e.to_string()))?;
    if out.len() > limit {
        return Err(CompressError::DecodedTooLarge { limit });
    }
    Ok(out)
}
