//! Fountain error types.

use thiserror::Error;

/// Errors while building fountain packets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Empty payload cannot be encoded.
    #[error("cannot encode empty payload")]
    EmptyPayload,

    /// Payload exceeds the configured maximum.
    #[error("payload too large: {size} bytes exceeds maximum {max} bytes")]
    PayloadTooLarge {
        /// Actual payload size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// The erasure coder rejected the block layout.
    #[error("erasure coding failed: {0}")]
    Erasure(String),
}

/// A scanned string that is not a usable fountain packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// Not JSON, or neither the compact nor the legacy field set.
    #[error("unrecognized packet shape")]
    UnrecognizedShape,

    /// Type field is not `fountain`.
    #[error("unexpected packet type {0:?}")]
    WrongType(String),

    /// Compact packet version other than 1.
    #[error("unsupported compact packet version {0}")]
    UnsupportedVersion(u64),

    /// Data field is not valid base64.
    #[error("packet data is not base64")]
    InvalidBase64,

    /// Packet fields are inconsistent with each other.
    #[error("invalid packet: {reason}")]
    Invalid {
        /// What was wrong.
        reason: String,
    },
}

impl PacketError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Errors while reassembling a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The packet could not be parsed.
    #[error(transparent)]
    Packet(#[from] PacketError),

    /// Packet belongs to the current session but disagrees with its layout.
    #[error("packet {packet_id} does not match session layout")]
    LayoutMismatch {
        /// Offending packet.
        packet_id: u32,
    },

    /// Reconstructed bytes did not match the advertised checksum.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Checksum carried by the packets.
        expected: String,
        /// Checksum of the reconstructed bytes.
        actual: String,
    },

    /// Enough blocks arrived but the erasure decoder could not rebuild the
    /// payload. The buffer is discarded.
    #[error("reconstruction failed: {0}")]
    Reconstruction(String),

    /// Advertised transfer is larger than the receiver accepts.
    #[error("transfer of {size} bytes exceeds maximum {max} bytes")]
    TransferTooLarge {
        /// Advertised size.
        size: u64,
        /// Maximum accepted size.
        max: usize,
    },
}
