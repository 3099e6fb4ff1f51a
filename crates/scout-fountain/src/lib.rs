//! Fountain-style chunking and QR packet codec for offline transfers.
//!
//! # Overview
//!
//! A compressed payload is split into fixed-size blocks and Reed-Solomon
//! parity blocks are appended, so a receiver scanning a cycling QR display
//! can reconstruct the payload from any `K` distinct packets, in any order,
//! with missed frames and repeats tolerated.
//!
//! - [`FountainPlan`]: block size and packet budget for a payload size and
//!   [`TransferProfile`]
//! - [`FountainEncoder`]: payload to packets
//! - [`FountainPacket`]: compact and legacy QR wire shapes
//! - [`FountainReceiver`]: order-independent reassembly, never exposing partial
//!   output
//!
//! The first `K` packet ids are the source blocks themselves; higher ids are
//! parity. The code is maximum distance separable over GF(2^8), which caps a
//! transfer at 256 packets ([`MAX_BLOCKS`] source blocks).

#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

mod config;
mod decode;
mod encode;
mod error;
mod packet;
mod plan;

pub use config::FountainConfig;
pub use decode::{FountainReceiver, Progress, ReceiveOutcome};
pub use encode::{FountainEncoder, new_session_id};
pub use error::{DecodeError, EncodeError, PacketError};
pub use packet::{
    COMPACT_VERSION, FountainPacket, HEADER_LEN, MAX_BLOCKS, MAX_PACKET_ID, MAX_PACKETS,
    PACKET_TYPE, WireFormat, payload_checksum,
};
pub use plan::{FountainPlan, TransferProfile, redundancy_bps, target_packets};
