//! QR packet codec.
//!
//! Two wire shapes, both accepted on input:
//!
//! ```text
//! compact: {"t":"fountain","s":sessionId,"i":packetId,"p":profile,"v":1,"d":base64(header || block)}
//! legacy:  {"type":"fountain","sessionId":..,"packetId":..,"data":base64(block),
//!           "k":blocks,"bytes":transferLength,"checksum":hex,"indices":[packetId]}
//! ```
//!
//! `header` is 6 bytes: transfer length (u32, big endian) then block size
//! (u16, big endian). The total packet count is not on the wire; both sides
//! derive it from the block count with [`target_packets`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::plan::target_packets;
use crate::{PacketError, TransferProfile};

/// Value of the `t` / `type` field.
pub const PACKET_TYPE: &str = "fountain";

/// Compact wire format version.
pub const COMPACT_VERSION: u64 = 1;

/// Length of the compact transfer header.
pub const HEADER_LEN: usize = 6;

/// Shards per transfer over GF(2^8): source and repair packets together.
pub const MAX_PACKETS: u32 = 256;

/// Largest packet id.
pub const MAX_PACKET_ID: u32 = MAX_PACKETS - 1;

/// Largest block count whose packet budget still fits in [`MAX_PACKETS`].
pub const MAX_BLOCKS: u32 = 204;

/// Wire shape used when rendering a packet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Compact,
    Legacy,
}

/// One fountain-coded block, normalized from either wire shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FountainPacket {
    pub session_id: String,
    /// Shard index; the first `block_count` ids are the source blocks.
    pub packet_id: u32,
    /// Absent on legacy packets.
    pub profile: Option<TransferProfile>,
    /// Length of the original payload.
    pub transfer_length: u64,
    pub symbol_size: u16,
    pub block_count: u32,
    /// BLAKE3 prefix of the payload; legacy packets only.
    pub checksum: Option<String>,
    pub data: Vec<u8>,
}

impl FountainPacket {
    /// Source plus repair packets in this packet's transfer.
    #[must_use]
    pub const fn total_packets(&self) -> usize {
        target_packets(self.block_count as usize)
    }

    fn header(&self) -> [u8; HEADER_LEN] {
        let mut header = [0; HEADER_LEN];
        // Bounded by MAX_BLOCKS * u16::MAX once validated.
        let length = u32::try_from(self.transfer_length).unwrap_or(u32::MAX);
        header[..4].copy_from_slice(&length.to_be_bytes());
        header[4..].copy_from_slice(&self.symbol_size.to_be_bytes());
        header
    }

    /// Render as a QR string.
    #[must_use]
    pub fn to_wire(&self, format: WireFormat) -> String {
        let value = match format {
            WireFormat::Compact => {
                let mut d = Vec::with_capacity(HEADER_LEN + self.data.len());
                d.extend_from_slice(&self.header());
                d.extend_from_slice(&self.data);
                serde_json::to_value(CompactPacket {
                    t: PACKET_TYPE.into(),
                    s: self.session_id.clone(),
                    i: self.packet_id,
                    p: self.profile.unwrap_or_default(),
                    v: COMPACT_VERSION,
                    d: STANDARD.encode(d),
                })
            }
            WireFormat::Legacy => serde_json::to_value(LegacyPacket {
                kind: PACKET_TYPE.into(),
                session_id: self.session_id.clone(),
                packet_id: self.packet_id,
                data: STANDARD.encode(&self.data),
                k: self.block_count,
                bytes: self.transfer_length,
                checksum: self.checksum.clone().unwrap_or_default(),
                indices: vec![self.packet_id],
            }),
        };
        // Both shapes are plain structs of strings and integers.
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    /// Parse either wire shape.
    pub fn parse(text: &str) -> Result<Self, PacketError> {
        let value: serde_json::Value =
            serde_json::from_str(text.trim()).map_err(|_| PacketError::UnrecognizedShape)?;
        if value.get("t").is_some() {
            let compact: CompactPacket =
                serde_json::from_value(value).map_err(|_| PacketError::UnrecognizedShape)?;
            Self::from_compact(compact)
        } else if value.get("type").is_some() {
            let legacy: LegacyPacket =
                serde_json::from_value(value).map_err(|_| PacketError::UnrecognizedShape)?;
            Self::from_legacy(legacy)
        } else {
            Err(PacketError::UnrecognizedShape)
        }
    }

    fn from_compact(p: CompactPacket) -> Result<Self, PacketError> {
        check_type(&p.t)?;
        if p.v != COMPACT_VERSION {
            return Err(PacketError::UnsupportedVersion(p.v));
        }
        let bytes = STANDARD
            .decode(p.d.as_bytes())
            .map_err(|_| PacketError::InvalidBase64)?;
        if bytes.len() <= HEADER_LEN {
            return Err(PacketError::invalid("data shorter than transfer header"));
        }
        let (header, symbol) = bytes.split_at(HEADER_LEN);
        let transfer_length = u64::from(u32::from_be_bytes([
            header[0], header[1], header[2], header[3],
        ]));
        let symbol_size = u16::from_be_bytes([header[4], header[5]]);

        let packet = Self {
            session_id: p.s,
            packet_id: p.i,
            profile: Some(p.p),
            transfer_length,
            symbol_size,
            block_count: block_count(transfer_length, symbol_size)?,
            checksum: None,
            data: symbol.to_vec(),
        };
        packet.validate()?;
        Ok(packet)
    }

    fn from_legacy(p: LegacyPacket) -> Result<Self, PacketError> {
        check_type(&p.kind)?;
        let data = STANDARD
            .decode(p.data.as_bytes())
            .map_err(|_| PacketError::InvalidBase64)?;
        if !p.indices.is_empty() && p.indices != [p.packet_id] {
            return Err(PacketError::invalid("indices disagree with packetId"));
        }
        let symbol_size = u16::try_from(data.len())
            .map_err(|_| PacketError::invalid("symbol larger than 65535 bytes"))?;
        let expected_blocks = block_count(p.bytes, symbol_size)?;
        if expected_blocks != p.k {
            return Err(PacketError::invalid(format!(
                "k = {} but {} bytes in {symbol_size}-byte blocks is {expected_blocks}",
                p.k, p.bytes
            )));
        }

        let packet = Self {
            session_id: p.session_id,
            packet_id: p.packet_id,
            profile: None,
            transfer_length: p.bytes,
            symbol_size,
            block_count: p.k,
            checksum: (!p.checksum.is_empty()).then_some(p.checksum),
            data,
        };
        packet.validate()?;
        Ok(packet)
    }

    fn validate(&self) -> Result<(), PacketError> {
        if self.session_id.is_empty() {
            return Err(PacketError::invalid("empty session id"));
        }
        if self.transfer_length == 0 {
            return Err(PacketError::invalid("empty transfer"));
        }
        if self.data.len() != usize::from(self.symbol_size) {
            return Err(PacketError::invalid("block length does not match header"));
        }
        if self.block_count == 0 || self.block_count > MAX_BLOCKS {
            return Err(PacketError::invalid("block count out of range"));
        }
        if self.packet_id as usize >= self.total_packets() {
            return Err(PacketError::invalid("packet id out of range"));
        }
        Ok(())
    }
}

/// First 8 bytes of the payload's BLAKE3 hash, hex encoded.
#[must_use]
pub fn payload_checksum(payload: &[u8]) -> String {
    hex::encode(&blake3::hash(payload).as_bytes()[..8])
}

fn block_count(transfer_length: u64, symbol_size: u16) -> Result<u32, PacketError> {
    if symbol_size == 0 {
        return Err(PacketError::invalid("zero symbol size"));
    }
    u32::try_from(transfer_length.div_ceil(u64::from(symbol_size)))
        .map_err(|_| PacketError::invalid("block count overflow"))
}

fn check_type(kind: &str) -> Result<(), PacketError> {
    if kind == PACKET_TYPE {
        Ok(())
    } else {
        Err(PacketError::WrongType(kind.to_string()))
    }
}

#[derive(Serialize, Deserialize)]
struct CompactPacket {
    t: String,
    s: String,
    i: u32,
    p: TransferProfile,
    v: u64,
    d: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyPacket {
    #[serde(rename = "type")]
    kind: String,
    session_id: String,
    packet_id: u32,
    data: String,
    k: u32,
    bytes: u64,
    checksum: String,
    indices: Vec<u32>,
}
