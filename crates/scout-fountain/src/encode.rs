//! Fountain encoder: payload bytes to a cycle of QR packets.
//!
//! The payload is cut into `k` equal blocks (the last one zero padded) and
//! Reed-Solomon parity blocks are appended. The code is maximum distance
//! separable: any `k` distinct packets rebuild the payload.

use reed_solomon_erasure::galois_8::ReedSolomon;
use tracing::debug;

use crate::packet::{MAX_BLOCKS, MAX_PACKET_ID, payload_checksum};
use crate::{EncodeError, FountainConfig, FountainPacket, FountainPlan, TransferProfile, WireFormat};

/// Fountain encoder for one payload.
#[derive(Debug)]
pub struct FountainEncoder {
    plan: FountainPlan,
    session_id: String,
    checksum: String,
    /// Source blocks followed by parity blocks, `target_packets` in all.
    shards: Vec<Vec<u8>>,
}

impl FountainEncoder {
    /// Create an encoder with a fresh random session id.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::EmptyPayload` for empty input and
    /// `EncodeError::PayloadTooLarge` above the configured maximum or when the
    /// packet budget would not fit one erasure code.
    pub fn new(
        payload: &[u8],
        profile: TransferProfile,
        config: &FountainConfig,
    ) -> Result<Self, EncodeError> {
        Self::with_session_id(payload, profile, config, new_session_id())
    }

    /// Create an encoder with an explicit session id.
    ///
    /// # Errors
    ///
    /// Same as [`FountainEncoder::new`].
    pub fn with_session_id(
        payload: &[u8],
        profile: TransferProfile,
        config: &FountainConfig,
        session_id: impl Into<String>,
    ) -> Result<Self, EncodeError> {
        if payload.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }
        let plan = FountainPlan::new(payload.len(), profile);
        let max = config
            .max_payload_bytes
            .min(MAX_BLOCKS as usize * usize::from(plan.block_size));
        if payload.len() > max {
            return Err(EncodeError::PayloadTooLarge {
                size: payload.len(),
                max,
            });
        }

        let shards = encode_shards(payload, &plan)?;
        let session_id = session_id.into();
        debug!(
            session_id = %session_id,
            bytes = payload.len(),
            profile = %profile,
            blocks = plan.estimated_blocks,
            target = plan.target_packets,
            "fountain encoder ready"
        );
        Ok(Self {
            plan,
            session_id,
            checksum: payload_checksum(payload),
            shards,
        })
    }

    /// Packet budget for this payload.
    #[must_use]
    pub const fn plan(&self) -> &FountainPlan {
        &self.plan
    }

    /// Session id stamped on every packet.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The `target_packets` packets to cycle: every source block, then repair
    /// blocks.
    #[must_use]
    pub fn packets(&self) -> Vec<FountainPacket> {
        let block_count = u32::try_from(self.plan.estimated_blocks).unwrap_or(MAX_BLOCKS);
        self.shards
            .iter()
            .enumerate()
            .map(|(index, shard)| FountainPacket {
                session_id: self.session_id.clone(),
                packet_id: u32::try_from(index).unwrap_or(MAX_PACKET_ID),
                profile: Some(self.plan.profile),
                transfer_length: self.plan.payload_bytes as u64,
                symbol_size: self.plan.block_size,
                block_count,
                checksum: Some(self.checksum.clone()),
                data: shard.clone(),
            })
            .collect()
    }

    /// Packets rendered as QR strings.
    #[must_use]
    pub fn wire_packets(&self, format: WireFormat) -> Vec<String> {
        self.packets().iter().map(|p| p.to_wire(format)).collect()
    }
}

fn encode_shards(payload: &[u8], plan: &FountainPlan) -> Result<Vec<Vec<u8>>, EncodeError> {
    let size = usize::from(plan.block_size);
    let mut shards: Vec<Vec<u8>> = payload
        .chunks(size)
        .map(|chunk| {
            let mut block = chunk.to_vec();
            block.resize(size, 0);
            block
        })
        .collect();
    shards.resize(plan.target_packets, vec![0; size]);

    let coder = ReedSolomon::new(plan.estimated_blocks, plan.repair_packets())
        .map_err(|e| EncodeError::Erasure(e.to_string()))?;
    coder
        .encode(&mut shards)
        .map_err(|e| EncodeError::Erasure(e.to_string()))?;
    Ok(shards)
}

/// Random 8-hex-digit session id.
#[must_use]
pub fn new_session_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn emits_target_packets_with_sequential_ids() {
        let config = FountainConfig::default();
        let encoder =
            FountainEncoder::with_session_id(&payload(5_000), TransferProfile::Fast, &config, "s1")
                .unwrap();
        let plan = *encoder.plan();
        assert_eq!(plan.block_size, 520);
        assert_eq!(plan.estimated_blocks, 10);
        assert_eq!(plan.target_packets, 15);

        let packets = encoder.packets();
        assert_eq!(packets.len(), plan.target_packets);
        let ids: Vec<u32> = packets.iter().map(|p| p.packet_id).collect();
        assert_eq!(ids, (0..15).collect::<Vec<_>>());
        assert!(packets.iter().all(|p| p.data.len() == 520));
    }

    #[test]
    fn source_packets_are_the_payload_blocks() {
        let data = payload(1_000);
        let encoder = FountainEncoder::with_session_id(
            &data,
            TransferProfile::Reliable,
            &FountainConfig::default(),
            "s2",
        )
        .unwrap();
        let packets = encoder.packets();
        assert_eq!(packets[0].data, data[..220]);
    }

    #[test]
    fn empty_and_oversized_payloads_rejected() {
        let config = FountainConfig {
            max_payload_bytes: 100,
            ..FountainConfig::default()
        };
        assert!(matches!(
            FountainEncoder::new(&[], TransferProfile::Fast, &config),
            Err(EncodeError::EmptyPayload)
        ));
        assert!(matches!(
            FountainEncoder::new(&payload(101), TransferProfile::Fast, &config),
            Err(EncodeError::PayloadTooLarge { size: 101, max: 100 })
        ));
    }

    #[test]
    fn packet_budget_must_fit_one_code() {
        let config = FountainConfig {
            max_payload_bytes: usize::MAX,
            ..FountainConfig::default()
        };
        // 204 blocks of 620 bytes is the largest fast transfer.
        let largest = FountainEncoder::new(&payload(204 * 620), TransferProfile::Fast, &config)
            .unwrap();
        assert_eq!(largest.packets().len(), 255);
        assert!(matches!(
            FountainEncoder::new(&payload(204 * 620 + 1), TransferProfile::Fast, &config),
            Err(EncodeError::PayloadTooLarge { max: 126_480, .. })
        ));
    }

    #[test]
    fn session_ids_are_eight_hex_digits() {
        let id = new_session_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
