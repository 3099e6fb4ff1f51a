//! Block sizing and redundancy planning (NORMATIVE).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Payloads below this many bytes use the first block-size tier.
pub const SMALL_PAYLOAD_BYTES: usize = 4_000;

/// Payloads below this many bytes use the second block-size tier.
pub const MEDIUM_PAYLOAD_BYTES: usize = 16_000;

/// Transfer profile for QR cycling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferProfile {
    /// Larger blocks, fewer frames.
    #[default]
    Fast,
    /// Smaller blocks and more redundancy for poor scanning conditions.
    Reliable,
}

impl TransferProfile {
    /// Wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Reliable => "reliable",
        }
    }

    /// Block size for a payload of `payload_bytes`.
    ///
    /// | profile  | < 4000 | < 16000 | larger |
    /// |----------|--------|---------|--------|
    /// | fast     | 260    | 520     | 620    |
    /// | reliable | 220    | 400     | 500    |
    #[must_use]
    pub const fn block_size(self, payload_bytes: usize) -> u16 {
        let tier = if payload_bytes < SMALL_PAYLOAD_BYTES {
            0
        } else if payload_bytes < MEDIUM_PAYLOAD_BYTES {
            1
        } else {
            2
        };
        match self {
            Self::Fast => [260, 520, 620][tier],
            Self::Reliable => [220, 400, 500][tier],
        }
    }
}

impl fmt::Display for TransferProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Self::Fast),
            "reliable" => Ok(Self::Reliable),
            other => Err(format!("unknown transfer profile {other:?}")),
        }
    }
}

/// Redundancy factor in basis points for a block count.
///
/// 18000 = 1.8x. Small transfers pay more because a single missed frame is
/// costly; large ones already cover losses probabilistically.
#[must_use]
pub const fn redundancy_bps(blocks: usize) -> u32 {
    match blocks {
        0..=3 => 18_000,
        4..=10 => 15_000,
        11..=30 => 13_500,
        _ => 12_500,
    }
}

/// `ceil(blocks * redundancy)`: how many packets a transfer of `blocks`
/// source blocks carries in total.
#[must_use]
pub const fn target_packets(blocks: usize) -> usize {
    (blocks * redundancy_bps(blocks) as usize).div_ceil(10_000)
}

/// Packet budget for one payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FountainPlan {
    pub profile: TransferProfile,
    pub payload_bytes: usize,
    pub block_size: u16,
    /// `ceil(payload_bytes / block_size)`; K for the decoder.
    pub estimated_blocks: usize,
    pub redundancy_bps: u32,
    /// `ceil(estimated_blocks * redundancy)`.
    pub target_packets: usize,
}

impl FountainPlan {
    /// Plan a transfer of `payload_bytes` with `profile`.
    #[must_use]
    pub fn new(payload_bytes: usize, profile: TransferProfile) -> Self {
        let block_size = profile.block_size(payload_bytes);
        let estimated_blocks = payload_bytes.div_ceil(usize::from(block_size));
        let redundancy_bps = redundancy_bps(estimated_blocks);
        let target_packets = target_packets(estimated_blocks);
        Self {
            profile,
            payload_bytes,
            block_size,
            estimated_blocks,
            redundancy_bps,
            target_packets,
        }
    }

    /// Redundancy as a factor (1.8, 1.5, ...).
    #[must_use]
    pub fn redundancy(&self) -> f64 {
        f64::from(self.redundancy_bps) / 10_000.0
    }

    /// Packets beyond the source blocks.
    #[must_use]
    pub const fn repair_packets(&self) -> usize {
        self.target_packets.saturating_sub(self.estimated_blocks)
    }
}
