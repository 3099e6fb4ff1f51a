//! Order-independent packet reassembly.

use std::collections::HashSet;

use reed_solomon_erasure::galois_8::ReedSolomon;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::packet::payload_checksum;
use crate::{DecodeError, FountainConfig, FountainPacket};

/// Reassembly progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Distinct packet ids accepted.
    pub received: u32,
    /// Block count K.
    pub needed: u32,
}

/// Result of offering one packet to the receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// New packet buffered; payload not yet reconstructed.
    Accepted(Progress),
    /// Packet id already seen.
    Duplicate(Progress),
    /// Packet belongs to another session, or to one already completed.
    Ignored,
    /// Payload reconstructed.
    Complete(Vec<u8>),
}

struct Reassembly {
    session_id: String,
    transfer_length: u64,
    symbol_size: u16,
    block_count: u32,
    checksum: Option<String>,
    /// One slot per packet id, source blocks first.
    shards: Vec<Option<Vec<u8>>>,
    received: usize,
}

impl Reassembly {
    fn start(packet: &FountainPacket) -> Self {
        Self {
            session_id: packet.session_id.clone(),
            transfer_length: packet.transfer_length,
            symbol_size: packet.symbol_size,
            block_count: packet.block_count,
            checksum: packet.checksum.clone(),
            shards: vec![None; packet.total_packets()],
            received: 0,
        }
    }

    fn matches_layout(&self, packet: &FountainPacket) -> bool {
        self.transfer_length == packet.transfer_length
            && self.symbol_size == packet.symbol_size
            && self.block_count == packet.block_count
    }

    fn progress(&self) -> Progress {
        Progress {
            received: u32::try_from(self.received).unwrap_or(u32::MAX),
            needed: self.block_count,
        }
    }

    fn is_ready(&self) -> bool {
        self.received >= self.block_count as usize
    }

    /// Rebuild the payload from any `block_count` buffered shards.
    fn reconstruct(&mut self) -> Result<Vec<u8>, DecodeError> {
        let data = self.block_count as usize;
        let parity = self.shards.len() - data;
        let failed = |e: reed_solomon_erasure::Error| DecodeError::Reconstruction(e.to_string());
        ReedSolomon::new(data, parity)
            .map_err(failed)?
            .reconstruct_data(&mut self.shards)
            .map_err(failed)?;

        let mut payload = Vec::with_capacity(data * usize::from(self.symbol_size));
        for shard in &self.shards[..data] {
            match shard {
                Some(block) => payload.extend_from_slice(block),
                None => return Err(DecodeError::Reconstruction("source block missing".into())),
            }
        }
        payload.truncate(usize::try_from(self.transfer_length).unwrap_or(usize::MAX));
        Ok(payload)
    }
}

/// Packets from a session other than the active one, held until it is clear
/// the sender has moved on.
struct Challenger {
    session_id: String,
    seen: HashSet<u32>,
    packets: Vec<FountainPacket>,
}

/// Collects fountain packets for one transfer at a time and yields the payload
/// once enough distinct blocks arrive.
///
/// Never returns partial output: until the decoder succeeds the caller only sees
/// progress. Stray packets from another session are ignored, but a run of
/// `session_switch_packets` of them replaces the active reassembly.
pub struct FountainReceiver {
    max_payload_bytes: usize,
    switch_after: usize,
    current: Option<Reassembly>,
    challenger: Option<Challenger>,
    completed_session: Option<String>,
}

impl std::fmt::Debug for FountainReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FountainReceiver")
            .field("max_payload_bytes", &self.max_payload_bytes)
            .field("active", &self.current.as_ref().map(|r| r.session_id.as_str()))
            .field("challenger", &self.challenger.as_ref().map(|c| c.session_id.as_str()))
            .field("completed_session", &self.completed_session)
            .finish()
    }
}

impl FountainReceiver {
    /// Create a receiver.
    #[must_use]
    pub fn new(config: &FountainConfig) -> Self {
        Self {
            max_payload_bytes: config.max_payload_bytes,
            switch_after: config.session_switch_packets.max(1),
            current: None,
            challenger: None,
            completed_session: None,
        }
    }

    /// Offer a parsed packet.
    ///
    /// # Errors
    ///
    /// `TransferTooLarge` if the advertised payload exceeds the configured limit,
    /// `LayoutMismatch` if the packet disagrees with its session, and
    /// `ChecksumMismatch` or `Reconstruction` if the rebuilt bytes cannot be
    /// trusted (the buffer is discarded).
    pub fn accept(&mut self, packet: FountainPacket) -> Result<ReceiveOutcome, DecodeError> {
        if self.completed_session.as_deref() == Some(packet.session_id.as_str()) {
            trace!(session_id = %packet.session_id, "packet for completed session");
            return Ok(ReceiveOutcome::Ignored);
        }
        let foreign = self
            .current
            .as_ref()
            .is_some_and(|current| current.session_id != packet.session_id);
        if foreign {
            return self.challenge(packet);
        }
        self.challenger = None;

        let reassembly = match &mut self.current {
            Some(current) => current,
            slot @ None => {
                if packet.transfer_length > self.max_payload_bytes as u64 {
                    return Err(DecodeError::TransferTooLarge {
                        size: packet.transfer_length,
                        max: self.max_payload_bytes,
                    });
                }
                debug!(
                    session_id = %packet.session_id,
                    bytes = packet.transfer_length,
                    blocks = packet.block_count,
                    "fountain session started"
                );
                slot.insert(Reassembly::start(&packet))
            }
        };

        if !reassembly.matches_layout(&packet) {
            return Err(DecodeError::LayoutMismatch {
                packet_id: packet.packet_id,
            });
        }
        let packet_id = packet.packet_id;
        let Some(slot) = reassembly.shards.get_mut(packet_id as usize) else {
            return Err(DecodeError::LayoutMismatch { packet_id });
        };
        if slot.is_some() {
            return Ok(ReceiveOutcome::Duplicate(reassembly.progress()));
        }
        *slot = Some(packet.data);
        reassembly.received += 1;
        if reassembly.checksum.is_none() {
            reassembly.checksum = packet.checksum;
        }
        if !reassembly.is_ready() {
            let progress = reassembly.progress();
            trace!(received = progress.received, needed = progress.needed, "packet buffered");
            return Ok(ReceiveOutcome::Accepted(progress));
        }

        let Some(mut finished) = self.current.take() else {
            return Ok(ReceiveOutcome::Ignored);
        };
        let payload = match finished.reconstruct() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(session_id = %finished.session_id, error = %err, "reassembly discarded");
                return Err(err);
            }
        };
        if let Some(expected) = finished.checksum {
            let actual = payload_checksum(&payload);
            if actual != expected {
                warn!(session_id = %finished.session_id, "reconstructed payload failed checksum");
                return Err(DecodeError::ChecksumMismatch { expected, actual });
            }
        }
        info!(
            session_id = %finished.session_id,
            bytes = payload.len(),
            packets = finished.received,
            "fountain payload reconstructed"
        );
        self.completed_session = Some(finished.session_id);
        Ok(ReceiveOutcome::Complete(payload))
    }

    /// Hold a packet from a session other than the active one. Once enough of
    /// them arrive back to back, the sender has restarted: drop the active
    /// reassembly and replay the held packets.
    fn challenge(&mut self, packet: FountainPacket) -> Result<ReceiveOutcome, DecodeError> {
        let mut challenger = match self.challenger.take() {
            Some(challenger) if challenger.session_id == packet.session_id => challenger,
            _ => Challenger {
                session_id: packet.session_id.clone(),
                seen: HashSet::new(),
                packets: Vec::new(),
            },
        };
        if challenger.seen.insert(packet.packet_id) {
            challenger.packets.push(packet);
        }
        if challenger.packets.len() < self.switch_after {
            trace!(
                session_id = %challenger.session_id,
                held = challenger.packets.len(),
                "packet for another session"
            );
            self.challenger = Some(challenger);
            return Ok(ReceiveOutcome::Ignored);
        }

        if let Some(stale) = self.current.take() {
            warn!(
                abandoned = %stale.session_id,
                session_id = %challenger.session_id,
                received = stale.received,
                "sender switched sessions, dropping stale reassembly"
            );
        }
        let mut outcome = Ok(ReceiveOutcome::Ignored);
        for held in challenger.packets {
            outcome = self.accept(held);
            if matches!(outcome, Ok(ReceiveOutcome::Complete(_)) | Err(_)) {
                break;
            }
        }
        outcome
    }

    /// Offer a scanned QR string. Unparseable strings and rejected packets are
    /// scan noise: they are logged and reported as `Ignored`.
    pub fn accept_text(&mut self, text: &str) -> ReceiveOutcome {
        let result = FountainPacket::parse(text)
            .map_err(DecodeError::from)
            .and_then(|packet| self.accept(packet));
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(error = %err, "dropping scanned packet");
                ReceiveOutcome::Ignored
            }
        }
    }

    /// Progress of the active reassembly.
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        self.current.as_ref().map(Reassembly::progress)
    }

    /// Session currently being reassembled.
    #[must_use]
    pub fn active_session(&self) -> Option<&str> {
        self.current.as_ref().map(|r| r.session_id.as_str())
    }

    /// Abandon the active reassembly and forget completed sessions.
    pub fn reset(&mut self) {
        if let Some(current) = self.current.take() {
            debug!(session_id = %current.session_id, "fountain session abandoned");
        }
        self.challenger = None;
        self.completed_session = None;
    }
}
