//! QR transfer: dataset to a cycle of QR strings and back.
//!
//! The sender wraps the dataset in the same typed message used on data
//! channels, picks the smallest encoding, and fountain-encodes the framed
//! bytes. The receiver reverses this once enough distinct packets are scanned.

use scout_compress::{CompressionSelector, EncodingVariant};
use scout_core::DataType;
use scout_fountain::{
    DecodeError, FountainConfig, FountainEncoder, FountainPacket, FountainPlan, FountainReceiver,
    Progress, ReceiveOutcome, TransferProfile,
};
use scout_session::{MessageClass, WireMessage};
use serde_json::Value;
use tracing::{debug, info};

use crate::TransferError;

/// Frames prepared for display.
#[derive(Clone, Debug)]
pub struct QrTransfer {
    data_type: DataType,
    variant: EncodingVariant,
    plan: FountainPlan,
    session_id: String,
    frames: Vec<String>,
}

impl QrTransfer {
    /// Compress and fountain-encode `data` as a `data_type` payload.
    pub fn prepare(
        selector: &CompressionSelector,
        config: &FountainConfig,
        data_type: DataType,
        data: Value,
        profile: TransferProfile,
    ) -> Result<Self, TransferError> {
        let encoded = selector.encode_serializable(&WireMessage::payload(data_type, data))?;
        let bytes = encoded.to_bytes();
        let encoder = FountainEncoder::new(&bytes, profile, config)?;
        let frames = encoder.wire_packets(config.wire_format);
        info!(
            %data_type,
            variant = %encoded.variant,
            bytes = bytes.len(),
            frames = frames.len(),
            session_id = %encoder.session_id(),
            "QR transfer prepared"
        );
        Ok(Self {
            data_type,
            variant: encoded.variant,
            plan: *encoder.plan(),
            session_id: encoder.session_id().to_string(),
            frames,
        })
    }

    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Encoding picked for the payload.
    #[must_use]
    pub const fn variant(&self) -> EncodingVariant {
        self.variant
    }

    #[must_use]
    pub const fn plan(&self) -> &FountainPlan {
        &self.plan
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Every frame in display order.
    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Frame shown at display tick `tick`; the display loops forever.
    #[must_use]
    pub fn frame(&self, tick: usize) -> Option<&str> {
        if self.frames.is_empty() {
            return None;
        }
        Some(self.frames[tick % self.frames.len()].as_str())
    }
}

/// What one scan achieved.
#[derive(Clone, Debug, PartialEq)]
pub enum ScanOutcome {
    /// Still collecting; `new` is false for a repeated packet.
    Progress { progress: Progress, new: bool },
    /// Not a packet of the transfer being collected.
    Ignored,
    /// The dataset is complete.
    Complete { data_type: DataType, data: Value },
}

/// Scanner side of a QR transfer.
#[derive(Debug)]
pub struct QrReceiver {
    selector: CompressionSelector,
    receiver: FountainReceiver,
}

impl QrReceiver {
    #[must_use]
    pub fn new(selector: CompressionSelector, config: &FountainConfig) -> Self {
        Self {
            selector,
            receiver: FountainReceiver::new(config),
        }
    }

    /// Offer one scanned string.
    ///
    /// Unparseable text and packets that do not fit the transfer are scan
    /// noise. A failed or unverifiable reconstruction is an error; the
    /// receiver has already discarded the buffer and scanning can start over.
    pub fn scan(&mut self, text: &str) -> Result<ScanOutcome, TransferError> {
        let packet = match FountainPacket::parse(text) {
            Ok(packet) => packet,
            Err(err) => {
                debug!(error = %err, "scan is not a fountain packet");
                return Ok(ScanOutcome::Ignored);
            }
        };
        let outcome = match self.receiver.accept(packet) {
            Ok(outcome) => outcome,
            Err(err @ (DecodeError::ChecksumMismatch { .. } | DecodeError::Reconstruction(_))) => {
                return Err(err.into());
            }
            Err(err) => {
                debug!(error = %err, "dropping scanned packet");
                return Ok(ScanOutcome::Ignored);
            }
        };
        match outcome {
            ReceiveOutcome::Accepted(progress) => Ok(ScanOutcome::Progress { progress, new: true }),
            ReceiveOutcome::Duplicate(progress) => Ok(ScanOutcome::Progress { progress, new: false }),
            ReceiveOutcome::Ignored => Ok(ScanOutcome::Ignored),
            ReceiveOutcome::Complete(bytes) => self.open(&bytes),
        }
    }

    /// Progress of the transfer being collected.
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        self.receiver.progress()
    }

    /// Drop the partial transfer.
    pub fn reset(&mut self) {
        self.receiver.reset();
    }

    fn open(&self, bytes: &[u8]) -> Result<ScanOutcome, TransferError> {
        let value = self.selector.decode_bytes(bytes)?;
        let message: WireMessage = serde_json::from_value(value)
            .map_err(|err| TransferError::NotADataset(err.to_string()))?;
        match message.class() {
            MessageClass::Payload { data_type, data } => Ok(ScanOutcome::Complete {
                data_type,
                data: data.clone(),
            }),
            MessageClass::Control | MessageClass::Request => Err(TransferError::NotADataset(
                "control message".to_string(),
            )),
        }
    }
}

/// Convenience for tools: decode a whole list of scanned strings.
pub fn decode_scans<'a>(
    selector: CompressionSelector,
    config: &FountainConfig,
    scans: impl IntoIterator<Item = &'a str>,
) -> Result<Option<(DataType, Value)>, TransferError> {
    let mut receiver = QrReceiver::new(selector, config);
    for scan in scans {
        if let ScanOutcome::Complete { data_type, data } = receiver.scan(scan)? {
            return Ok(Some((data_type, data)));
        }
    }
    Ok(None)
}

/// Frames for `data` using the configured profile and wire format.
pub fn encode_frames(
    selector: &CompressionSelector,
    config: &FountainConfig,
    data_type: DataType,
    data: Value,
) -> Result<Vec<String>, TransferError> {
    QrTransfer::prepare(selector, config, data_type, data, config.profile)
        .map(|transfer| transfer.frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_compress::CompressionConfig;
    use scout_testkit::fixtures;
    use serde_json::json;

    fn selector() -> CompressionSelector {
        CompressionSelector::new(CompressionConfig::default())
    }

    #[test]
    fn frame_cycles() {
        let transfer = QrTransfer::prepare(
            &selector(),
            &FountainConfig::default(),
            DataType::Match,
            fixtures::json::match_schedule(3),
            TransferProfile::Fast,
        )
        .unwrap();
        let n = transfer.frames().len();
        assert!(n >= transfer.plan().estimated_blocks);
        assert_eq!(transfer.frame(0), transfer.frame(n));
        assert_eq!(transfer.frame(1), transfer.frame(n + 1));
    }

    #[test]
    fn small_payload_round_trip() {
        let data = fixtures::json::profiles();
        let frames = encode_frames(&selector(), &FountainConfig::default(), DataType::Scout, data.clone())
            .unwrap();
        let decoded = decode_scans(
            selector(),
            &FountainConfig::default(),
            frames.iter().map(String::as_str),
        )
        .unwrap();
        assert_eq!(decoded, Some((DataType::Scout, data)));
    }

    #[test]
    fn noise_is_ignored() {
        let mut receiver = QrReceiver::new(selector(), &FountainConfig::default());
        assert_eq!(receiver.scan("https://example.com").unwrap(), ScanOutcome::Ignored);
        assert_eq!(receiver.scan(r#"{"t":"other"}"#).unwrap(), ScanOutcome::Ignored);
        assert!(receiver.progress().is_none());
    }

    #[test]
    fn repeated_frame_reports_no_progress() {
        let transfer = QrTransfer::prepare(
            &selector(),
            &FountainConfig::default(),
            DataType::Scout,
            fixtures::json::noisy_payload(500),
            TransferProfile::Reliable,
        )
        .unwrap();
        assert!(transfer.plan().estimated_blocks > 1);
        let mut receiver = QrReceiver::new(selector(), &FountainConfig::default());
        let first = receiver.scan(transfer.frame(0).unwrap()).unwrap();
        let again = receiver.scan(transfer.frame(0).unwrap()).unwrap();
        assert!(matches!(first, ScanOutcome::Progress { new: true, .. }));
        assert!(matches!(again, ScanOutcome::Progress { new: false, .. }));
    }

    #[test]
    fn control_message_is_not_a_dataset() {
        let receiver = QrReceiver::new(selector(), &FountainConfig::default());
        let encoded = selector()
            .encode_serializable(&json!({"type": "push-declined"}))
            .unwrap();
        let err = receiver.open(&encoded.to_bytes()).unwrap_err();
        assert!(matches!(err, TransferError::NotADataset(_)));
    }
}
