//! `scout encode` and `scout decode`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use scout_compress::CompressionSelector;
use scout_core::DataType;
use scout_fountain::{TransferProfile, WireFormat};
use scout_sync::{QrReceiver, QrTransfer, ScanOutcome, SyncConfig};
use serde_json::Value;

#[derive(Args)]
pub struct EncodeArgs {
    /// JSON dataset to encode.
    file: PathBuf,

    /// Data type carried: scouting, pit-scouting, match, scout or combined.
    #[arg(long, default_value = "scouting")]
    data_type: DataType,

    /// Transfer profile (defaults to the configured one).
    #[arg(long)]
    profile: Option<TransferProfile>,

    /// Emit the verbose legacy packet shape.
    #[arg(long)]
    legacy: bool,

    /// Write frames here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// File with one scanned QR string per line.
    packets: PathBuf,

    /// Write the dataset here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn read_json(path: &Path) -> Result<Value> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not JSON", path.display()))
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

pub fn encode(args: &EncodeArgs, config: &SyncConfig) -> Result<()> {
    let data = read_json(&args.file)?;
    config.telemetry.redactor().log("outgoing", &data);
    let mut fountain = config.fountain.clone();
    if args.legacy {
        fountain.wire_format = WireFormat::Legacy;
    }
    let selector = CompressionSelector::new(config.compression.clone());
    let profile = args.profile.unwrap_or(fountain.profile);
    let transfer = QrTransfer::prepare(&selector, &fountain, args.data_type, data, profile)?;

    let mut text = String::new();
    for frame in transfer.frames() {
        writeln!(text, "{frame}")?;
    }
    tracing::info!(
        session_id = transfer.session_id(),
        variant = %transfer.variant(),
        frames = transfer.frames().len(),
        blocks = transfer.plan().estimated_blocks,
        "encoded"
    );
    emit(args.output.as_deref(), &text)
}

pub fn decode(args: &DecodeArgs, config: &SyncConfig) -> Result<()> {
    let scans = std::fs::read_to_string(&args.packets)
        .with_context(|| format!("reading {}", args.packets.display()))?;
    let selector = CompressionSelector::new(config.compression.clone());
    let mut receiver = QrReceiver::new(selector, &config.fountain);

    let mut ignored = 0_usize;
    for line in scans.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match receiver.scan(line)? {
            ScanOutcome::Complete { data_type, data } => {
                tracing::info!(%data_type, ignored, "dataset reconstructed");
                config.telemetry.redactor().log("scanned", &data);
                let mut text = serde_json::to_string_pretty(&data)?;
                text.push('\n');
                return emit(args.output.as_deref(), &text);
            }
            ScanOutcome::Ignored => ignored += 1,
            ScanOutcome::Progress { .. } => {}
        }
    }
    match receiver.progress() {
        Some(progress) => bail!(
            "incomplete transfer: {} of {} blocks received",
            progress.received,
            progress.needed
        ),
        None => bail!("no fountain packets found in {}", args.packets.display()),
    }
}
