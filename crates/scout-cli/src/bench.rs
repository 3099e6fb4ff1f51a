//! `scout bench`: how small does a dataset get, and how many frames does it
//! take.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use scout_compress::{CompressionReport, CompressionSelector, EncodingVariant};
use scout_fountain::{FountainPlan, TransferProfile};
use scout_sync::SyncConfig;
use serde::Serialize;
use serde_json::Value;

#[derive(Args)]
pub struct BenchArgs {
    /// JSON dataset to measure.
    file: PathBuf,

    /// Output format: json (machine-readable) or human.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Human,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BenchOutput {
    raw_bytes: usize,
    /// Whether the selector would compress this payload at all.
    compressed: bool,
    report: CompressionReport,
    /// Frame budget for the winning encoding, per profile.
    plans: Vec<FountainPlan>,
}

pub fn run(args: &BenchArgs, config: &SyncConfig) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not JSON", args.file.display()))?;

    let selector = CompressionSelector::new(config.compression.clone());
    let report = selector.benchmark(&value)?;
    let compressed = selector.should_use_compression(report.raw_bytes);
    let shipped = if compressed {
        report.best_bytes()
    } else {
        report.raw_bytes
    };
    // One tag byte frames the body.
    let plans = [TransferProfile::Fast, TransferProfile::Reliable]
        .into_iter()
        .map(|profile| FountainPlan::new(shipped + 1, profile))
        .collect();
    let output = BenchOutput {
        raw_bytes: report.raw_bytes,
        compressed,
        report,
        plans,
    };

    tracing::info!(
        raw_bytes = output.raw_bytes,
        best = %output.report.best,
        best_bytes = output.report.best_bytes(),
        "benchmark complete"
    );
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Human => print_human(&output),
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn percent(bytes: usize, of: usize) -> f64 {
    if of == 0 {
        return 0.0;
    }
    bytes as f64 * 100.0 / of as f64
}

fn print_human(output: &BenchOutput) {
    let raw = output.raw_bytes;
    println!("raw JSON: {raw} bytes");
    if !output.compressed {
        println!("below the compression threshold; sent as raw JSON");
    }
    for size in &output.report.variants {
        let marker = if size.variant == output.report.best { " *" } else { "" };
        println!(
            "{:<22} {:>8} bytes  {:>5.1}%{marker}",
            size.variant.name(),
            size.bytes,
            percent(size.bytes, raw)
        );
    }
    if let Some(gzip) = output.report.size_of(EncodingVariant::Gzip) {
        let saved = gzip.saturating_sub(output.report.best_bytes());
        println!("best saves {saved} bytes over plain gzip");
    }
    for plan in &output.plans {
        println!(
            "{:<9} {} blocks of {} bytes, {} frames",
            plan.profile.as_str(),
            plan.estimated_blocks,
            plan.block_size,
            plan.target_packets
        );
    }
}
