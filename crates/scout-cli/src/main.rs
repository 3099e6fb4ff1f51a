//! `scout` field tooling entrypoint.
//!
//! Offline helpers around the sync pipeline, working on files:
//! - `scout plan` - fountain packet budget for a payload size
//! - `scout bench` - compressed size of a dataset under every encoding
//! - `scout encode` / `scout decode` - dataset to QR strings and back
//! - `scout merge` - non-interactive merge into a JSON entry store

#![forbid(unsafe_code)]

mod bench;
mod merge;
mod plan;
mod qr;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scout_sync::SyncConfig;

/// Scout data sync tooling.
#[derive(Parser)]
#[command(name = "scout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log level or filter directive (overrides the config file).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a fountain transfer.
    ///
    /// Prints block size, block count and packet budget as JSON.
    Plan(plan::PlanArgs),

    /// Compare encodings for a JSON dataset.
    Bench(bench::BenchArgs),

    /// Encode a JSON dataset as QR strings, one per line.
    Encode(qr::EncodeArgs),

    /// Rebuild a dataset from scanned QR strings, one per line.
    Decode(qr::DecodeArgs),

    /// Merge an entry export into a JSON store file.
    Merge(merge::MergeArgs),
}

fn load_config(cli: &Cli) -> anyhow::Result<SyncConfig> {
    let mut config = match &cli.config {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SyncConfig::default(),
    };
    if cli.json_logs {
        config.telemetry.json_logs = true;
    }
    if let Some(level) = &cli.log_level {
        config.telemetry.log_level.clone_from(level);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    // Logs go to stderr so stdout stays clean for data.
    scout_telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Plan(args) => plan::run(&args),
        Commands::Bench(args) => bench::run(&args, &config),
        Commands::Encode(args) => qr::encode(&args, &config),
        Commands::Decode(args) => qr::decode(&args, &config),
        Commands::Merge(args) => merge::run(&args, &config),
    }
}
