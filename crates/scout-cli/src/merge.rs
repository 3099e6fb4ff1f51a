//! `scout merge`: fold an entry export into a JSON store file.
//!
//! The store file holds a regular `{entries, version, exportedAt}` export. It
//! is created when missing and rewritten only after every decision succeeds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use scout_core::{EntriesEnvelope, MemoryEntryStore};
use scout_merge::{FixedResolver, MergeSession, Resolution, resolve_with};
use scout_sync::SyncConfig;

#[derive(Args)]
pub struct MergeArgs {
    /// JSON store file; created if it does not exist.
    #[arg(long)]
    store: PathBuf,

    /// Entry export to merge in.
    incoming: PathBuf,

    /// What to do with conflicting entries.
    #[arg(long, value_enum, default_value = "skip")]
    strategy: Strategy,

    /// Scout name recorded as the source of the incoming entries.
    #[arg(long, default_value = "import")]
    source: String,

    /// Report what would happen without touching the store file.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Strategy {
    Skip,
    Replace,
}

impl From<Strategy> for Resolution {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Skip => Self::Skip,
            Strategy::Replace => Self::Replace,
        }
    }
}

fn read_export(path: &Path) -> Result<EntriesEnvelope> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a scouting entry export", path.display()))
}

pub fn run(args: &MergeArgs, config: &SyncConfig) -> Result<()> {
    let existing = if args.store.exists() {
        read_export(&args.store)?.entries
    } else {
        tracing::info!(store = %args.store.display(), "store file missing, starting empty");
        Vec::new()
    };
    let incoming = read_export(&args.incoming)?.entries;

    let store = MemoryEntryStore::with_entries(existing);
    let resolver = FixedResolver(args.strategy.into());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("starting runtime")?;
    let summary = runtime.block_on(async {
        let session =
            MergeSession::begin(&store, incoming, &args.source, &config.merge).await?;
        resolve_with(session, &resolver).await
    })?;

    if args.dry_run {
        tracing::info!("dry run, store file left unchanged");
    } else {
        let mut entries = store.snapshot();
        entries.sort_by_key(|e| (e.match_number, e.team_number, e.alliance_color.as_str()));
        let text = serde_json::to_string_pretty(&EntriesEnvelope::new(entries))?;
        std::fs::write(&args.store, text)
            .with_context(|| format!("writing {}", args.store.display()))?;
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
