//! `scout plan`.

use anyhow::Result;
use clap::Args;
use scout_fountain::{FountainPlan, TransferProfile};

#[derive(Args)]
pub struct PlanArgs {
    /// Compressed payload size in bytes.
    #[arg(long)]
    bytes: usize,

    /// Transfer profile: fast or reliable.
    #[arg(long, default_value = "fast")]
    profile: TransferProfile,
}

pub fn run(args: &PlanArgs) -> Result<()> {
    let plan = FountainPlan::new(args.bytes, args.profile);
    tracing::debug!(
        bytes = args.bytes,
        profile = %args.profile,
        target = plan.target_packets,
        "planned transfer"
    );
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
