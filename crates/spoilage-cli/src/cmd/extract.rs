//! `spoilage extract` — normalize a raw issues export and save the
//! canonical per-issue records as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use spoilage_core::normalize;
use tracing::info;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Raw repository issues JSON file to analyze.
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Where to save the normalized per-issue analysis.
    #[arg(
        short = 's',
        long,
        value_name = "PATH",
        default_value = "issue_spoilage.json"
    )]
    pub save_json: PathBuf,
}

pub fn run_extract(args: &ExtractArgs) -> Result<()> {
    let batch = super::read_batch(&args.input)?;
    let records = normalize(batch, super::processing_now())?;

    let json = serde_json::to_string(&records).context("failed to serialize records")?;
    fs::write(&args.save_json, json)
        .with_context(|| format!("failed to write {}", args.save_json.display()))?;

    info!(
        records = records.len(),
        output = %args.save_json.display(),
        "saved normalized issue records"
    );
    Ok(())
}
