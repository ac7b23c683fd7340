//! Subcommand handlers: one `Args` struct and one `run_*` entry point per
//! command.

pub mod extract;
pub mod graph;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result, bail};
use chrono::NaiveDateTime;
use spoilage_core::RawBatch;

/// The single "now" shared by every still-open record in a run.
pub(crate) fn processing_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Read and parse a raw issues export. Only `.json` documents are
/// accepted.
pub(crate) fn read_batch(path: &Path) -> Result<RawBatch> {
    if path.extension().and_then(OsStr::to_str) != Some("json") {
        bail!(
            "invalid input file type: {} (input must be a .json document)",
            path.display()
        );
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let batch = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid issues JSON document", path.display()))?;
    Ok(batch)
}
