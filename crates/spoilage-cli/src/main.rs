#![forbid(unsafe_code)]

//! `spoilage`: per-day open/closed/spoilage analytics for issue-tracker
//! snapshots.

mod chart;
mod cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Per-day open/closed/spoilage analytics for issue-tracker snapshots",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Normalize a raw issues export into canonical records",
        after_help = "EXAMPLES:\n    # Save the per-issue analysis next to the export\n    spoilage extract -i issues.json -s issue_spoilage.json"
    )]
    Extract(cmd::extract::ExtractArgs),

    #[command(
        about = "Render per-day open/closed/spoilage graphs",
        after_help = "EXAMPLES:\n    # Graph a whole repository history\n    spoilage graph -i issues.json\n\n    # Restrict to days 30 through 120 (bounds are inclusive)\n    spoilage graph -i issues.json -l 30 -u 120"
    )]
    Graph(cmd::graph::GraphArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract(args) => cmd::extract::run_extract(&args),
        Commands::Graph(args) => cmd::graph::run_graph(&args),
    }
}
