//! `spoilage graph` — run the full pipeline and render the per-day
//! open/closed/spoilage graphs.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use spoilage_core::{
    IntervalIndex, ProbeStrategy, SeriesKind, Window, aggregate, normalize,
};
use tracing::info;

use crate::chart::{self, GraphKind};

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Raw repository issues JSON file to graph.
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// First day of the window to analyze (inclusive).
    #[arg(short = 'l', long, value_name = "DAY")]
    pub lower_window_bound: Option<i64>,

    /// Last day of the window to analyze (inclusive).
    #[arg(short = 'u', long, value_name = "DAY")]
    pub upper_window_bound: Option<i64>,

    /// Output graph of open issues.
    #[arg(short = 'o', long, value_name = "PATH", default_value = "open.png")]
    pub open_graph: PathBuf,

    /// Output graph of closed issues.
    #[arg(short = 'c', long, value_name = "PATH", default_value = "closed.png")]
    pub closed_graph: PathBuf,

    /// Output graph of spoiled issues.
    #[arg(short = 'd', long, value_name = "PATH", default_value = "spoilage.png")]
    pub spoilage_graph: PathBuf,

    /// Joint output graph of open and closed issues.
    #[arg(short = 'x', long, value_name = "PATH", default_value = "joint.png")]
    pub joint_graph: PathBuf,
}

pub fn run_graph(args: &GraphArgs) -> Result<()> {
    let window = Window::new(args.lower_window_bound, args.upper_window_bound);
    // An inverted window fails the run before the input file is opened.
    window.validate()?;

    let batch = super::read_batch(&args.input)?;
    let records = normalize(batch, super::processing_now())?;
    let index = IntervalIndex::build(records)?;

    let series_for = |kind| window.clamp(&aggregate(&index, kind, ProbeStrategy::Transitions));
    let open = series_for(SeriesKind::Open)?;
    let closed = series_for(SeriesKind::Closed)?;
    let spoiled = series_for(SeriesKind::Spoiled)?;

    chart::render(&open, &args.open_graph, GraphKind::Open)?;
    chart::render(&closed, &args.closed_graph, GraphKind::Closed)?;
    chart::render(&spoiled, &args.spoilage_graph, GraphKind::Spoiled)?;
    chart::render_joint(&open, &closed, &args.joint_graph)?;

    info!(
        issues = index.len(),
        days = open.len(),
        open = %args.open_graph.display(),
        closed = %args.closed_graph.display(),
        spoilage = %args.spoilage_graph.display(),
        joint = %args.joint_graph.display(),
        "rendered per-day issue graphs"
    );
    Ok(())
}
