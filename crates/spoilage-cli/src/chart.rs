//! Line-chart rendering for aggregated day series.
//!
//! Thin wrapper over `plotters`: the core hands over a finished series
//! and a graph kind; everything here is presentation.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context as _, Result, bail};
use plotters::prelude::*;
use spoilage_core::DaySeries;

/// Which graph a series is rendered as. Unrecognized labels are
/// rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Open,
    Closed,
    Spoiled,
}

impl GraphKind {
    const fn title_word(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::Spoiled => "Spoiled",
        }
    }

    const fn color(self) -> RGBColor {
        match self {
            Self::Open => RGBColor(0, 114, 178),
            Self::Closed => RGBColor(0, 158, 115),
            Self::Spoiled => RGBColor(213, 94, 0),
        }
    }
}

impl FromStr for GraphKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" | "Open" => Ok(Self::Open),
            "closed" | "Closed" => Ok(Self::Closed),
            "spoiled" | "Spoiled" => Ok(Self::Spoiled),
            other => bail!("unrecognized graph type '{other}'"),
        }
    }
}

/// Render one series as a PNG line chart.
pub fn render(series: &DaySeries, path: &Path, kind: GraphKind) -> Result<()> {
    let title = format!("Number of {} Issues Per Day", kind.title_word());
    draw(path, &title, &[(series, kind)])
}

/// Render the open and closed series together on one chart with a legend.
pub fn render_joint(open: &DaySeries, closed: &DaySeries, path: &Path) -> Result<()> {
    draw(
        path,
        "Number of Open and Closed Issues Per Day",
        &[(open, GraphKind::Open), (closed, GraphKind::Closed)],
    )
}

fn points(series: &DaySeries) -> Vec<(i64, i64)> {
    series
        .iter()
        .map(|(day, count)| (day, i64::try_from(count).unwrap_or(i64::MAX)))
        .collect()
}

fn draw(path: &Path, title: &str, layers: &[(&DaySeries, GraphKind)]) -> Result<()> {
    let x_min = layers.iter().filter_map(|(s, _)| s.first_day()).min().unwrap_or(0);
    let x_max = layers.iter().filter_map(|(s, _)| s.last_day()).max().unwrap_or(0);
    let y_max = layers
        .iter()
        .map(|(s, _)| i64::try_from(s.max_count()).unwrap_or(i64::MAX))
        .max()
        .unwrap_or(1)
        .max(1);

    let root = BitMapBackend::new(path, (1024, 640)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, ("sans-serif", 28))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_min..x_max + 1, 0..y_max + 1)?;

    chart
        .configure_mesh()
        .x_desc("Day")
        .y_desc("Number of Issues")
        .draw()?;

    for (series, kind) in layers {
        let color = kind.color();
        chart
            .draw_series(LineSeries::new(points(series), &color))?
            .label(kind.title_word())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if layers.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()
        .with_context(|| format!("failed to write chart to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_parse() {
        assert_eq!("open".parse::<GraphKind>().expect("parses"), GraphKind::Open);
        assert_eq!(
            "Closed".parse::<GraphKind>().expect("parses"),
            GraphKind::Closed
        );
        assert_eq!(
            "spoiled".parse::<GraphKind>().expect("parses"),
            GraphKind::Spoiled
        );
    }

    #[test]
    fn unrecognized_label_is_rejected() {
        let err = "stale".parse::<GraphKind>().expect_err("unknown label");
        assert!(err.to_string().contains("stale"));
    }

    #[test]
    fn titles_follow_the_kind() {
        assert_eq!(GraphKind::Spoiled.title_word(), "Spoiled");
    }
}
