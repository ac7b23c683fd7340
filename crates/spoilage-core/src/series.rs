//! Day-bucketed aggregation over the interval index.
//!
//! One [`DaySeries`] per [`SeriesKind`]: open, closed, spoiled. Two probe
//! strategies produce identical output — [`ProbeStrategy::Dense`] queries
//! every day, [`ProbeStrategy::Transitions`] queries only days where a
//! count can change (an interval starting or ending) and carries the last
//! computed count across the gaps. Equivalence of the two is a tested
//! contract, not an accident.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::index::IntervalIndex;
use crate::record::{IssueRecord, IssueState};

/// Dense, ordered mapping of day offset to issue count.
///
/// Built empty, populated by aggregation, optionally clamped, then handed
/// to a renderer and discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DaySeries {
    counts: BTreeMap<i64, usize>,
}

impl DaySeries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, day: i64, count: usize) {
        let _ = self.counts.insert(day, count);
    }

    #[must_use]
    pub fn get(&self, day: i64) -> Option<usize> {
        self.counts.get(&day).copied()
    }

    /// Earliest day in the series.
    #[must_use]
    pub fn first_day(&self) -> Option<i64> {
        self.counts.keys().next().copied()
    }

    /// Latest day in the series (its natural maximum).
    #[must_use]
    pub fn last_day(&self) -> Option<i64> {
        self.counts.keys().next_back().copied()
    }

    /// Largest count anywhere in the series; 0 when empty.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.counts.iter().map(|(day, count)| (*day, *count))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(i64, usize)> for DaySeries {
    fn from_iter<I: IntoIterator<Item = (i64, usize)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Which per-day count a series reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Issues open on the day.
    Open,
    /// Issues whose closed lifetime still spans the day.
    Closed,
    /// Issues unresolved after at least one full elapsed day.
    Spoiled,
}

impl SeriesKind {
    pub const ALL: [Self; 3] = [Self::Open, Self::Closed, Self::Spoiled];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Spoiled => "spoiled",
        }
    }

    /// Spoilage reports on the day *after* the probed activity: an issue
    /// is not spoiled on the day it was created, only once a full day has
    /// elapsed unresolved.
    const fn probe_lag(self) -> i64 {
        match self {
            Self::Open | Self::Closed => 0,
            Self::Spoiled => 1,
        }
    }

    /// Whether a record overlapping the probed day counts for this kind.
    ///
    /// The still-active kinds skip records whose whole lifetime collapsed
    /// into the widened single day; the closed count keeps them.
    fn admits(self, record: &IssueRecord) -> bool {
        match self {
            Self::Open => record.state == IssueState::Open && !record.is_collapsed(),
            Self::Closed => record.state == IssueState::Closed,
            Self::Spoiled => !record.is_collapsed(),
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the aggregator walks the day axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeStrategy {
    /// Query the index on every day in range.
    #[default]
    Dense,
    /// Query only days adjacent to an interval start or end; fill the
    /// gaps by carrying the previous count forward.
    Transitions,
}

/// Produce the per-day series for `kind` over the index's full day range.
///
/// The range is `[min_day, max_day]` inclusive, except that a trailing
/// day with zero overlapping intervals is dropped so the series does not
/// end on an artificial all-zero day. Both strategies yield identical
/// output for the same input.
#[must_use]
pub fn aggregate(index: &IntervalIndex, kind: SeriesKind, strategy: ProbeStrategy) -> DaySeries {
    let lo = index.min_day();
    let mut hi = index.max_day();
    if hi > lo && index.overlap(hi).next().is_none() {
        hi -= 1;
    }

    let series = match strategy {
        ProbeStrategy::Dense => dense(index, kind, lo, hi),
        ProbeStrategy::Transitions => transitions(index, kind, lo, hi),
    };
    debug!(
        kind = kind.as_str(),
        days = series.len(),
        ?strategy,
        "aggregated day series"
    );
    series
}

fn count_at(index: &IntervalIndex, kind: SeriesKind, lo: i64, day: i64) -> usize {
    let probe = day - kind.probe_lag();
    if probe < lo {
        return 0;
    }
    index.overlap(probe).filter(|r| kind.admits(r)).count()
}

fn dense(index: &IntervalIndex, kind: SeriesKind, lo: i64, hi: i64) -> DaySeries {
    (lo..=hi).map(|day| (day, count_at(index, kind, lo, day))).collect()
}

fn transitions(index: &IntervalIndex, kind: SeriesKind, lo: i64, hi: i64) -> DaySeries {
    let lag = kind.probe_lag();
    let mut probes = BTreeSet::new();
    let _ = probes.insert(lo);
    for record in index.records() {
        for day in [record.created_day + lag, record.interval_end() + lag] {
            if (lo..=hi).contains(&day) {
                let _ = probes.insert(day);
            }
        }
    }
    debug!(
        kind = kind.as_str(),
        probes = probes.len(),
        span = hi - lo + 1,
        "transition probe set"
    );

    let mut series = DaySeries::new();
    let mut carry = 0;
    for day in lo..=hi {
        if probes.contains(&day) {
            carry = count_at(index, kind, lo, day);
        }
        series.insert(day, carry);
    }
    series
}
