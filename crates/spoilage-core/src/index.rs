//! Build-once, query-many interval index over issue lifetimes.
//!
//! One half-open day interval per record, `[created_day, interval_end)`.
//! Zero-width intervals (closed the same day they were created) are
//! widened by one day up front — an explicit pre-check, never an
//! insertion failure signal — and flagged via `end_day_offset` so the
//! aggregation predicates can tell a widened record apart from one that
//! genuinely spans its day. Duplicate day ranges coexist; entries are
//! keyed by owning record, not by bounds.
//!
//! The index is never mutated after construction, so concurrent
//! read-only queries need no locking.

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{IssueRecord, IssueState};

/// Interval index over a normalized issue batch.
#[derive(Debug, Clone)]
pub struct IntervalIndex {
    /// Records sorted by `created_day`, widening flags resolved.
    records: Vec<IssueRecord>,
    min_day: i64,
    max_day: i64,
}

impl IntervalIndex {
    /// Build the index, resolving widening flags and global bounds.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyBatch`] when `records` is empty; bounds would be
    /// meaningless.
    pub fn build(mut records: Vec<IssueRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let mut widened = 0_usize;
        for record in &mut records {
            // Width is checked before insertion; only a genuinely
            // zero-width closed lifetime gets the one-day widening. A
            // still-open record created today is ongoing, not collapsed,
            // and already spans through the current day.
            let zero_width =
                record.state == IssueState::Closed && record.created_day == record.closed_day;
            record.end_day_offset = u8::from(zero_width);
            widened += usize::from(zero_width);
        }

        records.sort_by_key(|r| (r.created_day, r.closed_day, r.number));

        let min_day = records.iter().map(|r| r.created_day).min().unwrap_or(0);
        let max_day = records.iter().map(IssueRecord::interval_end).max().unwrap_or(0);

        debug!(
            intervals = records.len(),
            widened, min_day, max_day, "built interval index"
        );
        Ok(Self {
            records,
            min_day,
            max_day,
        })
    }

    /// All records whose interval spans `day`.
    pub fn overlap(&self, day: i64) -> impl Iterator<Item = &IssueRecord> {
        let live_start = self.records.partition_point(|r| r.created_day <= day);
        self.records[..live_start]
            .iter()
            .filter(move |r| r.interval_end() > day)
    }

    /// Smallest `created_day` across all intervals (always 0 for a batch
    /// normalized against its own epoch).
    #[must_use]
    pub const fn min_day(&self) -> i64 {
        self.min_day
    }

    /// Largest interval end across all intervals. Half-open, so no
    /// interval actually spans this day.
    #[must_use]
    pub const fn max_day(&self) -> i64 {
        self.max_day
    }

    /// The indexed records, sorted by creation day.
    #[must_use]
    pub fn records(&self) -> &[IssueRecord] {
        &self.records
    }

    /// Number of indexed intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the index holds no intervals (never the case for an
    /// index obtained from [`IntervalIndex::build`]).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
