//! Record normalization: raw issue-tracker JSON into canonical
//! [`IssueRecord`]s with day offsets against a shared batch epoch.
//!
//! Two raw shapes are accepted, matching what issue exporters actually
//! emit: a plain array of per-record objects, and a columnar mapping of
//! field name to `{stringified index: value}` (the orientation produced
//! by dataframe `to_json` dumps).
//!
//! Day offsets are computed against a single epoch: the batch-wide
//! minimum `created_at`, with any timezone offset dropped so that plain
//! day-difference arithmetic is safe. "Now" is computed once per batch by
//! the caller and threaded in, so every still-open record shares one
//! synthetic closure instant.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// The two lifecycle states an ingested issue can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw issue entry as it appears in the input document.
///
/// Every field is optional at this stage; [`normalize`] validates and
/// reports what is missing per record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub number: Option<u64>,
    pub created_at: Option<String>,
    pub closed_at: Option<String>,
    pub state: Option<String>,
}

/// Columnar raw shape: each field maps stringified row index to value.
#[derive(Debug, Clone, Deserialize)]
pub struct RawColumns {
    number: BTreeMap<String, u64>,
    #[serde(default)]
    created_at: BTreeMap<String, Option<String>>,
    #[serde(default)]
    closed_at: BTreeMap<String, Option<String>>,
    #[serde(default)]
    state: BTreeMap<String, Option<String>>,
}

/// A raw issue batch in either accepted orientation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawBatch {
    Rows(Vec<RawIssue>),
    Columns(RawColumns),
}

impl RawBatch {
    /// Flatten either orientation into row-oriented raw entries.
    ///
    /// The `number` column drives row iteration in the columnar case; a
    /// gap in it is a batch-shape failure because no record number is
    /// available to report.
    pub fn into_rows(self) -> Result<Vec<RawIssue>> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Columns(columns) => {
                let mut rows = Vec::with_capacity(columns.number.len());
                for row in 0..columns.number.len() {
                    let key = row.to_string();
                    let number = columns.number.get(&key).copied().ok_or_else(|| {
                        Error::MalformedBatch {
                            reason: format!("column 'number' has no entry for row {row}"),
                        }
                    })?;
                    rows.push(RawIssue {
                        number: Some(number),
                        created_at: columns.created_at.get(&key).cloned().flatten(),
                        closed_at: columns.closed_at.get(&key).cloned().flatten(),
                        state: columns.state.get(&key).cloned().flatten(),
                    });
                }
                Ok(rows)
            }
        }
    }
}

/// Canonical, immutable issue record with day offsets against the batch
/// epoch.
///
/// `end_day_offset` starts at 0 and is resolved during interval-index
/// construction: 1 marks a closed record whose zero-width interval had to
/// be widened by one day to stay representable.
///
/// Serialized field names match the historical preprocessor output
/// (`issue_number`, `created_at_day`, `closed_at_day`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    #[serde(rename = "issue_number")]
    pub number: u64,
    pub created_at: NaiveDateTime,
    #[serde(rename = "created_at_day")]
    pub created_day: i64,
    pub closed_at: NaiveDateTime,
    #[serde(rename = "closed_at_day")]
    pub closed_day: i64,
    pub state: IssueState,
    #[serde(skip)]
    pub end_day_offset: u8,
}

impl IssueRecord {
    /// First day offset past this record's interval (half-open end).
    ///
    /// A closed record spans `[created_day, closed_day + end_day_offset)`.
    /// A still-open record is alive through the current processing day,
    /// so its interval runs to `closed_day + 1` (`closed_day` being the
    /// day offset of "now").
    #[must_use]
    pub fn interval_end(&self) -> i64 {
        match self.state {
            IssueState::Open => self.closed_day + 1,
            IssueState::Closed => self.closed_day + i64::from(self.end_day_offset),
        }
    }

    /// True when the record's entire lifetime collapsed into the widened
    /// single day (created and closed within one day).
    ///
    /// Such records still count as closed but must not inflate the
    /// "still active" counts on their creation day.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.end_day_offset == 1 && self.created_day == self.interval_end() - 1
    }

    /// True when this record's interval spans `day`.
    #[must_use]
    pub fn is_live_on(&self, day: i64) -> bool {
        self.created_day <= day && day < self.interval_end()
    }
}

/// Normalize a raw batch into canonical records.
///
/// `now` is the single synthetic closure instant shared by every
/// still-open record; callers compute it once per run.
///
/// # Errors
///
/// [`Error::EmptyBatch`] when the batch has zero records,
/// [`Error::MalformedRecord`] / [`Error::MalformedBatch`] for missing
/// fields, unparsable timestamps, unrecognized states, or a closure
/// instant earlier than creation.
pub fn normalize(batch: RawBatch, now: NaiveDateTime) -> Result<Vec<IssueRecord>> {
    let rows = batch.into_rows()?;
    if rows.is_empty() {
        return Err(Error::EmptyBatch);
    }

    struct Parsed {
        number: u64,
        created_at: NaiveDateTime,
        closed_at: Option<NaiveDateTime>,
        state: IssueState,
    }

    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let number = row.number.ok_or_else(|| Error::MalformedBatch {
            reason: "record is missing the 'number' field".to_string(),
        })?;
        let created_raw = row.created_at.ok_or_else(|| malformed(number, "missing 'created_at'"))?;
        let created_at = parse_timestamp(&created_raw)
            .ok_or_else(|| malformed(number, &format!("unparsable timestamp '{created_raw}'")))?;
        let closed_at = match row.closed_at {
            Some(raw) => Some(
                parse_timestamp(&raw)
                    .ok_or_else(|| malformed(number, &format!("unparsable timestamp '{raw}'")))?,
            ),
            None => None,
        };
        let state_raw = row.state.ok_or_else(|| malformed(number, "missing 'state'"))?;
        let state = IssueState::parse(&state_raw)
            .ok_or_else(|| malformed(number, &format!("unrecognized state '{state_raw}'")))?;

        parsed.push(Parsed {
            number,
            created_at,
            closed_at,
            state,
        });
    }

    // Day 0 is the batch-wide earliest creation instant, never per-record.
    let Some(epoch) = parsed.iter().map(|p| p.created_at).min() else {
        return Err(Error::EmptyBatch);
    };
    let now_day = day_offset(now, epoch);

    let mut records = Vec::with_capacity(parsed.len());
    for p in parsed {
        // An open state wins over any stray closed timestamp.
        let closed_at = match (p.state, p.closed_at) {
            (IssueState::Open, _) | (IssueState::Closed, None) => now,
            (IssueState::Closed, Some(ts)) => ts,
        };
        let created_day = day_offset(p.created_at, epoch);
        let closed_day = match p.state {
            IssueState::Open => now_day,
            IssueState::Closed => day_offset(closed_at, epoch),
        };
        if closed_day < created_day {
            return Err(malformed(
                p.number,
                &format!("closed on day {closed_day}, before creation on day {created_day}"),
            ));
        }

        records.push(IssueRecord {
            number: p.number,
            created_at: p.created_at,
            created_day,
            closed_at,
            closed_day,
            state: p.state,
            end_day_offset: 0,
        });
    }

    debug!(
        records = records.len(),
        now_day, "normalized issue batch against shared epoch"
    );
    Ok(records)
}

fn malformed(number: u64, reason: &str) -> Error {
    Error::MalformedRecord {
        number,
        reason: reason.to_string(),
    }
}

/// Whole days elapsed from `epoch` to `ts`, truncated toward zero.
fn day_offset(ts: NaiveDateTime, epoch: NaiveDateTime) -> i64 {
    (ts - epoch).num_days()
}

/// Parse an ISO-8601 timestamp, dropping any timezone offset so the
/// wall-clock reading survives as-is. Plain naive timestamps are also
/// accepted, with either the `T` or a space separator.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_local())
        .ok()
        .or_else(|| raw.parse().ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid date")
            .and_hms_opt(h, 0, 0)
            .expect("valid time")
    }

    fn batch(json: &str) -> RawBatch {
        serde_json::from_str(json).expect("valid raw batch json")
    }

    fn now() -> NaiveDateTime {
        at(2021, 1, 10, 12)
    }

    #[test]
    fn row_oriented_batch_normalizes() {
        let raw = batch(
            r#"[
                {"number": 1, "created_at": "2021-01-01T08:00:00Z", "closed_at": "2021-01-03T09:00:00Z", "state": "closed"},
                {"number": 2, "created_at": "2021-01-02T08:00:00Z", "closed_at": null, "state": "open"}
            ]"#,
        );
        let records = normalize(raw, now()).expect("normalizes");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].created_day, 0);
        assert_eq!(records[0].closed_day, 2);
        assert_eq!(records[1].created_day, 1);
        // Open record closes at "now": day 9 from the 08:00 epoch.
        assert_eq!(records[1].closed_day, 9);
        assert_eq!(records[1].closed_at, now());
    }

    #[test]
    fn columnar_batch_normalizes() {
        let raw = batch(
            r#"{
                "number": {"0": 10, "1": 11},
                "created_at": {"0": "2021-01-01T00:00:00Z", "1": "2021-01-04T00:00:00Z"},
                "closed_at": {"0": "2021-01-02T00:00:00Z", "1": null},
                "state": {"0": "closed", "1": "open"}
            }"#,
        );
        let records = normalize(raw, now()).expect("normalizes");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number, 10);
        assert_eq!(records[0].closed_day, 1);
        assert_eq!(records[1].number, 11);
        assert_eq!(records[1].state, IssueState::Open);
    }

    #[test]
    fn columnar_gap_is_a_batch_error() {
        let raw = batch(
            r#"{
                "number": {"0": 10, "2": 12},
                "created_at": {"0": "2021-01-01T00:00:00Z"},
                "closed_at": {},
                "state": {"0": "closed"}
            }"#,
        );
        let err = normalize(raw, now()).expect_err("gap in number column");
        assert!(matches!(err, Error::MalformedBatch { .. }));
    }

    #[test]
    fn epoch_is_batch_minimum_created_at() {
        let raw = batch(
            r#"[
                {"number": 1, "created_at": "2021-01-05T00:00:00Z", "closed_at": null, "state": "open"},
                {"number": 2, "created_at": "2021-01-02T00:00:00Z", "closed_at": null, "state": "open"}
            ]"#,
        );
        let records = normalize(raw, now()).expect("normalizes");
        assert_eq!(records[0].created_day, 3);
        assert_eq!(records[1].created_day, 0);
        assert!(records.iter().all(|r| r.created_day >= 0));
    }

    #[test]
    fn timezone_offset_is_dropped_not_converted() {
        // 22:00-05:00 is 03:00Z the next day; the wall-clock reading must
        // survive so the day difference stays zero.
        let raw = batch(
            r#"[
                {"number": 1, "created_at": "2021-01-01T00:00:00Z", "closed_at": "2021-01-01T22:00:00-05:00", "state": "closed"}
            ]"#,
        );
        let records = normalize(raw, now()).expect("normalizes");
        assert_eq!(records[0].closed_day, 0);
    }

    #[test]
    fn space_separated_timestamps_are_accepted() {
        assert_eq!(
            parse_timestamp("2020-01-01 01:00:00"),
            parse_timestamp("2020-01-01T01:00:00")
        );
        let raw = batch(
            r#"[
                {"number": 1, "created_at": "2021-01-01 09:00:00", "closed_at": "2021-01-03 12:00:00", "state": "closed"}
            ]"#,
        );
        let records = normalize(raw, now()).expect("normalizes");
        assert_eq!(records[0].created_day, 0);
        assert_eq!(records[0].closed_day, 2);
    }

    #[test]
    fn open_state_overrides_stray_closed_timestamp() {
        let raw = batch(
            r#"[
                {"number": 7, "created_at": "2021-01-01T00:00:00Z", "closed_at": "2021-01-02T00:00:00Z", "state": "open"}
            ]"#,
        );
        let records = normalize(raw, now()).expect("normalizes");
        assert_eq!(records[0].closed_day, 9);
        assert_eq!(records[0].closed_at, now());
    }

    #[test]
    fn closed_without_timestamp_uses_now() {
        let raw = batch(
            r#"[
                {"number": 3, "created_at": "2021-01-01T00:00:00Z", "closed_at": null, "state": "closed"}
            ]"#,
        );
        let records = normalize(raw, now()).expect("normalizes");
        assert_eq!(records[0].closed_at, now());
        assert_eq!(records[0].closed_day, 9);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = normalize(batch("[]"), now()).expect_err("empty batch");
        assert!(matches!(err, Error::EmptyBatch));
    }

    #[test]
    fn unknown_state_names_the_record() {
        let raw = batch(
            r#"[
                {"number": 42, "created_at": "2021-01-01T00:00:00Z", "closed_at": null, "state": "reopened"}
            ]"#,
        );
        let err = normalize(raw, now()).expect_err("unknown state");
        match err {
            Error::MalformedRecord { number, reason } => {
                assert_eq!(number, 42);
                assert!(reason.contains("reopened"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparsable_timestamp_names_the_record() {
        let raw = batch(
            r#"[
                {"number": 9, "created_at": "yesterday-ish", "closed_at": null, "state": "open"}
            ]"#,
        );
        let err = normalize(raw, now()).expect_err("bad timestamp");
        assert!(matches!(err, Error::MalformedRecord { number: 9, .. }));
    }

    #[test]
    fn missing_created_at_names_the_record() {
        let raw = batch(r#"[{"number": 5, "closed_at": null, "state": "open"}]"#);
        let err = normalize(raw, now()).expect_err("missing created_at");
        assert!(matches!(err, Error::MalformedRecord { number: 5, .. }));
    }

    #[test]
    fn closure_before_creation_is_rejected() {
        let raw = batch(
            r#"[
                {"number": 1, "created_at": "2021-01-01T00:00:00Z", "closed_at": null, "state": "open"},
                {"number": 2, "created_at": "2021-01-05T00:00:00Z", "closed_at": "2021-01-03T00:00:00Z", "state": "closed"}
            ]"#,
        );
        let err = normalize(raw, now()).expect_err("inverted lifetime");
        assert!(matches!(err, Error::MalformedRecord { number: 2, .. }));
    }

    #[test]
    fn state_round_trips_through_str() {
        assert_eq!(IssueState::parse("open"), Some(IssueState::Open));
        assert_eq!(IssueState::parse("closed"), Some(IssueState::Closed));
        assert_eq!(IssueState::parse("CLOSED"), None);
        assert_eq!(IssueState::Open.to_string(), "open");
    }

    #[test]
    fn canonical_record_serializes_with_historical_field_names() {
        let record = IssueRecord {
            number: 12,
            created_at: at(2021, 1, 1, 0),
            created_day: 0,
            closed_at: at(2021, 1, 2, 0),
            closed_day: 1,
            state: IssueState::Closed,
            end_day_offset: 0,
        };
        let json = serde_json::to_value(&record).expect("serializes");
        assert_eq!(json["issue_number"], 12);
        assert_eq!(json["created_at_day"], 0);
        assert_eq!(json["closed_at_day"], 1);
        assert_eq!(json["state"], "closed");
        assert!(json.get("end_day_offset").is_none());
    }
}
