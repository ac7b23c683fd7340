//! spoilage-core: issue-lifecycle interval model and day-bucketed
//! aggregation.
//!
//! Given a snapshot of issue-tracker records, derive how many issues were
//! open, closed, or spoiled (unresolved past a full day) on every day of
//! the observed window.
//!
//! # Pipeline
//!
//! raw JSON batch → [`record::normalize`] → [`index::IntervalIndex`] →
//! [`series::aggregate`] (once per [`series::SeriesKind`]) →
//! [`window::Window::clamp`] → external renderer.
//!
//! The whole pipeline is synchronous and single-threaded; the index is
//! built once per batch and only ever queried read-only afterwards, so
//! the three per-kind aggregations could run in parallel without locks.
//!
//! # Conventions
//!
//! - **Errors**: [`error::Error`] via `thiserror`; the binary wraps with
//!   `anyhow`.
//! - **Logging**: `tracing` macros, debug-level per-phase summaries.

pub mod error;
pub mod index;
pub mod record;
pub mod series;
pub mod window;

pub use error::{Error, Result};
pub use index::IntervalIndex;
pub use record::{IssueRecord, IssueState, RawBatch, RawIssue, normalize};
pub use series::{DaySeries, ProbeStrategy, SeriesKind, aggregate};
pub use window::Window;
