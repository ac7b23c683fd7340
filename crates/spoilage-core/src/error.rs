//! Error taxonomy for the spoilage pipeline.
//!
//! Every failure is fatal to the run: inputs are already-materialized
//! in-memory batches, so an error reflects bad source data, never a
//! transient condition. Record-level failures carry the issue number so
//! malformed exports can be tracked back to the offending issue.

/// Errors produced while normalizing, indexing, aggregating, or clamping.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input batch holds zero issue records, so no day-zero epoch
    /// can be derived.
    #[error("issue batch is empty; cannot derive a day-zero epoch")]
    EmptyBatch,

    /// A single record is missing a required field, carries an
    /// unparsable timestamp, or has an unrecognized state.
    #[error("issue #{number}: {reason}")]
    MalformedRecord { number: u64, reason: String },

    /// The batch as a whole has a broken shape and no record number is
    /// available to point at (missing columns, gaps in a columnar
    /// mapping, a record without a number).
    #[error("malformed issue batch: {reason}")]
    MalformedBatch { reason: String },

    /// The requested window is inverted.
    #[error("window lower bound {lower} exceeds upper bound {upper}")]
    InvalidWindow { lower: i64, upper: i64 },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
