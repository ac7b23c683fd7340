//! Inclusive day-window clamp applied to an aggregated series before
//! rendering. The clamp operates on the data, not on the renderer's
//! axes, so downstream consumers only ever see in-window days.

use crate::error::{Error, Result};
use crate::series::DaySeries;

/// Inclusive `[lower, upper]` day bounds; an unset end means no clamp on
/// that side. Defaults: lower 0, upper the series' natural maximum day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

impl Window {
    #[must_use]
    pub const fn new(lower: Option<i64>, upper: Option<i64>) -> Self {
        Self { lower, upper }
    }

    /// A window that clamps nothing.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// Reject inverted bounds. Called up front so a bad window fails the
    /// run before any aggregation work starts.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWindow`] when both ends are set and lower > upper.
    pub fn validate(self) -> Result<()> {
        if let (Some(lower), Some(upper)) = (self.lower, self.upper) {
            if lower > upper {
                return Err(Error::InvalidWindow { lower, upper });
            }
        }
        Ok(())
    }

    /// The in-window subsequence of `series`, day order preserved.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWindow`] on inverted bounds.
    pub fn clamp(self, series: &DaySeries) -> Result<DaySeries> {
        self.validate()?;
        let lower = self.lower.unwrap_or(0);
        let upper = self.upper.or_else(|| series.last_day()).unwrap_or(0);
        Ok(series
            .iter()
            .filter(|(day, _)| (lower..=upper).contains(day))
            .collect())
    }
}
