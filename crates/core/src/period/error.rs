//! Budgeting period error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised when a period does not describe a real date range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Month outside 1-12, or a year chrono cannot represent.
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth {
        /// Year given.
        year: i32,
        /// Month given.
        month: u32,
    },

    /// Year chrono cannot represent.
    #[error("Invalid year: {0}")]
    InvalidYear(i32),

    /// Custom range ends before it starts.
    #[error("Period end {end} is before start {start}")]
    EndBeforeStart {
        /// First day.
        start: NaiveDate,
        /// Last day.
        end: NaiveDate,
    },
}
