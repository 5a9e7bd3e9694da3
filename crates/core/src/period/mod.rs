//! Budgeting periods: the date range an analysis run covers.

pub mod error;
pub mod types;

pub use error::PeriodError;
pub use types::BudgetingPeriod;
