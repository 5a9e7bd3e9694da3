//! End-to-end budget analysis.
//!
//! A run validates the tree, filters transactions to the budgeting period,
//! assigns them through the rules and folds the result into ending
//! balances. Runs are single-threaded and read their input immutably;
//! progress is advisory and cancellation is checked once per transaction.

pub mod analyzer;
pub mod error;
pub mod progress;

pub use analyzer::{AnalysisInput, AnalysisResult, BudgetAnalyzer};
pub use error::AnalysisError;
pub use progress::{CancellationToken, NoProgress, ProgressReporter, ProgressSpan};
