//! Budget analysis engine for Budgetcast.
//!
//! This crate contains pure analysis logic with ZERO file, database or UI
//! dependencies. Callers hand it a budget, rules and transactions; it hands
//! back assignments, ending balances and notices.
//!
//! # Modules
//!
//! - `estimate` - Estimate hierarchy and aggregation
//! - `assignment` - Rule matching and transaction assignment
//! - `behavior` - Per-estimate progress classification
//! - `balance` - Estimated, actual and expected ending balances
//! - `currency` - Currency-aware arithmetic and exchange rates
//! - `period` - Budgeting periods
//! - `report` - Notice sink
//! - `analysis` - End-to-end runs, progress and cancellation

pub mod analysis;
pub mod assignment;
pub mod balance;
pub mod behavior;
pub mod currency;
pub mod estimate;
pub mod period;
pub mod report;
pub mod transaction;

pub use analysis::{AnalysisError, AnalysisInput, AnalysisResult, BudgetAnalyzer};
pub use estimate::{Estimate, EstimateTree, EstimateType};
pub use report::{Notice, NoticeLog, Report};
pub use transaction::Transaction;
