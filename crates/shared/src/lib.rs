//! Shared types and configuration for Budgetcast.
//!
//! This crate provides common types used by the analysis engine and by the
//! collaborators that feed it:
//! - Typed IDs for estimates, rules and transactions
//! - Currency-tagged decimal amounts
//! - Analysis configuration management

pub mod config;
pub mod types;

pub use config::{AnalysisConfig, RuleOrder};
pub use types::{CashCommodity, CurrencyCode, MoneyError};
