//! Ending balance calculation.
//!
//! One pass over the estimate tree produces three balances from the same
//! starting amount:
//!
//! - **estimated**: every leaf lands exactly on its estimate
//! - **actual**: only the matched transactions count
//! - **expected**: actuals where they already tell the story, estimates for
//!   what is still to come
//!
//! Income increases a balance, expenses decrease it, transfers leave it
//! unchanged.

pub mod calculator;
pub mod ending;
pub mod types;

pub use calculator::BalanceCalculator;
pub use ending::{EndingBalance, EndingBalances};
pub use types::{
    BalanceContribution, BalanceImpact, BalanceOptions, BalanceSummary, BudgetDifference,
    ExpectedRationale,
};
