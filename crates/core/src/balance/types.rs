//! Balance calculation types.

use budgetcast_shared::CashCommodity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ending::EndingBalances;
use crate::behavior::Progress;
use crate::currency::CurrencyError;
use crate::estimate::EstimateType;
use crate::report::NoticeSubject;

/// Why the expected balance uses the amount it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedRationale {
    /// Estimate is final; the actual amount is all there will be.
    NoMoreTransactions,
    /// Actual already exceeds the estimate.
    ActualExceedsEstimated,
    /// The rest of the estimate is assumed to arrive as planned.
    EstimatedExceedsActual,
}

impl ExpectedRationale {
    /// Chooses the expected amount for a leaf.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` if the amounts are in different currencies.
    pub fn choose(
        estimated: &CashCommodity,
        actual: &CashCommodity,
        is_final: bool,
    ) -> Result<(CashCommodity, Self), CurrencyError> {
        if is_final {
            return Ok((actual.clone(), Self::NoMoreTransactions));
        }
        if actual.compare(estimated)?.is_gt() {
            Ok((actual.clone(), Self::ActualExceedsEstimated))
        } else {
            Ok((estimated.clone(), Self::EstimatedExceedsActual))
        }
    }
}

/// Signed contribution of one leaf to the three balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceImpact {
    /// Change to the estimated balance.
    pub estimated: CashCommodity,
    /// Change to the actual balance.
    pub actual: CashCommodity,
    /// Change to the expected balance.
    pub expected: CashCommodity,
}

impl BalanceImpact {
    /// Signs oriented amounts by estimate type: income adds, expenses
    /// subtract, transfers leave the balance alone.
    #[must_use]
    pub fn for_type(
        estimate_type: EstimateType,
        estimated: &CashCommodity,
        actual: &CashCommodity,
        expected: &CashCommodity,
    ) -> Self {
        match estimate_type {
            EstimateType::Income => Self {
                estimated: estimated.clone(),
                actual: actual.clone(),
                expected: expected.clone(),
            },
            EstimateType::Expense => Self {
                estimated: estimated.negate(),
                actual: actual.negate(),
                expected: expected.negate(),
            },
            EstimateType::Transfer | EstimateType::Category => {
                let zero = CashCommodity::zero(estimated.currency.clone());
                Self {
                    estimated: zero.clone(),
                    actual: zero.clone(),
                    expected: zero,
                }
            }
        }
    }
}

/// What one leaf (or unbudgeted bucket) added to the balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceContribution {
    /// Leaf or bucket.
    pub subject: NoticeSubject,
    /// Signed impact.
    pub impact: BalanceImpact,
    /// Basis of the expected part.
    pub rationale: ExpectedRationale,
    /// Classification.
    pub progress: Progress,
}

/// How far a leaf is from its estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetDifference {
    /// Leaf concerned.
    pub subject: NoticeSubject,
    /// `|actual - estimated|`.
    pub difference: CashCommodity,
}

/// Inputs to a balance calculation besides the tree and figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceOptions {
    /// "Now" for due-date checks.
    pub today: NaiveDate,
    /// Treat every estimate as final.
    pub all_final: bool,
}

impl BalanceOptions {
    /// Options for `today`, finality taken from each estimate.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            today,
            all_final: false,
        }
    }
}

/// Everything a balance calculation produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Estimated, actual and expected ending balances.
    pub balances: EndingBalances,
    /// Per-leaf contributions in tree order, unbudgeted buckets last.
    pub contributions: Vec<BalanceContribution>,
    /// Leaves over budget, largest difference first.
    pub over_budget: Vec<BudgetDifference>,
    /// Leaves under budget, largest difference first.
    pub under_budget: Vec<BudgetDifference>,
}
