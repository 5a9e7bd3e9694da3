//! Ending balances.
//!
//! Invariant for every [`EndingBalance`]:
//! `value == initial_value + sum_increases - sum_decreases`.

use budgetcast_shared::CashCommodity;
use serde::{Deserialize, Serialize};

use super::types::BalanceImpact;
use crate::currency::CurrencyError;

/// A starting amount plus tracked increases and decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingBalance {
    initial_value: CashCommodity,
    value: CashCommodity,
    sum_increases: CashCommodity,
    sum_decreases: CashCommodity,
}

impl EndingBalance {
    /// Creates a balance with no changes applied.
    #[must_use]
    pub fn new(initial_value: CashCommodity) -> Self {
        let zero = CashCommodity::zero(initial_value.currency.clone());
        Self {
            value: initial_value.clone(),
            initial_value,
            sum_increases: zero.clone(),
            sum_decreases: zero,
        }
    }

    /// Applies a signed change.
    ///
    /// A negative change adds its magnitude to the decreases; anything else
    /// adds to the increases. The value always moves by the change.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` if the change is in another currency.
    pub fn apply(&mut self, change: &CashCommodity) -> Result<(), CurrencyError> {
        let value = self.value.checked_add(change)?;
        if change.is_negative() {
            self.sum_decreases = self.sum_decreases.checked_sub(change)?;
        } else {
            self.sum_increases = self.sum_increases.checked_add(change)?;
        }
        self.value = value;
        Ok(())
    }

    /// Starting amount.
    #[must_use]
    pub const fn initial_value(&self) -> &CashCommodity {
        &self.initial_value
    }

    /// Current amount.
    #[must_use]
    pub const fn value(&self) -> &CashCommodity {
        &self.value
    }

    /// Total of positive changes.
    #[must_use]
    pub const fn sum_increases(&self) -> &CashCommodity {
        &self.sum_increases
    }

    /// Total magnitude of negative changes.
    #[must_use]
    pub const fn sum_decreases(&self) -> &CashCommodity {
        &self.sum_decreases
    }

    /// Increases minus decreases.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::Overflow` if the difference does not fit.
    pub fn net_change(&self) -> Result<CashCommodity, CurrencyError> {
        Ok(self.sum_increases.checked_sub(&self.sum_decreases)?)
    }
}

/// The three balances one run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingBalances {
    /// Balance if every estimate comes in exactly as budgeted.
    pub estimated: EndingBalance,
    /// Balance from matched transactions only.
    pub actual: EndingBalance,
    /// Balance from actuals where they are known, estimates elsewhere.
    pub expected: EndingBalance,
}

impl EndingBalances {
    /// Three balances starting at `initial`.
    #[must_use]
    pub fn new(initial: &CashCommodity) -> Self {
        Self {
            estimated: EndingBalance::new(initial.clone()),
            actual: EndingBalance::new(initial.clone()),
            expected: EndingBalance::new(initial.clone()),
        }
    }

    /// Applies each part of an impact to its balance.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` if the impact is in another currency.
    pub fn apply(&mut self, impact: &BalanceImpact) -> Result<(), CurrencyError> {
        self.estimated.apply(&impact.estimated)?;
        self.actual.apply(&impact.actual)?;
        self.expected.apply(&impact.expected)?;
        Ok(())
    }
}
