//! Exchange rate types and logic.

use budgetcast_shared::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CurrencyError;

/// Exchange rate between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency code.
    pub from_currency: CurrencyCode,
    /// Target currency code.
    pub to_currency: CurrencyCode,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
}

impl ExchangeRate {
    /// Creates a validated exchange rate.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::SameCurrencyExchange` when both codes are equal
    /// and `CurrencyError::InvalidExchangeRate` when the rate is not positive.
    pub fn new(
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
        rate: Decimal,
    ) -> Result<Self, CurrencyError> {
        if from_currency == to_currency {
            return Err(CurrencyError::SameCurrencyExchange(from_currency));
        }
        if rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidExchangeRate {
                from: from_currency,
                to: to_currency,
                rate,
            });
        }
        Ok(Self {
            from_currency,
            to_currency,
            rate,
        })
    }

    /// Returns the inverse rate.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: Decimal::ONE / self.rate,
        }
    }

    /// Returns true if this rate converts `from` into `to`.
    #[must_use]
    pub fn converts(&self, from: &CurrencyCode, to: &CurrencyCode) -> bool {
        &self.from_currency == from && &self.to_currency == to
    }
}
