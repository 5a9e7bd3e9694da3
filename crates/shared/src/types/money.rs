//! Currency-tagged decimal amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! `CashCommodity` wraps `rust_decimal::Decimal` so that over/under budget
//! comparisons are exact at the cent.

use std::cmp::Ordering;
use std::ops::Neg;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by money arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Currency code is not three ASCII letters.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    /// Two amounts in different currencies were combined without conversion.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch {
        /// Currency of the left-hand operand.
        expected: CurrencyCode,
        /// Currency of the right-hand operand.
        got: CurrencyCode,
    },

    /// The result does not fit in a `Decimal`.
    #[error("Arithmetic overflow in {currency}")]
    Overflow {
        /// Currency of the operation.
        currency: CurrencyCode,
    },
}

/// ISO 4217 currency code, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidCurrencyCode` unless the code is exactly
    /// three ASCII letters.
    pub fn new(code: impl AsRef<str>) -> Result<Self, MoneyError> {
        let code = code.as_ref().trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(MoneyError::InvalidCurrencyCode(code.to_string()))
        }
    }

    /// US Dollar.
    #[must_use]
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal places in the currency's minor unit.
    #[must_use]
    pub fn minor_units(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "IDR" | "VND" | "CLP" | "ISK" => 0,
            "BHD" | "KWD" | "OMR" | "JOD" | "TND" => 3,
            _ => 2,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::usd()
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// A monetary amount in a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CashCommodity {
    /// Currency the value is expressed in.
    pub currency: CurrencyCode,
    /// Exact decimal value.
    pub value: Decimal,
}

impl CashCommodity {
    /// Creates a new amount.
    #[must_use]
    pub const fn new(value: Decimal, currency: CurrencyCode) -> Self {
        Self { currency, value }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            currency,
            value: Decimal::ZERO,
        }
    }

    /// Returns the amount with its sign flipped.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            currency: self.currency.clone(),
            value: -self.value,
        }
    }

    /// Returns the absolute amount.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            currency: self.currency.clone(),
            value: self.value.abs(),
        }
    }

    /// Returns true if the amount is strictly below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Adds an amount in the same currency.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::CurrencyMismatch` if the currencies differ and
    /// `MoneyError::Overflow` if the sum does not fit.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let value = self.value.checked_add(other.value).ok_or_else(|| self.overflow())?;
        Ok(Self::new(value, self.currency.clone()))
    }

    /// Subtracts an amount in the same currency.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::CurrencyMismatch` if the currencies differ and
    /// `MoneyError::Overflow` if the difference does not fit.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let value = self.value.checked_sub(other.value).ok_or_else(|| self.overflow())?;
        Ok(Self::new(value, self.currency.clone()))
    }

    /// Compares two amounts in the same currency.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::CurrencyMismatch` if the currencies differ.
    pub fn compare(&self, other: &Self) -> Result<Ordering, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.value.cmp(&other.value))
    }

    /// Formats as `"<value> <CODE>"`, rounded to the currency's minor units.
    #[must_use]
    pub fn format_as_string(&self) -> String {
        let places = self.currency.minor_units();
        let mut rounded = self
            .value
            .round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(places);
        format!("{rounded} {}", self.currency)
    }

    fn overflow(&self) -> MoneyError {
        MoneyError::Overflow {
            currency: self.currency.clone(),
        }
    }

    fn ensure_same_currency(&self, other: &Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                expected: self.currency.clone(),
                got: other.currency.clone(),
            })
        }
    }
}

impl Neg for CashCommodity {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            currency: self.currency,
            value: -self.value,
        }
    }
}

impl std::fmt::Display for CashCommodity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_as_string())
    }
}
