//! Currency error types.

use budgetcast_shared::{CurrencyCode, MoneyError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by currency arithmetic and conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Two currencies were combined and no exchange rate relates them.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch {
        /// Currency the operation works in.
        expected: CurrencyCode,
        /// Currency of the offending amount.
        got: CurrencyCode,
    },

    /// Exchange rate must be positive.
    #[error("Exchange rate from {from} to {to} must be positive, got {rate}")]
    InvalidExchangeRate {
        /// Source currency code.
        from: CurrencyCode,
        /// Target currency code.
        to: CurrencyCode,
        /// Offending rate.
        rate: Decimal,
    },

    /// Source and target currencies must be different.
    #[error("Exchange rate for {0} to itself is not allowed")]
    SameCurrencyExchange(CurrencyCode),

    /// Currency code could not be parsed.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    /// An amount grew past what a `Decimal` can hold.
    #[error("Arithmetic overflow in {0}")]
    Overflow(CurrencyCode),
}

impl From<MoneyError> for CurrencyError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::CurrencyMismatch { expected, got } => {
                Self::CurrencyMismatch { expected, got }
            }
            MoneyError::InvalidCurrencyCode(code) => Self::InvalidCurrencyCode(code),
            MoneyError::Overflow { currency } => Self::Overflow(currency),
        }
    }
}
