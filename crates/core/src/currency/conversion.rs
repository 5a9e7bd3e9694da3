//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to the target currency's minor units
//! - Use banker's rounding (round half to even)

use budgetcast_shared::CashCommodity;
use rust_decimal::RoundingStrategy;

use super::error::CurrencyError;
use super::exchange::ExchangeRate;

/// Converts an amount using the given exchange rate.
///
/// The caller guarantees `rate.from_currency == amount.currency`.
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
///
/// # Errors
///
/// Returns `CurrencyError::Overflow` if the converted amount does not fit.
pub fn convert_amount(
    amount: &CashCommodity,
    rate: &ExchangeRate,
) -> Result<CashCommodity, CurrencyError> {
    let places = rate.to_currency.minor_units();
    let converted = amount
        .value
        .checked_mul(rate.rate)
        .ok_or_else(|| CurrencyError::Overflow(rate.to_currency.clone()))?
        .round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven);
    Ok(CashCommodity::new(converted, rate.to_currency.clone()))
}
