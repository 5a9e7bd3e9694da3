//! Conversion-safe arithmetic over currency-tagged amounts.
//!
//! `CashCommodity` itself refuses to mix currencies. The calculator is the
//! only place where amounts in different currencies meet: every operand is
//! first converted into the calculator's target currency.

use std::cmp::Ordering;

use budgetcast_shared::{CashCommodity, CurrencyCode};
use serde::{Deserialize, Serialize};

use super::conversion::convert_amount;
use super::error::CurrencyError;
use super::exchange::ExchangeRate;

/// Performs add/subtract/compare in a single target currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyCalculator {
    target: CurrencyCode,
    rates: Vec<ExchangeRate>,
}

impl CurrencyCalculator {
    /// Creates a calculator with no exchange rates.
    ///
    /// Any operand not already in `target` is rejected.
    #[must_use]
    pub const fn new(target: CurrencyCode) -> Self {
        Self {
            target,
            rates: Vec::new(),
        }
    }

    /// Creates a calculator able to convert with the given rates.
    #[must_use]
    pub fn with_rates(target: CurrencyCode, rates: Vec<ExchangeRate>) -> Self {
        Self { target, rates }
    }

    /// Registers an additional exchange rate.
    pub fn add_rate(&mut self, rate: ExchangeRate) {
        self.rates.push(rate);
    }

    /// Currency all results are expressed in.
    #[must_use]
    pub const fn target(&self) -> &CurrencyCode {
        &self.target
    }

    /// Zero in the target currency.
    #[must_use]
    pub fn zero(&self) -> CashCommodity {
        CashCommodity::zero(self.target.clone())
    }

    /// Converts an amount into the target currency.
    ///
    /// Amounts already in the target currency are returned unchanged (no
    /// rounding). A direct rate is preferred over the inverse of an opposite
    /// rate.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::CurrencyMismatch` if no rate relates the
    /// amount's currency to the target.
    pub fn convert(&self, amount: &CashCommodity) -> Result<CashCommodity, CurrencyError> {
        if amount.currency == self.target {
            return Ok(amount.clone());
        }

        if let Some(rate) = self
            .rates
            .iter()
            .find(|r| r.converts(&amount.currency, &self.target))
        {
            return convert_amount(amount, rate);
        }

        if let Some(rate) = self
            .rates
            .iter()
            .find(|r| r.converts(&self.target, &amount.currency))
        {
            return convert_amount(amount, &rate.inverse());
        }

        Err(CurrencyError::CurrencyMismatch {
            expected: self.target.clone(),
            got: amount.currency.clone(),
        })
    }

    /// Adds two amounts, converting both into the target currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::CurrencyMismatch` if either operand cannot be
    /// converted.
    pub fn add(
        &self,
        a: &CashCommodity,
        b: &CashCommodity,
    ) -> Result<CashCommodity, CurrencyError> {
        Ok(self.convert(a)?.checked_add(&self.convert(b)?)?)
    }

    /// Subtracts `b` from `a`, converting both into the target currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::CurrencyMismatch` if either operand cannot be
    /// converted.
    pub fn subtract(
        &self,
        a: &CashCommodity,
        b: &CashCommodity,
    ) -> Result<CashCommodity, CurrencyError> {
        Ok(self.convert(a)?.checked_sub(&self.convert(b)?)?)
    }

    /// Compares two amounts after conversion into the target currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::CurrencyMismatch` if either operand cannot be
    /// converted.
    pub fn compare(&self, a: &CashCommodity, b: &CashCommodity) -> Result<Ordering, CurrencyError> {
        Ok(self.convert(a)?.compare(&self.convert(b)?)?)
    }

    /// Sums any number of amounts into the target currency.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::CurrencyMismatch` on the first operand that
    /// cannot be converted.
    pub fn sum<'a, I>(&self, amounts: I) -> Result<CashCommodity, CurrencyError>
    where
        I: IntoIterator<Item = &'a CashCommodity>,
    {
        amounts
            .into_iter()
            .try_fold(self.zero(), |total, amount| self.add(&total, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn cash(value: Decimal, currency: &str) -> CashCommodity {
        CashCommodity::new(value, code(currency))
    }

    fn usd_calculator_with_eur() -> CurrencyCalculator {
        CurrencyCalculator::with_rates(
            code("USD"),
            vec![ExchangeRate::new(code("EUR"), code("USD"), dec!(1.10)).unwrap()],
        )
    }

    #[test]
    fn test_zero_is_in_target_currency() {
        let calc = CurrencyCalculator::new(code("CAD"));
        assert_eq!(calc.zero(), cash(dec!(0), "CAD"));
    }

    #[test]
    fn test_add_same_currency() {
        let calc = CurrencyCalculator::new(code("USD"));
        let sum = calc.add(&cash(dec!(1.10), "USD"), &cash(dec!(2.25), "USD")).unwrap();
        assert_eq!(sum, cash(dec!(3.35), "USD"));
    }

    #[test]
    fn test_subtract_same_currency() {
        let calc = CurrencyCalculator::new(code("USD"));
        let diff = calc
            .subtract(&cash(dec!(100), "USD"), &cash(dec!(130), "USD"))
            .unwrap();
        assert_eq!(diff, cash(dec!(-30), "USD"));
    }

    #[test]
    fn test_add_converts_with_direct_rate() {
        let calc = usd_calculator_with_eur();
        let sum = calc.add(&cash(dec!(10), "USD"), &cash(dec!(10), "EUR")).unwrap();
        assert_eq!(sum, cash(dec!(21.00), "USD"));
    }

    #[test]
    fn test_convert_uses_inverse_rate() {
        let calc = CurrencyCalculator::with_rates(
            code("EUR"),
            vec![ExchangeRate::new(code("EUR"), code("USD"), dec!(2)).unwrap()],
        );
        let converted = calc.convert(&cash(dec!(5), "USD")).unwrap();
        assert_eq!(converted, cash(dec!(2.50), "EUR"));
    }

    #[test]
    fn test_missing_rate_is_currency_mismatch() {
        let calc = CurrencyCalculator::new(code("USD"));
        let err = calc.add(&cash(dec!(1), "USD"), &cash(dec!(1), "GBP")).unwrap_err();
        assert_eq!(
            err,
            CurrencyError::CurrencyMismatch {
                expected: code("USD"),
                got: code("GBP"),
            }
        );
    }

    #[test]
    fn test_compare_across_currencies() {
        let calc = usd_calculator_with_eur();
        let ordering = calc
            .compare(&cash(dec!(10), "EUR"), &cash(dec!(11.00), "USD"))
            .unwrap();
        assert_eq!(ordering, Ordering::Equal);
    }

    #[test]
    fn test_sum_empty_is_zero() {
        let calc = CurrencyCalculator::new(code("USD"));
        assert_eq!(calc.sum(std::iter::empty()).unwrap(), calc.zero());
    }

    #[test]
    fn test_sum_mixed() {
        let calc = usd_calculator_with_eur();
        let amounts = [cash(dec!(1), "USD"), cash(dec!(1), "EUR"), cash(dec!(-0.10), "USD")];
        assert_eq!(calc.sum(&amounts).unwrap(), cash(dec!(2.00), "USD"));
    }
}
