//! Property-based tests for currency arithmetic.

use budgetcast_shared::{CashCommodity, CurrencyCode};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::CurrencyCalculator;
use super::exchange::ExchangeRate;

/// Strategy to generate signed amounts (-1,000,000.00 to 1,000,000.00).
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn usd(value: Decimal) -> CashCommodity {
    CashCommodity::new(value, CurrencyCode::usd())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Same-currency addition is exact and commutative.
    #[test]
    fn prop_add_is_exact_and_commutative(a in signed_amount(), b in signed_amount()) {
        let calc = CurrencyCalculator::new(CurrencyCode::usd());
        let ab = calc.add(&usd(a), &usd(b)).unwrap();
        let ba = calc.add(&usd(b), &usd(a)).unwrap();
        prop_assert_eq!(&ab, &ba);
        prop_assert_eq!(ab.value, a + b);
    }

    /// Subtracting what was added gives back the original amount.
    #[test]
    fn prop_subtract_inverts_add(a in signed_amount(), b in signed_amount()) {
        let calc = CurrencyCalculator::new(CurrencyCode::usd());
        let sum = calc.add(&usd(a), &usd(b)).unwrap();
        prop_assert_eq!(calc.subtract(&sum, &usd(b)).unwrap(), usd(a));
    }

    /// is_negative agrees with comparison against zero for every value.
    #[test]
    fn prop_is_negative_matches_sign(a in signed_amount()) {
        prop_assert_eq!(usd(a).is_negative(), a < Decimal::ZERO);
        prop_assert_eq!(usd(a).negate().is_negative(), a > Decimal::ZERO);
    }

    /// Converted amounts always land on the target's minor units.
    #[test]
    fn prop_conversion_rounds_to_minor_units(a in signed_amount(), rate in positive_rate()) {
        let eur = CurrencyCode::new("EUR").unwrap();
        let calc = CurrencyCalculator::with_rates(
            CurrencyCode::usd(),
            vec![ExchangeRate::new(eur.clone(), CurrencyCode::usd(), rate).unwrap()],
        );
        let converted = calc.convert(&CashCommodity::new(a, eur)).unwrap();
        prop_assert_eq!(converted.value, converted.value.round_dp(2));
        prop_assert_eq!(converted.currency, CurrencyCode::usd());
    }
}
