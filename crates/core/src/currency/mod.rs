//! Currency-aware arithmetic and exchange rates.

pub mod calculator;
pub mod conversion;
pub mod error;
pub mod exchange;

#[cfg(test)]
mod props;

pub use calculator::CurrencyCalculator;
pub use conversion::convert_amount;
pub use error::CurrencyError;
pub use exchange::ExchangeRate;
