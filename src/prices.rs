//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// A price held in the minor units of an ISO currency.
pub type Price = Money<'static, Currency>;

/// Errors raised when converting between prices and decimal amounts.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// The amount does not fit in the currency's minor units.
    #[error("amount {0} cannot be represented in minor units")]
    Unrepresentable(Decimal),

    /// Multiplying a price by a quantity overflowed.
    #[error("price {0} multiplied by {1} overflowed")]
    Overflow(i64, u32),
}

/// Returns a zero price in the given currency.
pub fn zero(currency: &'static Currency) -> Price {
    Money::from_minor(0, currency)
}

/// Builds a price from a major-unit decimal amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`PriceError::Unrepresentable`] if the amount overflows `i64` minor units.
pub fn from_decimal(amount: Decimal, currency: &'static Currency) -> Result<Price, PriceError> {
    let scale = Decimal::from(10_i64.pow(currency.exponent));

    let minor = amount
        .checked_mul(scale)
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64())
        .ok_or(PriceError::Unrepresentable(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Returns the major-unit decimal amount of a price (e.g. `49.50`).
pub fn to_decimal(price: &Price) -> Decimal {
    Decimal::new(price.to_minor_units(), price.currency().exponent)
}

/// Multiplies a unit price by a quantity.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the result does not fit in `i64` minor units.
pub fn times(price: &Price, quantity: u32) -> Result<Price, PriceError> {
    let minor = price.to_minor_units();

    minor
        .checked_mul(i64::from(quantity))
        .map(|total| Money::from_minor(total, price.currency()))
        .ok_or(PriceError::Overflow(minor, quantity))
}

/// Formats a price as a plain two-place amount without a currency symbol.
pub fn format_amount(price: &Price) -> String {
    format!("{:.2}", to_decimal(price))
}
