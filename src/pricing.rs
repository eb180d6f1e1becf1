//! Pricing

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::price_breaks::PriceSchedule;

/// Number of decimal places every monetary step is rounded to.
pub const MONEY_DP: u32 = 2;

/// Errors that can occur while pricing a quantity.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The schedule has no tier at or below the quantity.
    #[error("no price break applies to {0} units")]
    NoApplicableBreak(u32),

    /// Unit price multiplied by quantity does not fit in a decimal.
    #[error("subtotal for {quantity} units at {unit_price} overflowed")]
    Overflow {
        /// Units being priced
        quantity: u32,
        /// Unit price of the applied tier
        unit_price: Decimal,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Price of a quantity bought from a single schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedQuantity {
    /// Quantity of the break that was applied
    pub break_quantity: u32,

    /// Unit price of the applied break
    pub unit_price: Decimal,

    /// Unit price times quantity, rounded to two decimal places
    pub subtotal: Money<'static, Currency>,
}

/// Round an amount to two decimal places, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a unit price with its currency symbol, keeping sub-minor-unit precision.
pub fn format_unit_price(unit_price: Decimal, currency: &Currency) -> String {
    let mut amount = unit_price.normalize();

    if amount.scale() < MONEY_DP {
        amount.rescale(MONEY_DP);
    }

    format!("{}{amount}", currency.symbol)
}

/// Price `quantity` units using the tier that applies to exactly that quantity.
///
/// # Errors
///
/// - [`PricingError::NoApplicableBreak`]: no tier starts at or below `quantity`.
/// - [`PricingError::Overflow`]: the subtotal cannot be represented.
pub fn price_quantity(
    schedule: &PriceSchedule,
    quantity: u32,
    currency: &'static Currency,
) -> Result<PricedQuantity, PricingError> {
    let price_break = schedule
        .applicable(quantity)
        .ok_or(PricingError::NoApplicableBreak(quantity))?;

    let unit_price = price_break.price();

    let subtotal = unit_price
        .checked_mul(Decimal::from(quantity))
        .map(round_money)
        .ok_or(PricingError::Overflow {
            quantity,
            unit_price,
        })?;

    Ok(PricedQuantity {
        break_quantity: price_break.quantity(),
        unit_price,
        subtotal: Money::from_decimal(subtotal, currency),
    })
}

/// Sum subtotals into a total, rounded to two decimal places.
///
/// # Errors
///
/// Returns a [`PricingError::Money`] if a subtotal is in a different currency.
pub fn total_price(
    subtotals: impl IntoIterator<Item = Money<'static, Currency>>,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let total = subtotals
        .into_iter()
        .try_fold(Money::from_decimal(Decimal::ZERO, currency), |acc, subtotal| {
            acc.add(subtotal)
        })?;

    Ok(Money::from_decimal(round_money(*total.amount()), currency))
}
