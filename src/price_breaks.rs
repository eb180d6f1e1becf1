//! Price Breaks

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;

/// Errors that can occur while building a price schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceScheduleError {
    /// A break was defined for zero units.
    #[error("price break quantity must be greater than zero")]
    ZeroQuantity,

    /// A break carried a negative unit price (break quantity).
    #[error("price break at quantity {0} has a negative price")]
    NegativePrice(u32),

    /// Two breaks were defined for the same quantity.
    #[error("duplicate price break at quantity {0}")]
    DuplicateQuantity(u32),
}

/// A pricing tier: ordering at least `quantity` units unlocks `price` per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreak {
    quantity: u32,
    price: Decimal,
}

impl PriceBreak {
    /// Creates a new price break
    pub fn new(quantity: u32, price: Decimal) -> Self {
        Self { quantity, price }
    }

    /// Minimum quantity for this tier
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price for this tier
    pub fn price(&self) -> Decimal {
        self.price
    }
}

/// Ordered set of price breaks for a single variant.
///
/// Breaks are kept sorted by ascending quantity and quantities are unique, so two
/// schedules compare equal exactly when they list the same tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceSchedule {
    breaks: SmallVec<[PriceBreak; 6]>,
}

impl PriceSchedule {
    /// Create a schedule from a set of breaks in any order.
    ///
    /// # Errors
    ///
    /// - [`PriceScheduleError::ZeroQuantity`]: a break was defined for zero units.
    /// - [`PriceScheduleError::NegativePrice`]: a break has a negative unit price.
    /// - [`PriceScheduleError::DuplicateQuantity`]: two breaks share a quantity.
    pub fn new(breaks: impl IntoIterator<Item = PriceBreak>) -> Result<Self, PriceScheduleError> {
        let mut breaks: SmallVec<[PriceBreak; 6]> = breaks.into_iter().collect();

        for price_break in &breaks {
            if price_break.quantity == 0 {
                return Err(PriceScheduleError::ZeroQuantity);
            }

            if price_break.price < Decimal::ZERO {
                return Err(PriceScheduleError::NegativePrice(price_break.quantity));
            }
        }

        breaks.sort_unstable_by_key(PriceBreak::quantity);

        let mut previous: Option<u32> = None;

        for price_break in &breaks {
            if previous == Some(price_break.quantity) {
                return Err(PriceScheduleError::DuplicateQuantity(price_break.quantity));
            }

            previous = Some(price_break.quantity);
        }

        Ok(Self { breaks })
    }

    /// Breaks in ascending quantity order.
    pub fn breaks(&self) -> &[PriceBreak] {
        &self.breaks
    }

    /// Number of breaks in the schedule.
    pub fn len(&self) -> usize {
        self.breaks.len()
    }

    /// Check if the schedule has no breaks.
    pub fn is_empty(&self) -> bool {
        self.breaks.is_empty()
    }

    /// Smallest quantity any tier can be bought at.
    pub fn min_quantity(&self) -> Option<u32> {
        self.breaks.first().map(PriceBreak::quantity)
    }

    /// The tier that applies to an order of `quantity` units: the largest break
    /// quantity that does not exceed it.
    pub fn applicable(&self, quantity: u32) -> Option<&PriceBreak> {
        self.breaks
            .iter()
            .rev()
            .find(|price_break| price_break.quantity <= quantity)
    }

    /// Check whether any tier starts at exactly `quantity` units.
    pub fn has_exact(&self, quantity: u32) -> bool {
        self.breaks
            .binary_search_by_key(&quantity, PriceBreak::quantity)
            .is_ok()
    }

    /// Greedily cover as much of `quantity` as possible using this schedule's break
    /// quantities as denominations, largest first.
    ///
    /// Returns the number of units covered, always `<= quantity`.
    pub fn greedy_cover(&self, quantity: u32) -> u32 {
        self.breaks.iter().rev().fold(0, |covered, price_break| {
            let remaining = quantity - covered;

            covered + (remaining / price_break.quantity) * price_break.quantity
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;

    fn tiered() -> Result<PriceSchedule, PriceScheduleError> {
        PriceSchedule::new([
            PriceBreak::new(100, dec!(8)),
            PriceBreak::new(1, dec!(10)),
            PriceBreak::new(10, dec!(9)),
        ])
    }

    #[test]
    fn new_sorts_breaks_by_quantity() -> TestResult {
        let schedule = tiered()?;

        let quantities: Vec<u32> = schedule.breaks().iter().map(PriceBreak::quantity).collect();

        assert_eq!(quantities, vec![1, 10, 100]);

        Ok(())
    }

    #[test]
    fn new_rejects_zero_quantity() {
        let result = PriceSchedule::new([PriceBreak::new(0, dec!(1))]);

        assert_eq!(result, Err(PriceScheduleError::ZeroQuantity));
    }

    #[test]
    fn new_rejects_negative_price() {
        let result = PriceSchedule::new([PriceBreak::new(5, dec!(-0.01))]);

        assert_eq!(result, Err(PriceScheduleError::NegativePrice(5)));
    }

    #[test]
    fn new_rejects_duplicate_quantities() {
        let result = PriceSchedule::new([
            PriceBreak::new(10, dec!(1)),
            PriceBreak::new(1, dec!(2)),
            PriceBreak::new(10, dec!(0.5)),
        ]);

        assert_eq!(result, Err(PriceScheduleError::DuplicateQuantity(10)));
    }

    #[test]
    fn free_tiers_are_allowed() -> TestResult {
        let schedule = PriceSchedule::new([PriceBreak::new(1, Decimal::ZERO)])?;

        assert_eq!(schedule.len(), 1);

        Ok(())
    }

    #[test]
    fn applicable_picks_largest_break_not_exceeding_quantity() -> TestResult {
        let schedule = tiered()?;

        assert_eq!(schedule.applicable(1).map(PriceBreak::price), Some(dec!(10)));
        assert_eq!(schedule.applicable(9).map(PriceBreak::price), Some(dec!(10)));
        assert_eq!(schedule.applicable(10).map(PriceBreak::price), Some(dec!(9)));
        assert_eq!(schedule.applicable(250).map(PriceBreak::price), Some(dec!(8)));

        Ok(())
    }

    #[test]
    fn applicable_is_none_below_first_break() -> TestResult {
        let schedule = PriceSchedule::new([PriceBreak::new(10, dec!(5))])?;

        assert!(schedule.applicable(9).is_none());
        assert!(PriceSchedule::default().applicable(9).is_none());

        Ok(())
    }

    #[test]
    fn has_exact_matches_break_quantities_only() -> TestResult {
        let schedule = tiered()?;

        assert!(schedule.has_exact(10));
        assert!(!schedule.has_exact(11));

        Ok(())
    }

    #[test]
    fn greedy_cover_uses_largest_denominations_first() -> TestResult {
        let schedule = PriceSchedule::new([
            PriceBreak::new(2000, dec!(0.01)),
            PriceBreak::new(500, dec!(0.02)),
        ])?;

        assert_eq!(schedule.greedy_cover(4750), 4500);
        assert_eq!(schedule.greedy_cover(499), 0);

        Ok(())
    }

    #[test]
    fn greedy_cover_is_exact_when_unit_break_exists() -> TestResult {
        let schedule = tiered()?;

        assert_eq!(schedule.greedy_cover(57), 57);

        Ok(())
    }

    #[test]
    fn min_quantity_is_first_break() -> TestResult {
        assert_eq!(tiered()?.min_quantity(), Some(1));
        assert_eq!(PriceSchedule::default().min_quantity(), None);

        Ok(())
    }
}
