//! Resolver
//!
//! Decides which variants of a parent product fulfil a requested quantity and
//! prices the result. Resolution is a pure function of its inputs: the shopper's
//! remainder choice is passed back in on every call rather than remembered.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use tracing::{Span, debug};

use crate::{
    pricing::{PricingError, price_quantity, total_price},
    variants::{Variant, VariantGroup, VariantKey, VariantRole},
};

/// Errors returned for inputs that violate the resolver's contract.
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    /// Quantities are never negative.
    #[error("requested quantity {0} is negative")]
    NegativeQuantity(i64),

    /// Quantity does not fit the unit counter.
    #[error("requested quantity {0} is too large")]
    QuantityTooLarge(i64),

    /// Pricing an allocated part failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// How to pick between two eligible remainder variants the shopper has not chosen
/// between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RemainderPolicy {
    /// Use the highest priority remainder role.
    #[default]
    DefaultPriority,

    /// Ask the shopper before finalising the allocation.
    RequireChoice,
}

/// Options that change how a resolution is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Remainder tie-break policy
    pub remainder_policy: RemainderPolicy,
}

/// Caller-owned selection state, re-supplied on every recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Requested quantity
    pub quantity: i64,

    /// Id of the remainder variant the shopper picked, if any
    pub remainder_choice: Option<String>,
}

impl Selection {
    /// Create a selection for a quantity with no remainder choice.
    pub fn new(quantity: i64) -> Self {
        Self {
            quantity,
            remainder_choice: None,
        }
    }

    /// Set the shopper's remainder choice.
    #[must_use]
    pub fn with_remainder_choice(mut self, variant_id: impl Into<String>) -> Self {
        self.remainder_choice = Some(variant_id.into());
        self
    }

    /// Resolve this selection against a variant group.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn resolve(
        &self,
        group: &VariantGroup,
        options: ResolveOptions,
    ) -> Result<Resolution, ResolveError> {
        resolve(
            self.quantity,
            group,
            self.remainder_choice.as_deref(),
            options,
        )
    }
}

/// How the remainder variant of an allocation was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainderPick {
    /// Only one remainder variant could absorb the leftover.
    OnlyOption,

    /// The shopper chose it.
    Chosen,

    /// Picked by role priority with no shopper choice.
    Defaulted,
}

/// One variant's share of an allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPart {
    /// Allocated variant
    pub variant: VariantKey,

    /// Allocated variant id
    pub variant_id: String,

    /// Allocated variant name
    pub name: String,

    /// Role of the variant in its group
    pub role: VariantRole,

    /// Units allocated to this variant
    pub quantity: u32,

    /// Quantity of the price break applied to this part
    pub break_quantity: u32,

    /// Unit price of the applied price break
    pub unit_price: Decimal,

    /// Unit price times quantity, rounded to two decimal places
    pub subtotal: Money<'static, Currency>,
}

/// A priced split of the requested quantity across one or two variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    quantity: u32,
    parts: SmallVec<[AllocationPart; 2]>,
    total: Money<'static, Currency>,
    remainder_pick: Option<RemainderPick>,
}

impl Allocation {
    /// Total units allocated, always the requested quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Allocated parts, standard part first.
    pub fn parts(&self) -> &[AllocationPart] {
        &self.parts
    }

    /// Sum of part subtotals.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// How the remainder variant was picked, `None` without a remainder part.
    pub fn remainder_pick(&self) -> Option<RemainderPick> {
        self.remainder_pick
    }

    /// Check if the quantity is split across two variants.
    pub fn is_split(&self) -> bool {
        self.parts.len() > 1
    }
}

/// Leftover units nothing can absorb.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortfall {
    /// Requested quantity
    pub requested: u32,

    /// Units covered by the best standard variant
    pub covered: u32,

    /// Units left uncovered
    pub leftover: u32,

    /// Best standard part, if any standard variant covered anything
    pub standard: Option<AllocationPart>,
}

/// A remainder variant the shopper can pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainderCandidate {
    /// Candidate variant
    pub variant: VariantKey,

    /// Candidate variant id
    pub variant_id: String,

    /// Candidate variant name
    pub name: String,
}

/// Pending remainder choice the shopper must make.
#[derive(Debug, Clone, PartialEq)]
pub struct RemainderPrompt {
    /// Units the chosen remainder variant will absorb
    pub leftover: u32,

    /// Standard part that is already settled, if any
    pub standard: Option<AllocationPart>,

    /// Eligible remainder variants, highest priority first
    pub candidates: SmallVec<[RemainderCandidate; 2]>,
}

/// Outcome of resolving a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing was requested.
    Empty,

    /// No variant carries pricing.
    Unresolvable,

    /// Leftover units have no remainder variant to absorb them.
    Infeasible(Shortfall),

    /// More than one remainder variant fits and the shopper must pick one.
    AwaitingRemainderChoice(RemainderPrompt),

    /// The quantity is fully allocated and priced.
    Allocated(Allocation),
}

impl Resolution {
    /// The allocation, when one was reached.
    pub fn allocation(&self) -> Option<&Allocation> {
        match self {
            Resolution::Allocated(allocation) => Some(allocation),
            _ => None,
        }
    }

    /// Check if the result can be committed to a cart.
    pub fn is_committable(&self) -> bool {
        matches!(self, Resolution::Allocated(_))
    }

    /// Short name of the outcome, used in logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Empty => "empty",
            Resolution::Unresolvable => "unresolvable",
            Resolution::Infeasible(_) => "infeasible",
            Resolution::AwaitingRemainderChoice(_) => "awaiting_remainder_choice",
            Resolution::Allocated(_) => "allocated",
        }
    }
}

/// Resolve a requested quantity against a variant group.
///
/// A standard variant with a tier starting at exactly the requested quantity takes
/// the whole order. Otherwise the standard variant whose own break quantities
/// greedily cover the most units is used, and a remainder variant absorbs what is
/// left. With nothing covered a remainder variant takes the whole order.
///
/// # Errors
///
/// - [`ResolveError::NegativeQuantity`]: `quantity` is below zero.
/// - [`ResolveError::QuantityTooLarge`]: `quantity` exceeds `u32::MAX`.
/// - [`ResolveError::Pricing`]: an allocated part could not be priced.
#[tracing::instrument(
    level = "debug",
    skip(group),
    fields(parent_id = group.parent_id(), outcome = tracing::field::Empty)
)]
pub fn resolve(
    quantity: i64,
    group: &VariantGroup,
    choice: Option<&str>,
    options: ResolveOptions,
) -> Result<Resolution, ResolveError> {
    let resolution = resolve_units(requested_units(quantity)?, group, choice, options)?;

    Span::current().record("outcome", resolution.outcome());

    Ok(resolution)
}

fn requested_units(quantity: i64) -> Result<u32, ResolveError> {
    if quantity < 0 {
        return Err(ResolveError::NegativeQuantity(quantity));
    }

    u32::try_from(quantity).map_err(|_overflow| ResolveError::QuantityTooLarge(quantity))
}

fn resolve_units(
    requested: u32,
    group: &VariantGroup,
    choice: Option<&str>,
    options: ResolveOptions,
) -> Result<Resolution, ResolveError> {
    if requested == 0 {
        return Ok(Resolution::Empty);
    }

    if !group.has_pricing() {
        return Ok(Resolution::Unresolvable);
    }

    if let Some((key, variant)) = group
        .standard_variants()
        .find(|(_key, variant)| variant.schedule.has_exact(requested))
    {
        debug!(variant_id = %variant.id, "exact tier match");

        let part = price_part(group, key, variant, requested)?;

        return allocated(group, requested, smallvec![part], None);
    }

    let standard = best_standard_cover(group, requested)
        .map(|(key, variant, covered)| price_part(group, key, variant, covered))
        .transpose()?;

    let covered = standard.as_ref().map_or(0, |part| part.quantity);
    let leftover = requested - covered;

    if leftover == 0 {
        return allocated(group, requested, standard.into_iter().collect(), None);
    }

    match pick_remainder(group, leftover, choice, options.remainder_policy) {
        RemainderOutcome::Picked(key, variant, pick) => {
            let remainder = price_part(group, key, variant, leftover)?;
            let parts = standard.into_iter().chain([remainder]).collect();

            allocated(group, requested, parts, Some(pick))
        }
        RemainderOutcome::Ambiguous(candidates) => {
            Ok(Resolution::AwaitingRemainderChoice(RemainderPrompt {
                leftover,
                standard,
                candidates,
            }))
        }
        RemainderOutcome::Unavailable => Ok(Resolution::Infeasible(Shortfall {
            requested,
            covered,
            leftover,
            standard,
        })),
    }
}

/// Standard variant covering the most units, first defined on ties.
fn best_standard_cover(
    group: &VariantGroup,
    requested: u32,
) -> Option<(VariantKey, &Variant, u32)> {
    group
        .standard_variants()
        .map(|(key, variant)| (key, variant, variant.schedule.greedy_cover(requested)))
        .filter(|(_key, _variant, covered)| *covered > 0)
        .fold(None, |best, candidate| match best {
            Some(best) if best.2 >= candidate.2 => Some(best),
            _ => Some(candidate),
        })
}

enum RemainderOutcome<'g> {
    Picked(VariantKey, &'g Variant, RemainderPick),
    Ambiguous(SmallVec<[RemainderCandidate; 2]>),
    Unavailable,
}

fn pick_remainder<'g>(
    group: &'g VariantGroup,
    leftover: u32,
    choice: Option<&str>,
    policy: RemainderPolicy,
) -> RemainderOutcome<'g> {
    let eligible: SmallVec<[(VariantKey, &Variant); 2]> = group
        .remainder_variants()
        .into_iter()
        .filter(|(_key, variant)| {
            variant
                .schedule
                .min_quantity()
                .is_some_and(|min| min <= leftover)
        })
        .collect();

    if let Some(choice) = choice {
        if let Some((key, variant)) = eligible.iter().find(|(_key, variant)| variant.id == choice) {
            return RemainderOutcome::Picked(*key, *variant, RemainderPick::Chosen);
        }

        debug!(choice, leftover, "ignoring remainder choice that cannot absorb leftover");
    }

    match (eligible.as_slice(), policy) {
        ([], _) => RemainderOutcome::Unavailable,
        ([(key, variant)], _) => {
            RemainderOutcome::Picked(*key, *variant, RemainderPick::OnlyOption)
        }
        ([(key, variant), ..], RemainderPolicy::DefaultPriority) => {
            RemainderOutcome::Picked(*key, *variant, RemainderPick::Defaulted)
        }
        (candidates, RemainderPolicy::RequireChoice) => RemainderOutcome::Ambiguous(
            candidates
                .iter()
                .map(|(key, variant)| RemainderCandidate {
                    variant: *key,
                    variant_id: variant.id.clone(),
                    name: variant.name.clone(),
                })
                .collect(),
        ),
    }
}

fn price_part(
    group: &VariantGroup,
    key: VariantKey,
    variant: &Variant,
    quantity: u32,
) -> Result<AllocationPart, PricingError> {
    let priced = price_quantity(&variant.schedule, quantity, group.currency())?;

    Ok(AllocationPart {
        variant: key,
        variant_id: variant.id.clone(),
        name: variant.name.clone(),
        role: group.role(variant),
        quantity,
        break_quantity: priced.break_quantity,
        unit_price: priced.unit_price,
        subtotal: priced.subtotal,
    })
}

fn allocated(
    group: &VariantGroup,
    requested: u32,
    parts: SmallVec<[AllocationPart; 2]>,
    remainder_pick: Option<RemainderPick>,
) -> Result<Resolution, ResolveError> {
    let total = total_price(parts.iter().map(|part| part.subtotal), group.currency())?;

    Ok(Resolution::Allocated(Allocation {
        quantity: requested,
        parts,
        total,
        remainder_pick,
    }))
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        price_breaks::{PriceBreak, PriceSchedule},
        variants::{CUT_TAPE, DIGI_REEL},
    };

    use super::*;

    fn variant(id: &str, name: &str, breaks: &[(u32, Decimal)]) -> Result<Variant, TestError> {
        let schedule = PriceSchedule::new(breaks.iter().map(|(q, p)| PriceBreak::new(*q, *p)))?;

        Ok(Variant::new(id, name, schedule))
    }

    type TestError = Box<dyn std::error::Error>;

    fn reel_group() -> Result<VariantGroup, TestError> {
        let mut group = VariantGroup::new("P-1", USD);

        group.push(variant("TR", "Tape & Reel (TR)", &[(1000, dec!(0.05))])?)?;
        group.push(variant("CT", CUT_TAPE, &[(1, dec!(0.20)), (100, dec!(0.10))])?)?;
        group.push(variant("DR", DIGI_REEL, &[(1, dec!(0.20)), (100, dec!(0.10))])?)?;

        Ok(group)
    }

    #[test]
    fn negative_quantity_is_rejected() -> TestResult {
        let group = reel_group()?;

        assert_eq!(
            resolve(-1, &group, None, ResolveOptions::default()),
            Err(ResolveError::NegativeQuantity(-1))
        );

        Ok(())
    }

    #[test]
    fn oversized_quantity_is_rejected() -> TestResult {
        let group = reel_group()?;
        let quantity = i64::from(u32::MAX) + 1;

        assert_eq!(
            resolve(quantity, &group, None, ResolveOptions::default()),
            Err(ResolveError::QuantityTooLarge(quantity))
        );

        Ok(())
    }

    #[test]
    fn zero_quantity_is_empty_even_without_pricing() -> TestResult {
        let group = VariantGroup::new("P-1", USD);

        assert_eq!(
            resolve(0, &group, None, ResolveOptions::default())?,
            Resolution::Empty
        );

        Ok(())
    }

    #[test]
    fn group_without_pricing_is_unresolvable() -> TestResult {
        let mut group = VariantGroup::new("P-1", USD);
        group.push(variant("CT", CUT_TAPE, &[])?)?;

        assert_eq!(
            resolve(5, &group, None, ResolveOptions::default())?,
            Resolution::Unresolvable
        );

        Ok(())
    }

    #[test]
    fn exact_tier_match_takes_whole_order() -> TestResult {
        let group = reel_group()?;

        let resolution = resolve(1000, &group, None, ResolveOptions::default())?;
        let allocation = resolution.allocation().ok_or("expected allocation")?;

        assert!(!allocation.is_split());
        assert_eq!(allocation.parts().len(), 1);
        assert_eq!(allocation.parts().first().map(|p| p.variant_id.as_str()), Some("TR"));
        assert_eq!(*allocation.total().amount(), dec!(50.00));
        assert_eq!(allocation.remainder_pick(), None);

        Ok(())
    }

    #[test]
    fn split_uses_standard_then_priority_remainder() -> TestResult {
        let group = reel_group()?;

        let resolution = resolve(2150, &group, None, ResolveOptions::default())?;
        let allocation = resolution.allocation().ok_or("expected allocation")?;

        let parts: Vec<(&str, u32, Decimal)> = allocation
            .parts()
            .iter()
            .map(|p| (p.variant_id.as_str(), p.quantity, p.unit_price))
            .collect();

        assert_eq!(
            parts,
            vec![("TR", 2000, dec!(0.05)), ("CT", 150, dec!(0.10))]
        );
        assert_eq!(*allocation.total().amount(), dec!(115.00));
        assert_eq!(allocation.remainder_pick(), Some(RemainderPick::Defaulted));

        Ok(())
    }

    #[test]
    fn shopper_choice_overrides_priority() -> TestResult {
        let group = reel_group()?;

        let resolution = resolve(2150, &group, Some("DR"), ResolveOptions::default())?;
        let allocation = resolution.allocation().ok_or("expected allocation")?;

        assert_eq!(
            allocation.parts().get(1).map(|p| p.variant_id.as_str()),
            Some("DR")
        );
        assert_eq!(allocation.remainder_pick(), Some(RemainderPick::Chosen));

        Ok(())
    }

    #[test]
    fn unknown_choice_falls_back_to_policy() -> TestResult {
        let group = reel_group()?;

        let resolution = resolve(2150, &group, Some("TR"), ResolveOptions::default())?;
        let allocation = resolution.allocation().ok_or("expected allocation")?;

        assert_eq!(
            allocation.parts().get(1).map(|p| p.variant_id.as_str()),
            Some("CT")
        );
        assert_eq!(allocation.remainder_pick(), Some(RemainderPick::Defaulted));

        Ok(())
    }

    #[test]
    fn require_choice_prompts_with_settled_standard_part() -> TestResult {
        let group = reel_group()?;
        let options = ResolveOptions {
            remainder_policy: RemainderPolicy::RequireChoice,
        };

        let Resolution::AwaitingRemainderChoice(prompt) = resolve(2150, &group, None, options)?
        else {
            return Err("expected remainder prompt".into());
        };

        let candidates: Vec<&str> = prompt
            .candidates
            .iter()
            .map(|c| c.variant_id.as_str())
            .collect();

        assert_eq!(prompt.leftover, 150);
        assert_eq!(prompt.standard.map(|p| p.quantity), Some(2000));
        assert_eq!(candidates, vec!["CT", "DR"]);

        Ok(())
    }

    #[test]
    fn require_choice_is_satisfied_by_choice() -> TestResult {
        let group = reel_group()?;
        let options = ResolveOptions {
            remainder_policy: RemainderPolicy::RequireChoice,
        };

        let resolution = resolve(2150, &group, Some("DR"), options)?;

        assert!(resolution.is_committable());

        Ok(())
    }

    #[test]
    fn single_eligible_remainder_needs_no_choice() -> TestResult {
        let mut group = VariantGroup::new("P-1", USD);
        group.push(variant("TR", "Tape & Reel (TR)", &[(1000, dec!(0.05))])?)?;
        group.push(variant("CT", CUT_TAPE, &[(1, dec!(0.20))])?)?;
        group.push(variant("DR", DIGI_REEL, &[(500, dec!(0.10))])?)?;

        let options = ResolveOptions {
            remainder_policy: RemainderPolicy::RequireChoice,
        };

        let resolution = resolve(1200, &group, None, options)?;
        let allocation = resolution.allocation().ok_or("expected allocation")?;

        assert_eq!(
            allocation.parts().get(1).map(|p| p.variant_id.as_str()),
            Some("CT")
        );
        assert_eq!(allocation.remainder_pick(), Some(RemainderPick::OnlyOption));

        Ok(())
    }

    #[test]
    fn best_cover_prefers_most_units_then_first_defined() -> TestResult {
        let mut group = VariantGroup::new("P-1", USD);
        group.push(variant("BOX", "Box", &[(300, dec!(1))])?)?;
        group.push(variant("TRAY", "Tray", &[(250, dec!(1))])?)?;
        group.push(variant("TUBE", "Tube", &[(450, dec!(1))])?)?;
        group.push(variant("CT", CUT_TAPE, &[(1, dec!(2))])?)?;

        // BOX covers 600, TRAY 750, TUBE 450
        let resolution = resolve(760, &group, None, ResolveOptions::default())?;
        let allocation = resolution.allocation().ok_or("expected allocation")?;

        assert_eq!(
            allocation.parts().first().map(|p| (p.variant_id.as_str(), p.quantity)),
            Some(("TRAY", 750))
        );

        // BOX and TUBE both cover all 900 units, TRAY only 750
        let resolution = resolve(900, &group, None, ResolveOptions::default())?;
        let allocation = resolution.allocation().ok_or("expected allocation")?;

        assert_eq!(
            allocation.parts().first().map(|p| (p.variant_id.as_str(), p.quantity)),
            Some(("BOX", 900))
        );

        Ok(())
    }

    #[test]
    fn remainder_alone_when_nothing_is_covered() -> TestResult {
        let group = reel_group()?;

        let resolution = resolve(150, &group, None, ResolveOptions::default())?;
        let allocation = resolution.allocation().ok_or("expected allocation")?;

        assert_eq!(allocation.parts().len(), 1);
        assert_eq!(
            allocation.parts().first().map(|p| (p.variant_id.as_str(), p.role)),
            Some(("CT", VariantRole::Remainder))
        );
        assert_eq!(*allocation.total().amount(), dec!(15.00));

        Ok(())
    }

    #[test]
    fn infeasible_reports_shortfall() -> TestResult {
        let mut group = VariantGroup::new("P-1", USD);
        group.push(variant("TR", "Tape & Reel (TR)", &[(1000, dec!(0.05))])?)?;
        group.push(variant("CT", CUT_TAPE, &[(10, dec!(0.20))])?)?;

        let Resolution::Infeasible(shortfall) =
            resolve(1005, &group, None, ResolveOptions::default())?
        else {
            return Err("expected infeasible".into());
        };

        assert_eq!(shortfall.requested, 1005);
        assert_eq!(shortfall.covered, 1000);
        assert_eq!(shortfall.leftover, 5);
        assert_eq!(shortfall.standard.map(|p| p.variant_id), Some("TR".to_string()));

        Ok(())
    }

    #[test]
    fn selection_resolves_with_its_choice() -> TestResult {
        let group = reel_group()?;

        let selection = Selection::new(2150).with_remainder_choice("DR");
        let resolution = selection.resolve(&group, ResolveOptions::default())?;

        assert_eq!(
            resolution.allocation().and_then(Allocation::remainder_pick),
            Some(RemainderPick::Chosen)
        );

        Ok(())
    }

    #[test]
    fn outcome_names_are_stable() {
        assert_eq!(Resolution::Empty.outcome(), "empty");
        assert_eq!(Resolution::Unresolvable.outcome(), "unresolvable");
    }
}
