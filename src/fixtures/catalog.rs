//! Catalog Fixtures

use std::{collections::BTreeMap, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use tracing::debug;

use crate::{
    facets::RawFacetValue,
    fixtures::FixtureError,
    inventory::InventoryRecord,
    price_breaks::{PriceBreak, PriceSchedule},
    variants::{RemainderRoles, Variant},
};

/// Wrapper for a catalog document in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogDocument {
    /// Parent product
    pub parent: ParentFixture,

    /// ISO currency code of every price in the document
    pub currency: String,

    /// Parent product attributes
    #[serde(default)]
    pub facets: BTreeMap<String, RawFacetValue>,

    /// Stock per inventory location
    #[serde(default)]
    pub inventory_records: Vec<InventoryRecord>,

    /// Units available across all locations
    #[serde(default)]
    pub quantity_available: Option<u32>,

    /// Schedule names of the remainder variants, highest priority first
    #[serde(default)]
    pub remainder_roles: Option<Vec<String>>,

    /// Variants in definition order
    #[serde(default)]
    pub variants: Vec<VariantFixture>,
}

/// Parent product fixture
#[derive(Debug, Deserialize)]
pub struct ParentFixture {
    /// Parent product id
    pub id: String,

    /// Display name
    pub name: String,
}

/// Variant fixture
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Variant (child product) id
    pub id: String,

    /// Price schedule, absent while pricing is unknown
    #[serde(default)]
    pub price_schedule: Option<ScheduleFixture>,
}

/// Price schedule fixture
#[derive(Debug, Deserialize)]
pub struct ScheduleFixture {
    /// Schedule name, e.g. `Cut Tape (CT)`
    pub name: String,

    /// Price breaks in any order
    #[serde(default)]
    pub price_breaks: Vec<PriceBreakFixture>,
}

/// Price break fixture
///
/// Both fields are optional because source data is loosely typed; incomplete
/// breaks are dropped when the schedule is built.
#[derive(Debug, Deserialize)]
pub struct PriceBreakFixture {
    /// Minimum quantity
    #[serde(default)]
    pub quantity: Option<i64>,

    /// Unit price (e.g. "0.10")
    #[serde(default)]
    pub price: Option<String>,
}

impl CatalogDocument {
    /// Look up the document currency
    ///
    /// # Errors
    ///
    /// Returns an error if the currency code is unknown.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        iso::find(self.currency.trim())
            .ok_or_else(|| FixtureError::UnknownCurrency(self.currency.clone()))
    }

    /// Remainder roles declared by the document, or the default roles
    ///
    /// # Errors
    ///
    /// Returns an error if the declared roles are invalid.
    pub fn roles(&self) -> Result<RemainderRoles, FixtureError> {
        match &self.remainder_roles {
            Some(names) => Ok(RemainderRoles::new(names.iter().map(String::as_str))?),
            None => Ok(RemainderRoles::default()),
        }
    }
}

impl TryFrom<VariantFixture> for Variant {
    type Error = FixtureError;

    fn try_from(fixture: VariantFixture) -> Result<Self, Self::Error> {
        let Some(schedule) = fixture.price_schedule else {
            debug!(variant_id = %fixture.id, "variant has no price schedule");

            let name = fixture.id.clone();

            return Ok(Variant::new(fixture.id, name, PriceSchedule::default()));
        };

        let mut breaks = Vec::with_capacity(schedule.price_breaks.len());

        for price_break in schedule.price_breaks {
            if let Some(price_break) = parse_break(&fixture.id, price_break)? {
                breaks.push(price_break);
            }
        }

        Ok(Variant::new(
            fixture.id,
            schedule.name,
            PriceSchedule::new(breaks)?,
        ))
    }
}

/// Parse one break, dropping it when a field is missing or the quantity is not
/// positive.
fn parse_break(
    variant_id: &str,
    fixture: PriceBreakFixture,
) -> Result<Option<PriceBreak>, FixtureError> {
    let (Some(quantity), Some(price)) = (fixture.quantity, fixture.price) else {
        debug!(variant_id, "dropping incomplete price break");

        return Ok(None);
    };

    if quantity <= 0 {
        debug!(variant_id, quantity, "dropping price break without units");

        return Ok(None);
    }

    let quantity =
        u32::try_from(quantity).map_err(|_overflow| FixtureError::InvalidQuantity(quantity))?;

    Ok(Some(PriceBreak::new(quantity, parse_price(&price)?)))
}

/// Parse a decimal price string such as "0.10"
///
/// # Errors
///
/// Returns an error if the string is not a decimal number.
pub fn parse_price(s: &str) -> Result<Decimal, FixtureError> {
    Decimal::from_str(s.trim()).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))
}
