//! Catalog
//!
//! Price-break tables shown on a product page. When both remainder packagings are
//! priced identically they are listed once under a combined label, while staying
//! separate variants for allocation.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    price_breaks::{PriceBreak, PriceSchedule},
    pricing::format_unit_price,
    variants::{VariantGroup, VariantKey},
};

/// Errors that can occur when rendering catalog tables.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Writing to the output failed.
    #[error("failed to write price table: {0}")]
    Io(#[from] io::Error),
}

/// One price table on the product page.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogLine<'g> {
    label: String,
    variants: SmallVec<[VariantKey; 2]>,
    schedule: &'g PriceSchedule,
}

impl<'g> CatalogLine<'g> {
    /// Heading shown above the table
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Variants this line prices, two for a merged remainder line
    pub fn variants(&self) -> &[VariantKey] {
        &self.variants
    }

    /// Shared price schedule
    pub fn schedule(&self) -> &'g PriceSchedule {
        self.schedule
    }

    /// Check if this line stands for both remainder variants.
    pub fn is_merged(&self) -> bool {
        self.variants.len() > 1
    }
}

/// Build the catalog lines for a group.
///
/// Priced variants get one line each in definition order. If both remainder roles
/// are filled with equal schedules, they share a single line labelled
/// `"<first> & <second>"`, listed first.
pub fn catalog_lines(group: &VariantGroup) -> Vec<CatalogLine<'_>> {
    let mut lines = Vec::with_capacity(group.len());
    let mut merged: SmallVec<[VariantKey; 2]> = SmallVec::new();

    let remainders = group.remainder_variants();

    if let &[(first_key, first), (second_key, second)] = remainders.as_slice()
        && first.is_priced()
        && first.schedule == second.schedule
    {
        merged = smallvec![first_key, second_key];

        lines.push(CatalogLine {
            label: format!("{} & {}", first.name, second.name),
            variants: merged.clone(),
            schedule: &first.schedule,
        });
    }

    lines.extend(
        group
            .iter()
            .filter(|(key, variant)| variant.is_priced() && !merged.contains(key))
            .map(|(key, variant)| CatalogLine {
                label: variant.name.clone(),
                variants: smallvec![key],
                schedule: &variant.schedule,
            }),
    );

    lines
}

/// Saving of a tier's unit price against the first tier, as a fraction.
pub fn tier_saving(schedule: &PriceSchedule, price_break: &PriceBreak) -> Percentage {
    let Some(base) = schedule.breaks().first().map(PriceBreak::price) else {
        return Percentage::from(Decimal::ZERO);
    };

    if base.is_zero() {
        return Percentage::from(Decimal::ZERO);
    }

    Percentage::from((base - price_break.price()) / base)
}

/// Writes a price table for every catalog line of a group.
///
/// # Errors
///
/// Returns a [`CatalogError::Io`] if writing fails.
pub fn write_price_tables(
    mut out: impl io::Write,
    group: &VariantGroup,
) -> Result<(), CatalogError> {
    for line in catalog_lines(group) {
        writeln!(out, "\n{}", line.label())?;
        writeln!(out, "{}", price_table(&line, group.currency()))?;
    }

    Ok(())
}

fn price_table(line: &CatalogLine<'_>, currency: &Currency) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Quantity", "Unit Price", "Saving"]);

    for price_break in line.schedule().breaks() {
        let saving = percent_points(tier_saving(line.schedule(), price_break));

        builder.push_record([
            format!("{}+", price_break.quantity()),
            format_unit_price(price_break.price(), currency),
            if saving.is_zero() {
                String::new()
            } else {
                format!("{}%", saving.normalize())
            },
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(0..3), Alignment::right());

    table.to_string()
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}
