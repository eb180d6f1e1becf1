//! Breakdown
//!
//! Order breakdown shown under the quantity input: one row per allocated variant
//! followed by the total, or a message explaining why nothing can be ordered.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    pricing::format_unit_price,
    resolver::{Allocation, AllocationPart, RemainderPick, Resolution},
    variants::VariantRole,
};

/// Errors that can occur when writing a breakdown.
#[derive(Debug, Error)]
pub enum BreakdownError {
    /// Writing to the output failed.
    #[error("failed to write breakdown: {0}")]
    Io(#[from] io::Error),
}

/// Writes the breakdown for any resolution.
///
/// # Errors
///
/// Returns a [`BreakdownError::Io`] if writing fails.
pub fn write_resolution(
    mut out: impl io::Write,
    resolution: &Resolution,
) -> Result<(), BreakdownError> {
    match resolution {
        Resolution::Allocated(allocation) => write_allocation(out, allocation),
        Resolution::Empty => {
            writeln!(out, "Enter a quantity to see pricing.")?;
            Ok(())
        }
        Resolution::Unresolvable => {
            writeln!(out, "No matching variant could be determined.")?;
            Ok(())
        }
        Resolution::Infeasible(shortfall) => {
            writeln!(
                out,
                "Only {} of {} units can be fulfilled; {} left over with no packaging to absorb them.",
                shortfall.covered, shortfall.requested, shortfall.leftover
            )?;
            Ok(())
        }
        Resolution::AwaitingRemainderChoice(prompt) => {
            writeln!(
                out,
                "Choose packaging for the remaining {} units:",
                prompt.leftover
            )?;

            for candidate in &prompt.candidates {
                writeln!(out, "  - {} ({})", candidate.name, candidate.variant_id)?;
            }

            Ok(())
        }
    }
}

/// Writes the breakdown table of an allocation.
///
/// # Errors
///
/// Returns a [`BreakdownError::Io`] if writing fails.
pub fn write_allocation(
    mut out: impl io::Write,
    allocation: &Allocation,
) -> Result<(), BreakdownError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Variant", "Quantity", "Unit Price", "Subtotal"]);

    for (idx, part) in allocation.parts().iter().enumerate() {
        builder.push_record(part_row(idx, part));
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "\n{table}")?;
    writeln!(out, " Total: {}", allocation.total())?;

    if let Some(note) = remainder_note(allocation.remainder_pick()) {
        writeln!(out, " {note}")?;
    }

    Ok(())
}

fn part_row(idx: usize, part: &AllocationPart) -> [String; 5] {
    let name = match part.role {
        VariantRole::Standard => part.name.clone(),
        VariantRole::Remainder => format!("{} (remainder)", part.name),
    };

    [
        format!("#{:<3}", idx + 1),
        name,
        part.quantity.to_string(),
        format_unit_price(part.unit_price, part.subtotal.currency()),
        part.subtotal.to_string(),
    ]
}

fn remainder_note(pick: Option<RemainderPick>) -> Option<&'static str> {
    match pick? {
        RemainderPick::Defaulted => Some("Remaining units use the default packaging."),
        RemainderPick::Chosen | RemainderPick::OnlyOption => None,
    }
}
