//! Allot CLI
//!
//! Loads a catalog fixture, resolves the requested quantity across its variants and
//! prints the price tables, the order breakdown and whether it can be added to the
//! cart.

use std::{
    io::{self, Write},
    process,
};

use anyhow::Result;

use allot::{
    breakdown::write_resolution,
    cart::AddToCart,
    catalog::write_price_tables,
    config::AllotConfig,
    facets::FacetSelection,
    fixtures::Fixture,
    observability::init_subscriber,
    resolver::Selection,
};
use tracing::info;

/// Allot CLI entry point
pub fn main() {
    let config = AllotConfig::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        process::exit(1);
    }

    if let Err(error) = run(&config) {
        #[expect(clippy::print_stderr, reason = "CLI error output")]
        {
            eprintln!("Error: {error:#}");
        }

        process::exit(1);
    }
}

fn run(config: &AllotConfig) -> Result<()> {
    let catalog = Fixture::with_base_path(&config.fixture_dir).load_catalog(&config.fixture)?;

    info!(
        fixture = %config.fixture,
        parent_id = catalog.group.parent_id(),
        "catalog loaded"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{} ({})", catalog.name, catalog.group.parent_id())?;

    if !config.facets.is_empty() {
        let mut selection = FacetSelection::new();

        for (name, value) in &config.facets {
            selection.toggle(name, value);
        }

        let query = selection
            .query_params(&config.storefront.catalog_id)
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        writeln!(out, "Facet query: {query}")?;
        writeln!(
            out,
            "Matches selection: {}",
            if selection.matches(&catalog.facets) {
                "yes"
            } else {
                "no"
            }
        )?;
    }

    write_price_tables(&mut out, &catalog.group)?;

    let mut selection = Selection::new(config.quantity);

    if let Some(choice) = config.choice.as_deref() {
        selection = selection.with_remainder_choice(choice);
    }

    let resolution = selection.resolve(&catalog.group, config.storefront.resolve_options())?;

    write_resolution(&mut out, &resolution)?;

    match AddToCart::new(&config.storefront).evaluate(&resolution, &catalog.availability()) {
        Ok(submission) => {
            writeln!(out, "\nAdd to cart: ready")?;

            for line in &submission.lines {
                match line.inventory_record_id.as_deref() {
                    Some(record) => writeln!(
                        out,
                        "  {} x {} from {record}",
                        line.quantity, line.product_id
                    )?,
                    None => writeln!(out, "  {} x {}", line.quantity, line.product_id)?,
                }
            }

            if submission.apply_promotions {
                writeln!(out, "  promotions will be applied")?;
            }

            writeln!(out, "{}", submission.confirmation())?;
        }
        Err(block) => writeln!(out, "\nAdd to cart: unavailable ({block})")?,
    }

    Ok(())
}
