//! Integration tests for the catalog fixtures shipped in `fixtures/catalogs`.
//!
//! `reel` is a resistor sold on full reels (`Tape & Reel (TR)`) with identically
//! priced `Cut Tape (CT)` and `Digi-Reel®` remainders. `capacitor` has only the two
//! remainder packagings, priced differently and out of stock. `connector` has two
//! standard packagings and nothing to absorb left over units.

use rust_decimal::dec;
use rusty_money::{
    Money,
    iso::{EUR, GBP, USD},
};
use testresult::TestResult;

use allot::{
    cart::{AddToCart, CartBlock},
    catalog::catalog_lines,
    config::StorefrontConfig,
    fixtures::Fixture,
    resolver::{Allocation, RemainderPick, RemainderPolicy, Resolution, ResolveOptions, resolve},
};

#[test]
fn reel_splits_bulk_and_remainder() -> TestResult {
    let catalog = Fixture::new().load_catalog("reel")?;

    let resolution = resolve(12345, &catalog.group, None, ResolveOptions::default())?;
    let allocation = resolution.allocation().ok_or("expected an allocation")?;

    // 10,000 on reel at the 10,000 break, 2,345 on cut tape at the 1,000 break
    let [reel, cut_tape] = allocation.parts() else {
        return Err("expected two parts".into());
    };

    assert_eq!(reel.variant_id, "RC0603FR-0710KL-TR");
    assert_eq!(reel.quantity, 10000);
    assert_eq!(reel.unit_price, dec!(0.00190));
    assert_eq!(reel.subtotal, Money::from_decimal(dec!(19.00), USD));

    assert_eq!(cut_tape.variant_id, "RC0603FR-0710KL-CT");
    assert_eq!(cut_tape.quantity, 2345);
    assert_eq!(cut_tape.break_quantity, 1000);
    assert_eq!(cut_tape.subtotal, Money::from_decimal(dec!(9.08), USD));

    assert_eq!(allocation.total(), Money::from_decimal(dec!(28.08), USD));
    assert_eq!(allocation.remainder_pick(), Some(RemainderPick::Defaulted));

    Ok(())
}

#[test]
fn reel_exact_break_takes_whole_order() -> TestResult {
    let catalog = Fixture::new().load_catalog("reel")?;

    let resolution = resolve(25000, &catalog.group, None, ResolveOptions::default())?;
    let allocation = resolution.allocation().ok_or("expected an allocation")?;

    assert!(!allocation.is_split());
    assert_eq!(allocation.total(), Money::from_decimal(dec!(42.50), USD));

    Ok(())
}

#[test]
fn reel_remainders_share_one_catalog_line() -> TestResult {
    let catalog = Fixture::new().load_catalog("reel")?;

    let labels: Vec<String> = catalog_lines(&catalog.group)
        .iter()
        .map(|line| line.label().to_string())
        .collect();

    assert_eq!(
        labels,
        vec![
            "Cut Tape (CT) & Digi-Reel®".to_string(),
            "Tape & Reel (TR)".to_string(),
        ]
    );

    Ok(())
}

#[test]
fn reel_multi_location_order_uses_stocked_warehouse() -> TestResult {
    let catalog = Fixture::new().load_catalog("reel")?;
    let config = StorefrontConfig {
        multi_location_inventory: true,
        ..StorefrontConfig::default()
    };

    let resolution = resolve(
        12345,
        &catalog.group,
        Some("RC0603FR-0710KL-DR"),
        config.resolve_options(),
    )?;
    let submission = AddToCart::new(&config).evaluate(&resolution, &catalog.availability())?;

    assert_eq!(submission.lines.len(), 2);
    assert!(
        submission
            .lines
            .iter()
            .all(|line| line.inventory_record_id.as_deref() == Some("WH-WEST"))
    );
    assert_eq!(
        submission
            .lines
            .last()
            .map(|line| line.product_id.as_str()),
        Some("RC0603FR-0710KL-DR")
    );

    Ok(())
}

#[test]
fn capacitor_remainder_choice_policies() -> TestResult {
    let catalog = Fixture::new().load_catalog("capacitor")?;

    let defaulted = resolve(5, &catalog.group, None, ResolveOptions::default())?;
    let allocation = defaulted.allocation().ok_or("expected an allocation")?;

    assert_eq!(
        allocation.parts().first().map(|part| part.variant_id.as_str()),
        Some("CL10A106KP8NNNC-CT")
    );
    assert_eq!(allocation.total(), Money::from_decimal(dec!(1.25), EUR));

    let awaiting = resolve(
        5,
        &catalog.group,
        None,
        ResolveOptions {
            remainder_policy: RemainderPolicy::RequireChoice,
        },
    )?;

    let Resolution::AwaitingRemainderChoice(prompt) = awaiting else {
        return Err("expected a remainder prompt".into());
    };

    assert_eq!(prompt.leftover, 5);
    assert_eq!(prompt.candidates.len(), 2);

    Ok(())
}

#[test]
fn capacitor_is_out_of_stock() -> TestResult {
    let catalog = Fixture::new().load_catalog("capacitor")?;

    let resolution = resolve(
        150,
        &catalog.group,
        Some("CL10A106KP8NNNC-DR"),
        ResolveOptions::default(),
    )?;

    // Digi-Reel® reaches its 100 break, cut tape would not
    assert_eq!(
        resolution.allocation().map(Allocation::total),
        Some(Money::from_decimal(dec!(13.50), EUR))
    );
    assert_eq!(
        AddToCart::default().evaluate(&resolution, &catalog.availability()),
        Err(CartBlock::OutOfStock)
    );

    Ok(())
}

#[test]
fn connector_prefers_best_standard_cover() -> TestResult {
    let catalog = Fixture::new().load_catalog("connector")?;

    let resolution = resolve(530, &catalog.group, None, ResolveOptions::default())?;
    let allocation = resolution.allocation().ok_or("expected an allocation")?;

    assert_eq!(
        allocation.parts().first().map(|part| part.variant_id.as_str()),
        Some("B2B-XH-A-BAG")
    );
    assert_eq!(allocation.total(), Money::from_decimal(dec!(47.70), GBP));

    Ok(())
}

#[test]
fn connector_leftover_is_infeasible() -> TestResult {
    let catalog = Fixture::new().load_catalog("connector")?;

    let resolution = resolve(537, &catalog.group, None, ResolveOptions::default())?;

    let Resolution::Infeasible(shortfall) = &resolution else {
        return Err("expected a shortfall".into());
    };

    assert_eq!(shortfall.covered, 530);
    assert_eq!(shortfall.leftover, 7);
    assert_eq!(
        AddToCart::default().evaluate(&resolution, &catalog.availability()),
        Err(CartBlock::Infeasible {
            requested: 537,
            covered: 530,
        })
    );

    Ok(())
}
