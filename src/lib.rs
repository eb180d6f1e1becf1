//! Allot
//!
//! Allot resolves a requested quantity of a parent product across its packaging variants, prices
//! the result against each variant's tiered price breaks and decides whether it can be added to
//! the cart.

pub mod breakdown;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod facets;
pub mod fixtures;
pub mod inventory;
pub mod observability;
pub mod prelude;
pub mod price_breaks;
pub mod pricing;
pub mod resolver;
pub mod variants;
