//! Allot prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    breakdown::{BreakdownError, write_allocation, write_resolution},
    cart::{AddToCart, Availability, CartBlock, CartLineRequest, CartSubmission},
    catalog::{CatalogError, CatalogLine, catalog_lines, write_price_tables},
    config::{AllotConfig, LogFormat, LoggingConfig, StorefrontConfig},
    facets::{FacetError, FacetSelection, ProductFacets},
    fixtures::{CatalogFixture, Fixture, FixtureError},
    inventory::{InventoryRecord, first_available, is_out_of_stock},
    price_breaks::{PriceBreak, PriceSchedule, PriceScheduleError},
    pricing::{PricingError, price_quantity},
    resolver::{
        Allocation, AllocationPart, RemainderPolicy, ResolveError, ResolveOptions, Resolution,
        Selection, resolve,
    },
    variants::{RemainderRoles, Variant, VariantGroup, VariantGroupError, VariantKey, VariantRole},
};
