//! Cart
//!
//! Gate for the "add to cart" action. A resolution is only turned into cart lines
//! when it is fully allocated and the stock rules allow it; every other state is
//! reported as a [`CartBlock`] so the action can be disabled.

use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    config::StorefrontConfig,
    inventory::{InventoryRecord, first_available, is_out_of_stock},
    resolver::Resolution,
};

/// Reasons the add to cart action is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartBlock {
    /// Nothing was requested.
    #[error("enter a quantity")]
    NoQuantity,

    /// Pricing data is missing.
    #[error("no matching variant could be determined")]
    Unresolvable,

    /// Leftover units cannot be packaged.
    #[error("only {covered} of {requested} units can be fulfilled")]
    Infeasible {
        /// Requested quantity
        requested: u32,
        /// Units that could be allocated
        covered: u32,
    },

    /// The shopper has to pick a remainder packaging (leftover units).
    #[error("choose packaging for the remaining {0} units")]
    AwaitingRemainderChoice(u32),

    /// The product has no stock.
    #[error("product is out of stock")]
    OutOfStock,

    /// Multi-location inventory is on and no location has stock.
    #[error("select a location with available inventory")]
    NoInventoryRecord,
}

/// Stock known for the product being ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    /// Units available across all locations, if known
    pub quantity_available: Option<u32>,

    /// Inventory record orders are drawn from
    pub active_record: Option<String>,
}

impl Availability {
    /// Availability with the first stocked location as the active record.
    pub fn from_records(quantity_available: Option<u32>, records: &[InventoryRecord]) -> Self {
        Self {
            quantity_available,
            active_record: first_available(records).map(|record| record.id.clone()),
        }
    }
}

/// A line to add to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineRequest {
    /// Variant (child product) id
    pub product_id: String,

    /// Units to add
    pub quantity: u32,

    /// Inventory location to draw from
    pub inventory_record_id: Option<String>,
}

/// Lines to submit for one add to cart action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSubmission {
    /// One line per allocated variant
    pub lines: SmallVec<[CartLineRequest; 2]>,

    /// Ask the cart to apply eligible promotions afterwards
    pub apply_promotions: bool,
}

impl CartSubmission {
    /// Total units across all lines.
    pub fn quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Confirmation shown once the lines were added.
    pub fn confirmation(&self) -> String {
        match self.quantity() {
            1 => "1 item added to cart".to_string(),
            quantity => format!("{quantity} items added to cart"),
        }
    }
}

/// Add to cart gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddToCart {
    multi_location_inventory: bool,
    auto_apply_promotions: bool,
}

impl AddToCart {
    /// Create a gate from storefront settings.
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            multi_location_inventory: config.multi_location_inventory,
            auto_apply_promotions: config.auto_apply_promotions,
        }
    }

    /// Turn a resolution into cart lines, or explain why it cannot be added.
    ///
    /// # Errors
    ///
    /// Returns the [`CartBlock`] that keeps the action disabled.
    pub fn evaluate(
        &self,
        resolution: &Resolution,
        availability: &Availability,
    ) -> Result<CartSubmission, CartBlock> {
        let result = self.submission(resolution, availability);

        if let Err(block) = &result {
            debug!(reason = %block, "add to cart blocked");
        }

        result
    }

    fn submission(
        &self,
        resolution: &Resolution,
        availability: &Availability,
    ) -> Result<CartSubmission, CartBlock> {
        if is_out_of_stock(availability.quantity_available) {
            return Err(CartBlock::OutOfStock);
        }

        let allocation = match resolution {
            Resolution::Allocated(allocation) => allocation,
            Resolution::Empty => return Err(CartBlock::NoQuantity),
            Resolution::Unresolvable => return Err(CartBlock::Unresolvable),
            Resolution::Infeasible(shortfall) => {
                return Err(CartBlock::Infeasible {
                    requested: shortfall.requested,
                    covered: shortfall.covered,
                });
            }
            Resolution::AwaitingRemainderChoice(prompt) => {
                return Err(CartBlock::AwaitingRemainderChoice(prompt.leftover));
            }
        };

        let inventory_record_id = if self.multi_location_inventory {
            Some(
                availability
                    .active_record
                    .clone()
                    .ok_or(CartBlock::NoInventoryRecord)?,
            )
        } else {
            None
        };

        let lines = allocation
            .parts()
            .iter()
            .map(|part| CartLineRequest {
                product_id: part.variant_id.clone(),
                quantity: part.quantity,
                inventory_record_id: inventory_record_id.clone(),
            })
            .collect();

        Ok(CartSubmission {
            lines,
            apply_promotions: self.auto_apply_promotions,
        })
    }
}
