//! Inventory

use serde::Deserialize;

/// Stock held at one location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryRecord {
    /// Inventory record id
    pub id: String,

    /// Units available at this location
    pub quantity_available: u32,
}

impl InventoryRecord {
    /// Creates a new inventory record
    pub fn new(id: impl Into<String>, quantity_available: u32) -> Self {
        Self {
            id: id.into(),
            quantity_available,
        }
    }

    /// Check if any units are available at this location.
    pub fn is_available(&self) -> bool {
        self.quantity_available > 0
    }
}

/// The record an order is drawn from by default: the first with stock.
pub fn first_available(records: &[InventoryRecord]) -> Option<&InventoryRecord> {
    records.iter().find(|record| record.is_available())
}

/// Check if a product is out of stock.
///
/// Unknown availability (`None`) is not treated as out of stock.
pub fn is_out_of_stock(quantity_available: Option<u32>) -> bool {
    quantity_available == Some(0)
}
