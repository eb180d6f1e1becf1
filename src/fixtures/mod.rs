//! Fixtures

use std::{fs, path::PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::{
    cart::Availability,
    facets::{FacetError, ProductFacets},
    fixtures::catalog::CatalogDocument,
    inventory::InventoryRecord,
    price_breaks::PriceScheduleError,
    variants::{Variant, VariantGroup, VariantGroupError},
};

pub mod catalog;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Break quantity does not fit the unit counter
    #[error("Invalid break quantity: {0}")]
    InvalidQuantity(i64),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid price schedule
    #[error(transparent)]
    PriceSchedule(#[from] PriceScheduleError),

    /// Invalid variant group
    #[error(transparent)]
    VariantGroup(#[from] VariantGroupError),

    /// Invalid facets
    #[error(transparent)]
    Facets(#[from] FacetError),
}

/// A parent product with its variants, attributes and stock.
#[derive(Debug, Clone)]
pub struct CatalogFixture {
    /// Parent product display name
    pub name: String,

    /// Variants and their pricing
    pub group: VariantGroup,

    /// Parent product attributes
    pub facets: ProductFacets,

    /// Stock per inventory location
    pub inventory_records: Vec<InventoryRecord>,

    /// Units available across all locations, if known
    pub quantity_available: Option<u32>,
}

impl CatalogFixture {
    /// Build a catalog from a YAML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or describes an invalid
    /// variant group.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let document: CatalogDocument = serde_norway::from_str(contents)?;

        document.try_into()
    }

    /// Stock as seen by the add to cart gate.
    pub fn availability(&self) -> Availability {
        Availability::from_records(self.quantity_available, &self.inventory_records)
    }
}

impl TryFrom<CatalogDocument> for CatalogFixture {
    type Error = FixtureError;

    fn try_from(document: CatalogDocument) -> Result<Self, Self::Error> {
        let currency = document.currency()?;
        let roles = document.roles()?;

        let mut group = VariantGroup::with_roles(document.parent.id, currency, roles);

        for variant_fixture in document.variants {
            group.push(Variant::try_from(variant_fixture)?)?;
        }

        let facets = ProductFacets::from_raw(document.facets)?;

        debug!(
            parent_id = group.parent_id(),
            variants = group.len(),
            "loaded catalog"
        );

        Ok(Self {
            name: document.parent.name,
            group,
            facets,
            inventory_records: document.inventory_records,
            quantity_available: document.quantity_available,
        })
    }
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Fixture {
    /// Create a new fixture loader with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new fixture loader with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a catalog from `<base>/catalogs/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it describes an
    /// invalid variant group.
    pub fn load_catalog(&self, name: &str) -> Result<CatalogFixture, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        CatalogFixture::from_yaml(&contents)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
