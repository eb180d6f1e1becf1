//! Facets
//!
//! Product attributes arrive from the catalog as loosely-typed maps where a value is
//! either a single string or a list. They are normalised here into attribute name
//! to ordered values before anything else sees them.

use std::collections::BTreeMap;

use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

/// Query parameter prefix for facet filters.
pub const FACET_PARAM_PREFIX: &str = "xp.Facets.";

/// Errors raised while validating product facets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FacetError {
    /// A facet had a blank name.
    #[error("facet name must not be empty")]
    EmptyName,

    /// A facet value was blank (facet name).
    #[error("facet {0} has an empty value")]
    EmptyValue(String),
}

/// Facet value as found in source data.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawFacetValue {
    /// A single value
    One(String),

    /// Several values
    Many(Vec<String>),
}

type FacetValues = SmallVec<[String; 4]>;

/// Validated attributes of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFacets {
    facets: BTreeMap<String, FacetValues>,
}

impl ProductFacets {
    /// Validate raw facets.
    ///
    /// Names and values are trimmed; repeated values within a facet are kept once.
    ///
    /// # Errors
    ///
    /// - [`FacetError::EmptyName`]: a facet name is blank.
    /// - [`FacetError::EmptyValue`]: a facet value is blank.
    pub fn from_raw(
        raw: impl IntoIterator<Item = (String, RawFacetValue)>,
    ) -> Result<Self, FacetError> {
        let mut facets = BTreeMap::new();

        for (name, value) in raw {
            let name = name.trim();

            if name.is_empty() {
                return Err(FacetError::EmptyName);
            }

            let raw_values = match value {
                RawFacetValue::One(value) => vec![value],
                RawFacetValue::Many(values) => values,
            };

            let mut values = FacetValues::new();

            for value in raw_values {
                let value = value.trim();

                if value.is_empty() {
                    return Err(FacetError::EmptyValue(name.to_string()));
                }

                if !values.iter().any(|existing| existing == value) {
                    values.push(value.to_string());
                }
            }

            facets.insert(name.to_string(), values);
        }

        Ok(Self { facets })
    }

    /// Values of a facet, empty if the product does not have it.
    pub fn values(&self, name: &str) -> &[String] {
        self.facets.get(name).map(SmallVec::as_slice).unwrap_or_default()
    }

    /// Iterate facets in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.facets
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Check if the product has no facets.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

/// Facet values the shopper has ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSelection {
    selected: BTreeMap<String, FacetValues>,
}

impl FacetSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick a value if it is not selected, untick it otherwise.
    ///
    /// Returns whether the value is selected afterwards.
    pub fn toggle(&mut self, name: &str, value: &str) -> bool {
        let values = self.selected.entry(name.to_string()).or_default();

        if let Some(idx) = values.iter().position(|existing| existing == value) {
            values.remove(idx);
            false
        } else {
            values.push(value.to_string());
            true
        }
    }

    /// Selected values of a facet, in the order they were ticked.
    pub fn values(&self, name: &str) -> &[String] {
        self.selected.get(name).map(SmallVec::as_slice).unwrap_or_default()
    }

    /// Check if any value is ticked.
    pub fn has_selection(&self) -> bool {
        self.selected.values().any(|values| !values.is_empty())
    }

    /// Untick everything.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Catalog query parameters for this selection.
    ///
    /// The catalog id comes first, followed by one `xp.Facets.<name>` parameter per
    /// facet with ticked values, joined with `", "`.
    pub fn query_params(&self, catalog_id: &str) -> Vec<(String, String)> {
        let mut params = vec![("catalogId".to_string(), catalog_id.to_string())];

        params.extend(
            self.selected
                .iter()
                .filter(|(_name, values)| !values.is_empty())
                .map(|(name, values)| (format!("{FACET_PARAM_PREFIX}{name}"), values.join(", "))),
        );

        params
    }

    /// Check if a product carries at least one ticked value of every ticked facet.
    pub fn matches(&self, facets: &ProductFacets) -> bool {
        self.selected
            .iter()
            .filter(|(_name, values)| !values.is_empty())
            .all(|(name, values)| {
                facets
                    .values(name)
                    .iter()
                    .any(|value| values.contains(value))
            })
    }
}
