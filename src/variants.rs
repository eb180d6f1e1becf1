//! Variants

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use thiserror::Error;

use crate::price_breaks::PriceSchedule;

new_key_type! {
    /// Variant Key
    pub struct VariantKey;
}

/// Schedule name of the cut tape remainder packaging.
pub const CUT_TAPE: &str = "Cut Tape (CT)";

/// Schedule name of the reeled remainder packaging.
pub const DIGI_REEL: &str = "Digi-Reel®";

/// Errors related to variant group construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariantGroupError {
    /// Two variants in the group share an id.
    #[error("duplicate variant id: {0}")]
    DuplicateVariantId(String),

    /// More than two remainder roles were configured.
    #[error("at most two remainder roles are supported, got {0}")]
    TooManyRemainderRoles(usize),

    /// The same remainder role was configured twice.
    #[error("remainder role {0} configured more than once")]
    DuplicateRemainderRole(String),

    /// A second variant claimed a remainder role that is already filled.
    #[error("remainder role {0} is already filled")]
    RemainderRoleTaken(String),
}

/// Ordered schedule names that mark a variant as a remainder variant.
///
/// Position in this list is the default priority used when the shopper has not
/// chosen between two eligible remainder variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainderRoles {
    names: SmallVec<[String; 2]>,
}

impl RemainderRoles {
    /// Create remainder roles from schedule names, highest priority first.
    ///
    /// # Errors
    ///
    /// - [`VariantGroupError::TooManyRemainderRoles`]: more than two names given.
    /// - [`VariantGroupError::DuplicateRemainderRole`]: a name was given twice.
    pub fn new<S: Into<String>>(
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, VariantGroupError> {
        let names: SmallVec<[String; 2]> = names.into_iter().map(Into::into).collect();

        if names.len() > 2 {
            return Err(VariantGroupError::TooManyRemainderRoles(names.len()));
        }

        if let [first, second] = names.as_slice()
            && first == second
        {
            return Err(VariantGroupError::DuplicateRemainderRole(first.clone()));
        }

        Ok(Self { names })
    }

    /// Roles that never match, so every priced variant is standard.
    pub fn none() -> Self {
        Self {
            names: SmallVec::new(),
        }
    }

    /// Role names, highest priority first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Priority of a schedule name, `None` if it is not a remainder role.
    pub fn priority(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|role| role == name)
    }
}

impl Default for RemainderRoles {
    fn default() -> Self {
        Self {
            names: SmallVec::from_iter([CUT_TAPE.to_string(), DIGI_REEL.to_string()]),
        }
    }
}

/// Role a variant plays during allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantRole {
    /// Bulk packaging, covered greedily by its own break quantities.
    Standard,

    /// Interchangeable packaging that absorbs left over units.
    Remainder,
}

/// One purchasable configuration of a parent product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Variant (child product) id
    pub id: String,

    /// Price schedule name, e.g. "Cut Tape (CT)"
    pub name: String,

    /// Tiered pricing
    pub schedule: PriceSchedule,
}

impl Variant {
    /// Creates a new variant
    pub fn new(id: impl Into<String>, name: impl Into<String>, schedule: PriceSchedule) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schedule,
        }
    }

    /// Check if the variant can be bought at all.
    pub fn is_priced(&self) -> bool {
        !self.schedule.is_empty()
    }
}

/// All variants of one parent product.
#[derive(Debug, Clone)]
pub struct VariantGroup {
    parent_id: String,
    currency: &'static Currency,
    roles: RemainderRoles,
    variants: SlotMap<VariantKey, Variant>,
    order: SmallVec<[VariantKey; 8]>,
    ids: FxHashMap<String, VariantKey>,
}

impl VariantGroup {
    /// Create an empty group using the default remainder roles.
    pub fn new(parent_id: impl Into<String>, currency: &'static Currency) -> Self {
        Self::with_roles(parent_id, currency, RemainderRoles::default())
    }

    /// Create an empty group with custom remainder roles.
    pub fn with_roles(
        parent_id: impl Into<String>,
        currency: &'static Currency,
        roles: RemainderRoles,
    ) -> Self {
        Self {
            parent_id: parent_id.into(),
            currency,
            roles,
            variants: SlotMap::with_key(),
            order: SmallVec::new(),
            ids: FxHashMap::default(),
        }
    }

    /// Add a variant to the end of the group.
    ///
    /// # Errors
    ///
    /// - [`VariantGroupError::DuplicateVariantId`]: the id is already in the group.
    /// - [`VariantGroupError::RemainderRoleTaken`]: another variant already fills the
    ///   remainder role matching this variant's name.
    pub fn push(&mut self, variant: Variant) -> Result<VariantKey, VariantGroupError> {
        if self.ids.contains_key(&variant.id) {
            return Err(VariantGroupError::DuplicateVariantId(variant.id));
        }

        if self.roles.priority(&variant.name).is_some()
            && self.iter().any(|(_key, existing)| existing.name == variant.name)
        {
            return Err(VariantGroupError::RemainderRoleTaken(variant.name));
        }

        let id = variant.id.clone();
        let key = self.variants.insert(variant);

        self.order.push(key);
        self.ids.insert(id, key);

        Ok(key)
    }

    /// Get a variant by key.
    pub fn get(&self, key: VariantKey) -> Option<&Variant> {
        self.variants.get(key)
    }

    /// Find a variant by its id.
    pub fn by_id(&self, id: &str) -> Option<(VariantKey, &Variant)> {
        let key = *self.ids.get(id)?;

        self.variants.get(key).map(|variant| (key, variant))
    }

    /// Iterate over variants in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (VariantKey, &Variant)> {
        self.order
            .iter()
            .filter_map(|key| self.variants.get(*key).map(|variant| (*key, variant)))
    }

    /// Role of a variant within this group.
    pub fn role(&self, variant: &Variant) -> VariantRole {
        if self.roles.priority(&variant.name).is_some() {
            VariantRole::Remainder
        } else {
            VariantRole::Standard
        }
    }

    /// Remainder variants, highest priority first.
    pub fn remainder_variants(&self) -> SmallVec<[(VariantKey, &Variant); 2]> {
        let mut remainders: SmallVec<[(usize, VariantKey, &Variant); 2]> = self
            .iter()
            .filter_map(|(key, variant)| {
                self.roles
                    .priority(&variant.name)
                    .map(|priority| (priority, key, variant))
            })
            .collect();

        remainders.sort_by_key(|(priority, _key, _variant)| *priority);

        remainders
            .into_iter()
            .map(|(_priority, key, variant)| (key, variant))
            .collect()
    }

    /// Priced standard variants in definition order.
    pub fn standard_variants(&self) -> impl Iterator<Item = (VariantKey, &Variant)> {
        self.iter().filter(|(_key, variant)| {
            variant.is_priced() && self.role(variant) == VariantRole::Standard
        })
    }

    /// Check if any variant in the group carries pricing.
    pub fn has_pricing(&self) -> bool {
        self.iter().any(|(_key, variant)| variant.is_priced())
    }

    /// Parent product id
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Currency all prices in the group are quoted in
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Remainder roles used to classify variants
    pub fn roles(&self) -> &RemainderRoles {
        &self.roles
    }

    /// Number of variants in the group.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
