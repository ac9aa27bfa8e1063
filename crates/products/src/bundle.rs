//! Bundle composition: the constituent products of a bundle, their
//! quantities, whether each is required, and ordered substitutes.

use serde::{Deserialize, Serialize};

use storefront_core::entity::position_of;
use storefront_core::{DomainError, DomainResult, Entity, ProductId};

use crate::configuration::{ProductConfiguration, ProductType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitute {
    pub substitute_product_id: ProductId,
    /// 1 is tried first.
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleItem {
    pub product_id: ProductId,
    /// At least 1.
    pub quantity: u32,
    pub is_required: bool,
    pub sort_order: u32,
    pub substitutes: Vec<Substitute>,
}

impl Entity for BundleItem {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}

/// A product picked by the merchant for inclusion, with its type as reported
/// by the product lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleCandidate {
    pub product_id: ProductId,
    pub product_type: ProductType,
}

impl BundleCandidate {
    pub fn new(product_id: impl Into<ProductId>, product_type: ProductType) -> Self {
        Self {
            product_id: product_id.into(),
            product_type,
        }
    }
}

fn check_candidate(config: &ProductConfiguration, candidate: &BundleCandidate) -> DomainResult<()> {
    if candidate.product_type == ProductType::Bundle {
        return Err(DomainError::rejected("bundles cannot contain other bundles"));
    }
    if config.product_id.as_ref() == Some(&candidate.product_id) {
        return Err(DomainError::rejected("a bundle cannot contain itself"));
    }
    Ok(())
}

fn renumber(items: &mut [BundleItem]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.sort_order = index as u32;
    }
}

fn item_index(config: &ProductConfiguration, product_id: &ProductId) -> DomainResult<usize> {
    position_of(&config.bundle_items, product_id).ok_or_else(DomainError::not_found)
}

/// Append a product to the bundle (quantity 1, required).
pub fn add_item(config: &mut ProductConfiguration, candidate: &BundleCandidate) -> DomainResult<()> {
    check_candidate(config, candidate)?;
    if position_of(&config.bundle_items, &candidate.product_id).is_some() {
        return Err(DomainError::rejected("product is already in the bundle"));
    }

    config.bundle_items.push(BundleItem {
        product_id: candidate.product_id.clone(),
        quantity: 1,
        is_required: true,
        sort_order: config.bundle_items.len() as u32,
        substitutes: Vec::new(),
    });
    Ok(())
}

pub fn remove_item(config: &mut ProductConfiguration, product_id: &ProductId) -> DomainResult<()> {
    let index = item_index(config, product_id)?;
    config.bundle_items.remove(index);
    renumber(&mut config.bundle_items);
    Ok(())
}

/// Adjust the quantity by `delta`, never going below 1. Returns the new quantity.
pub fn set_quantity(config: &mut ProductConfiguration, product_id: &ProductId, delta: i64) -> DomainResult<u32> {
    let index = item_index(config, product_id)?;
    let item = &mut config.bundle_items[index];
    let next = (i64::from(item.quantity) + delta).clamp(1, i64::from(u32::MAX));
    item.quantity = next as u32;
    Ok(item.quantity)
}

/// Flip the required flag. Returns the new value.
pub fn toggle_required(config: &mut ProductConfiguration, product_id: &ProductId) -> DomainResult<bool> {
    let index = item_index(config, product_id)?;
    let item = &mut config.bundle_items[index];
    item.is_required = !item.is_required;
    Ok(item.is_required)
}

/// Move an item to `to` (clamped to the list), re-numbering sort order.
pub fn move_item(config: &mut ProductConfiguration, product_id: &ProductId, to: usize) -> DomainResult<()> {
    let from = item_index(config, product_id)?;
    let item = config.bundle_items.remove(from);
    let to = to.min(config.bundle_items.len());
    config.bundle_items.insert(to, item);
    renumber(&mut config.bundle_items);
    Ok(())
}

/// Add a substitute for an item at the lowest priority.
pub fn add_substitute(
    config: &mut ProductConfiguration,
    product_id: &ProductId,
    substitute: &BundleCandidate,
) -> DomainResult<()> {
    check_candidate(config, substitute)?;
    if &substitute.product_id == product_id {
        return Err(DomainError::rejected("an item cannot substitute for itself"));
    }

    let index = item_index(config, product_id)?;
    let item = &mut config.bundle_items[index];
    if item
        .substitutes
        .iter()
        .any(|s| s.substitute_product_id == substitute.product_id)
    {
        return Err(DomainError::rejected("substitute is already listed"));
    }

    let priority = item.substitutes.len() as u32 + 1;
    item.substitutes.push(Substitute {
        substitute_product_id: substitute.product_id.clone(),
        priority,
    });
    Ok(())
}

pub fn remove_substitute(
    config: &mut ProductConfiguration,
    product_id: &ProductId,
    substitute_id: &ProductId,
) -> DomainResult<()> {
    let index = item_index(config, product_id)?;
    let item = &mut config.bundle_items[index];
    let before = item.substitutes.len();
    item.substitutes
        .retain(|s| &s.substitute_product_id != substitute_id);
    if item.substitutes.len() == before {
        return Err(DomainError::not_found());
    }
    for (rank, substitute) in item.substitutes.iter_mut().enumerate() {
        substitute.priority = rank as u32 + 1;
    }
    Ok(())
}

/// Total number of units across all items.
pub fn unit_count(config: &ProductConfiguration) -> u64 {
    config.bundle_items.iter().map(|i| u64::from(i.quantity)).sum()
}

/// Structural problems with the item list.
pub fn violations(config: &ProductConfiguration) -> Vec<String> {
    let mut found = Vec::new();
    for (index, item) in config.bundle_items.iter().enumerate() {
        if config.bundle_items[..index]
            .iter()
            .any(|other| other.product_id == item.product_id)
        {
            found.push(format!("product {} is listed more than once", item.product_id));
        }
        if item.quantity < 1 {
            found.push(format!("product {} needs a quantity of at least 1", item.product_id));
        }
        if config.product_id.as_ref() == Some(&item.product_id) {
            found.push("a bundle cannot contain itself".to_string());
        }
    }
    found
}
