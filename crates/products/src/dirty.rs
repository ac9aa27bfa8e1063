//! Dirty-state tracking: has the live configuration diverged from what was
//! loaded (edit mode) or from a blank form (create mode)?

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::configuration::{DEFAULT_LOW_STOCK_THRESHOLD, ProductConfiguration};
use crate::images::primary_image_url;
use crate::variants::{VariantOption, VariantRow};

/// Immutable snapshot of a configuration taken once hydration completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    snapshot: ProductConfiguration,
    captured_at: DateTime<Utc>,
}

impl Baseline {
    pub fn capture(config: &ProductConfiguration) -> Self {
        Self {
            snapshot: config.clone(),
            captured_at: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> &ProductConfiguration {
        &self.snapshot
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Whether the configuration has unsaved changes.
///
/// Without a baseline (create mode) the form is dirty once anything was
/// entered; with one, once any tracked field differs.
pub fn compute_dirty(config: &ProductConfiguration, baseline: Option<&Baseline>) -> bool {
    match baseline {
        Some(baseline) => !changed_fields(config, baseline).is_empty(),
        None => has_create_mode_input(config),
    }
}

fn has_create_mode_input(config: &ProductConfiguration) -> bool {
    let inventory = &config.inventory;

    !config.name.is_blank()
        || !config.description.is_blank()
        || !config.sku.trim().is_empty()
        || !config.barcode.trim().is_empty()
        || config.price.is_some()
        || config.compare_at_price.is_some()
        || !config.category_ids.is_empty()
        || !config.pending_images.is_empty()
        || inventory.stock_quantity.is_some_and(|q| q != 0)
        || inventory.low_stock_threshold != DEFAULT_LOW_STOCK_THRESHOLD
        || inventory.allow_backorders
}

fn same_options(a: &[VariantOption], b: &[VariantOption]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.name == y.name && x.values == y.values)
}

fn same_rows(a: &[VariantRow], b: &[VariantRow]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
}

fn sorted<T: Ord + Clone>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort();
    items
}

/// Names of the tracked fields that differ from the baseline.
///
/// Set-valued fields compare without regard to order, and variant rows and
/// options compare by content rather than by their generated ids. Pending
/// uploads or deletions always count as a change.
pub fn changed_fields(config: &ProductConfiguration, baseline: &Baseline) -> BTreeSet<&'static str> {
    let base = baseline.snapshot();
    let mut changed = BTreeSet::new();

    let mut check = |field: &'static str, differs: bool| {
        if differs {
            changed.insert(field);
        }
    };

    check("name", config.name != base.name);
    check("description", config.description != base.description);
    check("product_type", config.product_type != base.product_type);
    check("selling_method", config.selling_method != base.selling_method);
    check("selling_unit", config.selling_unit != base.selling_unit);
    check("fulfillment_types", config.fulfillment_types != base.fulfillment_types);
    check("sales_channels", config.sales_channels != base.sales_channels);
    check("requires_scheduling", config.requires_scheduling != base.requires_scheduling);
    check("subscription_interval", config.subscription_interval != base.subscription_interval);

    check("price", config.price != base.price);
    check("compare_at_price", config.compare_at_price != base.compare_at_price);
    check("discount_type", config.discount_type != base.discount_type);
    check("discount_value", config.discount_value != base.discount_value);
    check("discount_schedule", config.discount_schedule != base.discount_schedule);

    check("sku", config.sku != base.sku);
    check("barcode", config.barcode != base.barcode);
    check("barcode_type", config.barcode_type != base.barcode_type);
    check("inventory", config.inventory != base.inventory);

    check("category_ids", sorted(&config.category_ids) != sorted(&base.category_ids));
    check("brand_id", config.brand_id != base.brand_id);

    check("has_variants", config.has_variants != base.has_variants);
    check("variant_options", !same_options(&config.variant_options, &base.variant_options));
    check("variants", !same_rows(&config.variants, &base.variants));
    check("bundle_items", config.bundle_items != base.bundle_items);

    check("primary_image", primary_image_url(config) != primary_image_url(base));
    check("pending_images", !config.pending_images.is_empty());
    check("pending_deletion_ids", !config.pending_deletion_ids.is_empty());

    changed
}
