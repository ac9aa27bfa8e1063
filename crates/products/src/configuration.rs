//! The product configuration aggregate and its classification enums.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{BrandId, CategoryId, ImageId, ProductId};

use crate::bundle::BundleItem;
use crate::images::{PendingImage, PersistedImage};
use crate::variants::{VariantOption, VariantRow};

/// Low-stock threshold a fresh product starts with.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// What kind of thing is being sold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Physical,
    Digital,
    Service,
    Bundle,
}

impl ProductType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Physical => "physical",
            ProductType::Digital => "digital",
            ProductType::Service => "service",
            ProductType::Bundle => "bundle",
        }
    }
}

/// How quantities of the product are measured at checkout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellingMethod {
    #[default]
    Unit,
    Weight,
    Length,
    Time,
    Subscription,
}

impl SellingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SellingMethod::Unit => "unit",
            SellingMethod::Weight => "weight",
            SellingMethod::Length => "length",
            SellingMethod::Time => "time",
            SellingMethod::Subscription => "subscription",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentType {
    Pickup,
    Delivery,
    Digital,
    Onsite,
}

impl FulfillmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            FulfillmentType::Pickup => "pickup",
            FulfillmentType::Delivery => "delivery",
            FulfillmentType::Digital => "digital",
            FulfillmentType::Onsite => "onsite",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesChannel {
    Online,
    InStore,
}

impl SalesChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            SalesChannel::Online => "online",
            SalesChannel::InStore => "in_store",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[default]
    None,
    Percentage,
    FixedAmount,
}

impl DiscountType {
    pub fn is_active(self) -> bool {
        self != DiscountType::None
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeType {
    #[default]
    Ean13,
    UpcA,
    Code128,
}

impl BarcodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            BarcodeType::Ean13 => "ean13",
            BarcodeType::UpcA => "upc_a",
            BarcodeType::Code128 => "code128",
        }
    }
}

/// Text entered in English plus the store's second locale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub local: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            local: local.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.en.trim().is_empty() && self.local.trim().is_empty()
    }
}

/// Optional time window during which the discount applies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscountSchedule {
    pub enabled: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub track_inventory: bool,
    pub stock_quantity: Option<u32>,
    pub low_stock_threshold: u32,
    pub allow_backorders: bool,
    pub continue_selling_out_of_stock: bool,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            track_inventory: true,
            stock_quantity: None,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            allow_backorders: false,
            continue_selling_out_of_stock: false,
        }
    }
}

/// Aggregate root: the full in-memory description of one product being edited.
///
/// Owned by exactly one editing session. Every edit goes through the rule
/// modules (`classification`, `pricing`, `variants`, `bundle`, `images`), which
/// either apply a consistent change or reject it without touching the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfiguration {
    /// Absent while creating a new product.
    pub product_id: Option<ProductId>,
    pub name: LocalizedText,
    pub description: LocalizedText,

    pub product_type: ProductType,
    pub selling_method: SellingMethod,
    pub selling_unit: String,
    pub fulfillment_types: BTreeSet<FulfillmentType>,
    /// Never empty.
    pub sales_channels: BTreeSet<SalesChannel>,
    pub requires_scheduling: bool,
    pub subscription_interval: String,

    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub discount_type: DiscountType,
    pub discount_value: Option<Decimal>,
    pub discount_schedule: DiscountSchedule,

    pub sku: String,
    pub barcode: String,
    pub barcode_type: BarcodeType,

    pub inventory: Inventory,

    /// In practice holds the single deepest selected category.
    pub category_ids: Vec<CategoryId>,
    pub brand_id: Option<BrandId>,

    pub has_variants: bool,
    pub variant_options: Vec<VariantOption>,
    pub variants: Vec<VariantRow>,

    /// Only meaningful when `product_type` is `Bundle`.
    pub bundle_items: Vec<BundleItem>,

    pub persisted_images: Vec<PersistedImage>,
    pub pending_images: Vec<PendingImage>,
    pub pending_deletion_ids: BTreeSet<ImageId>,
    /// Featured pending image; mutually exclusive with a persisted primary.
    pub featured_pending_index: Option<usize>,
}

impl Default for ProductConfiguration {
    fn default() -> Self {
        Self {
            product_id: None,
            name: LocalizedText::default(),
            description: LocalizedText::default(),
            product_type: ProductType::Physical,
            selling_method: SellingMethod::Unit,
            selling_unit: String::new(),
            fulfillment_types: BTreeSet::from([FulfillmentType::Pickup, FulfillmentType::Delivery]),
            sales_channels: BTreeSet::from([SalesChannel::Online, SalesChannel::InStore]),
            requires_scheduling: false,
            subscription_interval: String::new(),
            price: None,
            compare_at_price: None,
            discount_type: DiscountType::None,
            discount_value: None,
            discount_schedule: DiscountSchedule::default(),
            sku: String::new(),
            barcode: String::new(),
            barcode_type: BarcodeType::default(),
            inventory: Inventory::default(),
            category_ids: Vec::new(),
            brand_id: None,
            has_variants: false,
            variant_options: Vec::new(),
            variants: Vec::new(),
            bundle_items: Vec::new(),
            persisted_images: Vec::new(),
            pending_images: Vec::new(),
            pending_deletion_ids: BTreeSet::new(),
            featured_pending_index: None,
        }
    }
}

impl ProductConfiguration {
    /// Empty configuration for create mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for an existing product (edit mode).
    pub fn for_product(product_id: ProductId) -> Self {
        Self {
            product_id: Some(product_id),
            ..Self::default()
        }
    }

    pub fn is_create_mode(&self) -> bool {
        self.product_id.is_none()
    }

    pub fn has_channel(&self, channel: SalesChannel) -> bool {
        self.sales_channels.contains(&channel)
    }

    pub fn has_fulfillment(&self, fulfillment: FulfillmentType) -> bool {
        self.fulfillment_types.contains(&fulfillment)
    }

    /// Deepest selected category, if any.
    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category_ids.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification;

    #[test]
    fn default_configuration_satisfies_classification_rules() {
        let config = ProductConfiguration::new();
        assert!(config.is_create_mode());
        assert!(!config.sales_channels.is_empty());
        assert!(classification::violations(&config).is_empty());
        assert_eq!(config.inventory.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
    }

    #[test]
    fn enums_use_snake_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&SalesChannel::InStore).unwrap(),
            "\"in_store\""
        );
        assert_eq!(
            serde_json::to_string(&DiscountType::FixedAmount).unwrap(),
            "\"fixed_amount\""
        );
        assert_eq!(SellingMethod::Subscription.as_str(), "subscription");
    }

    #[test]
    fn sales_channel_order_is_irrelevant_after_deserialize() {
        let mut config = ProductConfiguration::for_product(ProductId::new("p-1"));
        config.sales_channels = [SalesChannel::InStore, SalesChannel::Online].into_iter().collect();

        let json = serde_json::to_value(&config).unwrap();
        let back: ProductConfiguration = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
