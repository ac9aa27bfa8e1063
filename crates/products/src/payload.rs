//! Flattened product record sent to the catalog on create/update.
//!
//! Images travel separately through the image store, so the payload carries
//! no image data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use storefront_core::{BrandId, CategoryId};

use crate::bundle::BundleItem;
use crate::configuration::{
    BarcodeType, DiscountType, FulfillmentType, ProductConfiguration, ProductType, SalesChannel,
    SellingMethod,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantOptionPayload {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantPayload {
    pub title: String,
    pub options: BTreeMap<String, String>,
    pub price: Option<Decimal>,
    pub sku: String,
    pub stock: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPayload {
    pub name_en: String,
    pub name_local: String,
    pub description_en: String,
    pub description_local: String,

    pub product_type: ProductType,
    pub selling_method: SellingMethod,
    pub selling_unit: String,
    pub fulfillment_types: Vec<FulfillmentType>,
    pub sales_channels: Vec<SalesChannel>,
    pub requires_scheduling: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subscription_interval: String,

    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub discount_type: DiscountType,
    pub discount_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_ends_at: Option<DateTime<Utc>>,

    pub sku: String,
    pub barcode: String,
    pub barcode_type: BarcodeType,

    pub track_inventory: bool,
    pub stock_quantity: Option<u32>,
    pub low_stock_threshold: u32,
    pub allow_backorders: bool,
    pub continue_selling_out_of_stock: bool,

    pub category_ids: Vec<CategoryId>,
    pub brand_id: Option<BrandId>,

    pub has_variants: bool,
    pub variant_options: Vec<VariantOptionPayload>,
    pub variants: Vec<VariantPayload>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bundle_items: Vec<BundleItem>,
}

impl ProductPayload {
    pub fn from_configuration(config: &ProductConfiguration) -> Self {
        let schedule = &config.discount_schedule;
        let scheduled = schedule.enabled && config.discount_type.is_active();

        Self {
            name_en: config.name.en.trim().to_string(),
            name_local: config.name.local.trim().to_string(),
            description_en: config.description.en.clone(),
            description_local: config.description.local.clone(),

            product_type: config.product_type,
            selling_method: config.selling_method,
            selling_unit: config.selling_unit.clone(),
            fulfillment_types: config.fulfillment_types.iter().copied().collect(),
            sales_channels: config.sales_channels.iter().copied().collect(),
            requires_scheduling: config.requires_scheduling,
            subscription_interval: config.subscription_interval.clone(),

            price: config.price,
            compare_at_price: config.compare_at_price,
            discount_type: config.discount_type,
            discount_value: config.discount_value,
            discount_starts_at: schedule.starts_at.filter(|_| scheduled),
            discount_ends_at: schedule.ends_at.filter(|_| scheduled),

            sku: config.sku.clone(),
            barcode: config.barcode.clone(),
            barcode_type: config.barcode_type,

            track_inventory: config.inventory.track_inventory,
            stock_quantity: config.inventory.stock_quantity,
            low_stock_threshold: config.inventory.low_stock_threshold,
            allow_backorders: config.inventory.allow_backorders,
            continue_selling_out_of_stock: config.inventory.continue_selling_out_of_stock,

            category_ids: config.category_id().cloned().into_iter().collect(),
            brand_id: config.brand_id.clone(),

            has_variants: config.has_variants,
            variant_options: config
                .variant_options
                .iter()
                .map(|o| VariantOptionPayload {
                    name: o.name.clone(),
                    values: o.values.clone(),
                })
                .collect(),
            variants: config
                .variants
                .iter()
                .map(|row| VariantPayload {
                    title: row.option_selection.title(),
                    options: row
                        .option_selection
                        .iter()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                    price: row.price,
                    sku: row.sku.clone(),
                    stock: row.stock,
                    enabled: row.enabled,
                })
                .collect(),

            bundle_items: if config.product_type == ProductType::Bundle {
                config.bundle_items.clone()
            } else {
                Vec::new()
            },
        }
    }

    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl From<&ProductConfiguration> for ProductPayload {
    fn from(config: &ProductConfiguration) -> Self {
        Self::from_configuration(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storefront_core::ProductId;

    use crate::bundle::{BundleCandidate, add_item};
    use crate::classification::apply_product_type;
    use crate::configuration::LocalizedText;
    use crate::images::{add_pending, pending};
    use crate::pricing::{set_discount_schedule, set_discount_type, set_price};
    use crate::variants::add_option;

    #[test]
    fn payload_flattens_configuration() {
        let mut config = ProductConfiguration::new();
        config.name = LocalizedText::new("  Mug ", "Becher");
        config.category_ids = vec![CategoryId::new("home"), CategoryId::new("kitchen")];
        set_price(&mut config, Some(Decimal::new(20, 0))).unwrap();
        add_option(&mut config, "Size", ["S", "M"]).unwrap();
        add_pending(&mut config, [pending("a")]);

        let json = ProductPayload::from(&config).to_json_value().unwrap();

        assert_eq!(json["name_en"], "Mug");
        let price = json["price"].as_str().map(|s| s.parse::<Decimal>().unwrap());
        assert_eq!(price, Some(Decimal::new(20, 0)));
        assert_eq!(json["sales_channels"], serde_json::json!(["online", "in_store"]));
        assert_eq!(json["category_ids"], serde_json::json!(["kitchen"]));
        assert_eq!(json["variants"][1]["title"], "M");
        assert_eq!(json["variants"][1]["options"]["Size"], "M");
        assert!(json.get("pending_images").is_none());
        assert!(json.get("bundle_items").is_none());
        assert!(json.get("discount_starts_at").is_none());
    }

    #[test]
    fn schedule_is_sent_only_for_enabled_active_discounts() {
        let mut config = ProductConfiguration::new();
        set_price(&mut config, Some(Decimal::new(20, 0))).unwrap();
        let start = Utc::now();
        set_discount_schedule(&mut config, true, Some(start), Some(start + Duration::days(7)));
        assert_eq!(ProductPayload::from(&config).discount_starts_at, None);

        set_discount_type(&mut config, DiscountType::Percentage);
        let payload = ProductPayload::from(&config);
        assert_eq!(payload.discount_starts_at, Some(start));
        assert!(payload.discount_ends_at.is_some());
    }

    #[test]
    fn bundle_items_only_for_bundles() {
        let mut config = ProductConfiguration::for_product(ProductId::new("b-1"));
        apply_product_type(&mut config, ProductType::Bundle);
        add_item(&mut config, &BundleCandidate::new("p-1", ProductType::Physical)).unwrap();
        assert_eq!(ProductPayload::from(&config).bundle_items.len(), 1);

        apply_product_type(&mut config, ProductType::Physical);
        assert!(ProductPayload::from(&config).bundle_items.is_empty());
    }
}
