//! User edits as values, and their routing to the rule modules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use storefront_core::{BrandId, DomainResult, ImageId, OptionId, ProductId, VariantId};

use crate::bundle::{self, BundleCandidate};
use crate::configuration::{
    BarcodeType, DiscountType, FulfillmentType, LocalizedText, ProductConfiguration, ProductType,
    SalesChannel, SellingMethod,
};
use crate::images::{self, PendingImage};
use crate::variants::{self, RowEdit};
use crate::{classification, pricing};

/// One discrete user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    SetName(LocalizedText),
    SetDescription(LocalizedText),

    SetProductType(ProductType),
    SetSellingMethod(SellingMethod),
    SetSellingUnit(String),
    SetSubscriptionInterval(String),
    SetRequiresScheduling(bool),
    ToggleSalesChannel(SalesChannel),
    ToggleFulfillment(FulfillmentType),

    SetPrice(Option<Decimal>),
    SetCompareAtPrice(Option<Decimal>),
    SetDiscountType(DiscountType),
    SetDiscountValue(Option<Decimal>),
    SetDiscountSchedule {
        enabled: bool,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
    },

    SetSku(String),
    SetBarcode(String),
    SetBarcodeType(BarcodeType),

    SetTrackInventory(bool),
    SetStockQuantity(Option<u32>),
    SetLowStockThreshold(u32),
    SetAllowBackorders(bool),
    SetContinueSellingOutOfStock(bool),

    SetBrand(Option<BrandId>),

    SetHasVariants(bool),
    AddVariantOption { name: String, values: Vec<String> },
    RemoveVariantOption(OptionId),
    AddOptionValue { option_id: OptionId, value: String },
    RemoveOptionValue { option_id: OptionId, value: String },
    RegenerateVariants,
    EditVariantRow { row_id: VariantId, edit: RowEdit },

    AddBundleItem(BundleCandidate),
    RemoveBundleItem(ProductId),
    AdjustBundleQuantity { product_id: ProductId, delta: i64 },
    ToggleBundleRequired(ProductId),
    MoveBundleItem { product_id: ProductId, to: usize },
    AddSubstitute { product_id: ProductId, substitute: BundleCandidate },
    RemoveSubstitute { product_id: ProductId, substitute_id: ProductId },

    AddPendingImages(Vec<PendingImage>),
    RemovePendingImage(usize),
    RemovePersistedImage(ImageId),
    SetPersistedPrimary(ImageId),
    SetPendingFeatured(usize),
}

impl EditCommand {
    /// Stable name used in logs and events.
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::SetName(_) => "set_name",
            EditCommand::SetDescription(_) => "set_description",
            EditCommand::SetProductType(_) => "set_product_type",
            EditCommand::SetSellingMethod(_) => "set_selling_method",
            EditCommand::SetSellingUnit(_) => "set_selling_unit",
            EditCommand::SetSubscriptionInterval(_) => "set_subscription_interval",
            EditCommand::SetRequiresScheduling(_) => "set_requires_scheduling",
            EditCommand::ToggleSalesChannel(_) => "toggle_sales_channel",
            EditCommand::ToggleFulfillment(_) => "toggle_fulfillment",
            EditCommand::SetPrice(_) => "set_price",
            EditCommand::SetCompareAtPrice(_) => "set_compare_at_price",
            EditCommand::SetDiscountType(_) => "set_discount_type",
            EditCommand::SetDiscountValue(_) => "set_discount_value",
            EditCommand::SetDiscountSchedule { .. } => "set_discount_schedule",
            EditCommand::SetSku(_) => "set_sku",
            EditCommand::SetBarcode(_) => "set_barcode",
            EditCommand::SetBarcodeType(_) => "set_barcode_type",
            EditCommand::SetTrackInventory(_) => "set_track_inventory",
            EditCommand::SetStockQuantity(_) => "set_stock_quantity",
            EditCommand::SetLowStockThreshold(_) => "set_low_stock_threshold",
            EditCommand::SetAllowBackorders(_) => "set_allow_backorders",
            EditCommand::SetContinueSellingOutOfStock(_) => "set_continue_selling_out_of_stock",
            EditCommand::SetBrand(_) => "set_brand",
            EditCommand::SetHasVariants(_) => "set_has_variants",
            EditCommand::AddVariantOption { .. } => "add_variant_option",
            EditCommand::RemoveVariantOption(_) => "remove_variant_option",
            EditCommand::AddOptionValue { .. } => "add_option_value",
            EditCommand::RemoveOptionValue { .. } => "remove_option_value",
            EditCommand::RegenerateVariants => "regenerate_variants",
            EditCommand::EditVariantRow { .. } => "edit_variant_row",
            EditCommand::AddBundleItem(_) => "add_bundle_item",
            EditCommand::RemoveBundleItem(_) => "remove_bundle_item",
            EditCommand::AdjustBundleQuantity { .. } => "adjust_bundle_quantity",
            EditCommand::ToggleBundleRequired(_) => "toggle_bundle_required",
            EditCommand::MoveBundleItem { .. } => "move_bundle_item",
            EditCommand::AddSubstitute { .. } => "add_substitute",
            EditCommand::RemoveSubstitute { .. } => "remove_substitute",
            EditCommand::AddPendingImages(_) => "add_pending_images",
            EditCommand::RemovePendingImage(_) => "remove_pending_image",
            EditCommand::RemovePersistedImage(_) => "remove_persisted_image",
            EditCommand::SetPersistedPrimary(_) => "set_persisted_primary",
            EditCommand::SetPendingFeatured(_) => "set_pending_featured",
        }
    }
}

/// Apply one edit. On `Err` the configuration is unchanged.
pub fn apply(config: &mut ProductConfiguration, command: EditCommand) -> DomainResult<()> {
    match command {
        EditCommand::SetName(name) => config.name = name,
        EditCommand::SetDescription(description) => config.description = description,

        EditCommand::SetProductType(product_type) => classification::apply_product_type(config, product_type),
        EditCommand::SetSellingMethod(method) => classification::set_selling_method(config, method)?,
        EditCommand::SetSellingUnit(unit) => classification::set_selling_unit(config, &unit),
        EditCommand::SetSubscriptionInterval(interval) => {
            classification::set_subscription_interval(config, &interval)?
        }
        EditCommand::SetRequiresScheduling(requires) => classification::set_requires_scheduling(config, requires)?,
        EditCommand::ToggleSalesChannel(channel) => classification::toggle_sales_channel(config, channel)?,
        EditCommand::ToggleFulfillment(fulfillment) => classification::toggle_fulfillment(config, fulfillment)?,

        EditCommand::SetPrice(price) => pricing::set_price(config, price)?,
        EditCommand::SetCompareAtPrice(compare_at) => pricing::set_compare_at_price(config, compare_at),
        EditCommand::SetDiscountType(discount_type) => pricing::set_discount_type(config, discount_type),
        EditCommand::SetDiscountValue(value) => pricing::set_discount_value(config, value),
        EditCommand::SetDiscountSchedule {
            enabled,
            starts_at,
            ends_at,
        } => pricing::set_discount_schedule(config, enabled, starts_at, ends_at),

        EditCommand::SetSku(sku) => config.sku = sku.trim().to_string(),
        EditCommand::SetBarcode(barcode) => config.barcode = barcode.trim().to_string(),
        EditCommand::SetBarcodeType(barcode_type) => config.barcode_type = barcode_type,

        EditCommand::SetTrackInventory(track) => config.inventory.track_inventory = track,
        EditCommand::SetStockQuantity(quantity) => config.inventory.stock_quantity = quantity,
        EditCommand::SetLowStockThreshold(threshold) => config.inventory.low_stock_threshold = threshold,
        EditCommand::SetAllowBackorders(allow) => config.inventory.allow_backorders = allow,
        EditCommand::SetContinueSellingOutOfStock(allow) => {
            config.inventory.continue_selling_out_of_stock = allow
        }

        EditCommand::SetBrand(brand_id) => config.brand_id = brand_id,

        EditCommand::SetHasVariants(has_variants) => variants::set_has_variants(config, has_variants),
        EditCommand::AddVariantOption { name, values } => {
            variants::add_option(config, &name, values)?;
        }
        EditCommand::RemoveVariantOption(option_id) => variants::remove_option(config, option_id)?,
        EditCommand::AddOptionValue { option_id, value } => variants::add_value(config, option_id, &value)?,
        EditCommand::RemoveOptionValue { option_id, value } => variants::remove_value(config, option_id, &value)?,
        EditCommand::RegenerateVariants => variants::regenerate(config),
        EditCommand::EditVariantRow { row_id, edit } => variants::edit_row(config, row_id, edit)?,

        EditCommand::AddBundleItem(candidate) => bundle::add_item(config, &candidate)?,
        EditCommand::RemoveBundleItem(product_id) => bundle::remove_item(config, &product_id)?,
        EditCommand::AdjustBundleQuantity { product_id, delta } => {
            bundle::set_quantity(config, &product_id, delta)?;
        }
        EditCommand::ToggleBundleRequired(product_id) => {
            bundle::toggle_required(config, &product_id)?;
        }
        EditCommand::MoveBundleItem { product_id, to } => bundle::move_item(config, &product_id, to)?,
        EditCommand::AddSubstitute { product_id, substitute } => {
            bundle::add_substitute(config, &product_id, &substitute)?
        }
        EditCommand::RemoveSubstitute {
            product_id,
            substitute_id,
        } => bundle::remove_substitute(config, &product_id, &substitute_id)?,

        EditCommand::AddPendingImages(files) => images::add_pending(config, files),
        EditCommand::RemovePendingImage(index) => images::remove_pending(config, index)?,
        EditCommand::RemovePersistedImage(image_id) => images::remove_persisted(config, &image_id)?,
        EditCommand::SetPersistedPrimary(image_id) => images::set_persisted_primary(config, &image_id)?,
        EditCommand::SetPendingFeatured(index) => images::set_pending_featured(config, index)?,
    }
    Ok(())
}
