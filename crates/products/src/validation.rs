//! Submission-time validation. Every rule runs; all failures are reported.

use rust_decimal::Decimal;

use storefront_core::FieldErrors;

use crate::configuration::{DiscountType, ProductConfiguration, ProductType};
use crate::{bundle, classification, images, variants};

/// Maximum length of a product name, per locale, in characters.
pub const MAX_NAME_LEN: usize = 200;

fn check_name(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if value.chars().count() > MAX_NAME_LEN {
        errors.add(field, format!("{label} must be at most {MAX_NAME_LEN} characters"));
    }
}

/// Validate a configuration for submission.
pub fn validate(config: &ProductConfiguration) -> Result<&ProductConfiguration, FieldErrors> {
    let mut errors = FieldErrors::new();

    check_name(&mut errors, "name_en", "English name", &config.name.en);
    check_name(&mut errors, "name_local", "Local name", &config.name.local);

    match config.price {
        None => errors.add("price", "price is required"),
        Some(price) if price <= Decimal::ZERO => errors.add("price", "price must be greater than zero"),
        Some(_) => {}
    }

    if let (Some(compare_at), Some(price)) = (config.compare_at_price, config.price) {
        if compare_at < price {
            errors.add("compare_at_price", "compare-at price must not be below the price");
        }
    }

    if config.discount_type == DiscountType::Percentage
        && config.discount_value.is_some_and(|v| v > Decimal::ONE_HUNDRED)
    {
        errors.add("discount_value", "percentage discount cannot exceed 100");
    }

    let schedule = &config.discount_schedule;
    if let (true, Some(starts), Some(ends)) = (schedule.enabled, schedule.starts_at, schedule.ends_at) {
        if starts > ends {
            errors.add("discount_schedule", "discount must start before it ends");
        }
    }

    if config.sales_channels.is_empty() {
        errors.add("sales_channels", "select at least one sales channel");
    }
    if config.fulfillment_types.is_empty() {
        errors.add("fulfillment_types", "select at least one fulfillment option");
    }
    for violation in classification::violations(config) {
        errors.add("classification", violation);
    }

    if config.product_type == ProductType::Bundle {
        if config.bundle_items.is_empty() {
            errors.add("bundle_items", "a bundle needs at least one item");
        }
        for violation in bundle::violations(config) {
            errors.add("bundle_items", violation);
        }
    }

    if config.has_variants && !variants::rows_match_options(config) {
        errors.add("variants", "variant rows are out of date; regenerate them");
    }

    if images::primary_count(config) > 1 {
        errors.add("images", "only one image can be primary");
    }

    if !errors.is_empty() {
        tracing::debug!(fields = errors.len(), "configuration failed validation");
    }
    errors.into_result(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use storefront_core::ProductId;

    use crate::bundle::{BundleCandidate, add_item};
    use crate::classification::apply_product_type;
    use crate::configuration::{FulfillmentType, LocalizedText};
    use crate::images::persisted;
    use crate::pricing::{set_compare_at_price, set_discount_schedule};

    fn valid() -> ProductConfiguration {
        let mut config = ProductConfiguration::new();
        config.name = LocalizedText::new("Mug", "Becher");
        config.price = Some(Decimal::new(1200, 2));
        config
    }

    #[test]
    fn valid_configuration_passes() {
        let config = valid();
        assert_eq!(validate(&config), Ok(&config));
    }

    #[test]
    fn collects_every_failure() {
        let mut config = ProductConfiguration::new();
        config.fulfillment_types.clear();

        let errors = validate(&config).unwrap_err();
        for field in ["name_en", "name_local", "price", "fulfillment_types"] {
            assert!(errors.contains(field), "missing {field}: {errors}");
        }
    }

    #[test]
    fn name_length_is_bounded() {
        let mut config = valid();
        config.name.local = "ü".repeat(MAX_NAME_LEN);
        assert!(validate(&config).is_ok());

        config.name.en = "x".repeat(MAX_NAME_LEN + 1);
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name_en"]);
    }

    #[test]
    fn zero_price_is_invalid() {
        let mut config = valid();
        config.price = Some(Decimal::ZERO);
        assert_eq!(
            validate(&config).unwrap_err().messages("price"),
            ["price must be greater than zero".to_string()]
        );
    }

    #[test]
    fn compare_at_below_price_is_invalid() {
        let mut config = valid();
        set_compare_at_price(&mut config, Some(Decimal::ONE));
        assert!(validate(&config).unwrap_err().contains("compare_at_price"));
    }

    #[test]
    fn percentage_above_hundred_is_invalid() {
        let mut config = valid();
        config.discount_type = DiscountType::Percentage;
        config.compare_at_price = Some(Decimal::new(1200, 2));
        config.discount_value = Some(Decimal::new(150, 0));
        assert!(validate(&config).unwrap_err().contains("discount_value"));
    }

    #[test]
    fn inverted_schedule_is_invalid_only_when_enabled() {
        let mut config = valid();
        let now = Utc::now();
        set_discount_schedule(&mut config, false, Some(now), Some(now - Duration::days(1)));
        assert!(validate(&config).is_ok());

        set_discount_schedule(&mut config, true, Some(now), Some(now - Duration::days(1)));
        assert!(validate(&config).unwrap_err().contains("discount_schedule"));
    }

    #[test]
    fn empty_bundle_is_invalid_until_an_item_is_added() {
        let mut config = valid();
        config.product_id = Some(ProductId::new("b-1"));
        apply_product_type(&mut config, ProductType::Bundle);

        let errors = validate(&config).unwrap_err();
        assert!(errors.contains("bundle_items"));
        assert_eq!(errors.len(), 1);

        add_item(&mut config, &BundleCandidate::new("p-1", ProductType::Physical)).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn classification_violations_are_reported() {
        let mut config = valid();
        config.fulfillment_types.insert(FulfillmentType::Onsite);
        assert!(validate(&config).unwrap_err().contains("classification"));
    }

    #[test]
    fn stale_variant_rows_are_invalid() {
        let mut config = valid();
        crate::variants::add_option(&mut config, "Size", ["S", "M"]).unwrap();
        assert!(validate(&config).is_ok());

        config.variants.pop();
        assert!(validate(&config).unwrap_err().contains("variants"));
    }

    #[test]
    fn two_primaries_are_invalid() {
        let mut config = valid();
        config.persisted_images = vec![persisted("a", true), persisted("b", true)];
        assert!(validate(&config).unwrap_err().contains("images"));
    }
}
