//! Classification rules: which selling methods, fulfillment options and sales
//! channels are legal for each product type, and the cascades that keep them
//! legal when one choice changes.
//!
//! | type     | selling methods                    | fulfillment      | channels                     |
//! |----------|------------------------------------|------------------|------------------------------|
//! | physical | unit, weight, length, subscription | pickup, delivery | pickup needs `in_store`      |
//! | digital  | unit                               | digital          | `online` only                |
//! | service  | time, subscription                 | onsite           | any                          |
//! | bundle   | unit, subscription                 | pickup, delivery | pickup needs `in_store`      |

use std::collections::BTreeSet;

use storefront_core::{DomainError, DomainResult};

use crate::configuration::{
    FulfillmentType, ProductConfiguration, ProductType, SalesChannel, SellingMethod,
};

impl ProductType {
    /// Legal selling methods; the first entry is the reset default.
    pub fn allowed_selling_methods(self) -> &'static [SellingMethod] {
        match self {
            ProductType::Physical => &[
                SellingMethod::Unit,
                SellingMethod::Weight,
                SellingMethod::Length,
                SellingMethod::Subscription,
            ],
            ProductType::Digital => &[SellingMethod::Unit],
            ProductType::Service => &[SellingMethod::Time, SellingMethod::Subscription],
            ProductType::Bundle => &[SellingMethod::Unit, SellingMethod::Subscription],
        }
    }

    pub fn allowed_fulfillment(self) -> &'static [FulfillmentType] {
        match self {
            ProductType::Physical | ProductType::Bundle => {
                &[FulfillmentType::Pickup, FulfillmentType::Delivery]
            }
            ProductType::Digital => &[FulfillmentType::Digital],
            ProductType::Service => &[FulfillmentType::Onsite],
        }
    }

    pub fn allows_selling_method(self, method: SellingMethod) -> bool {
        self.allowed_selling_methods().contains(&method)
    }

    pub fn allows_fulfillment(self, fulfillment: FulfillmentType) -> bool {
        self.allowed_fulfillment().contains(&fulfillment)
    }

    pub fn allows_channel(self, channel: SalesChannel) -> bool {
        !(self == ProductType::Digital && channel == SalesChannel::InStore)
    }

    fn ships_goods(self) -> bool {
        matches!(self, ProductType::Physical | ProductType::Bundle)
    }

    /// Fulfillment set a product of this type starts with.
    pub fn default_fulfillment(self, in_store: bool) -> BTreeSet<FulfillmentType> {
        let only = match self {
            ProductType::Digital => FulfillmentType::Digital,
            ProductType::Service => FulfillmentType::Onsite,
            ProductType::Physical | ProductType::Bundle if in_store => FulfillmentType::Pickup,
            ProductType::Physical | ProductType::Bundle => FulfillmentType::Delivery,
        };
        BTreeSet::from([only])
    }
}

impl SellingMethod {
    /// Unit label derived from the selling method.
    pub fn default_unit(self) -> &'static str {
        match self {
            SellingMethod::Weight => "kg",
            SellingMethod::Length => "m",
            SellingMethod::Time => "hour",
            SellingMethod::Unit | SellingMethod::Subscription => "",
        }
    }
}

fn reset_selling_method(config: &mut ProductConfiguration, method: SellingMethod) {
    config.selling_method = method;
    config.selling_unit = method.default_unit().to_string();
    if method != SellingMethod::Subscription {
        config.subscription_interval.clear();
    }
}

/// Switch the product type and cascade every dependent choice.
///
/// Selecting the current type again is a no-op.
pub fn apply_product_type(config: &mut ProductConfiguration, new_type: ProductType) {
    if config.product_type == new_type {
        return;
    }
    tracing::debug!(from = config.product_type.as_str(), to = new_type.as_str(), "product type changed");

    config.product_type = new_type;
    reset_selling_method(config, new_type.allowed_selling_methods()[0]);

    if new_type == ProductType::Digital {
        config.sales_channels.retain(|c| *c == SalesChannel::Online);
        if config.sales_channels.is_empty() {
            config.sales_channels.insert(SalesChannel::Online);
        }
    }

    config.fulfillment_types = new_type.default_fulfillment(config.has_channel(SalesChannel::InStore));

    if new_type == ProductType::Service {
        config.requires_scheduling = true;
    }
}

/// Toggle a sales channel on or off.
///
/// Rejections (no mutation):
/// - removing the last remaining channel;
/// - adding `in_store` to a digital product.
///
/// Cascades:
/// - removing `in_store` drops `pickup`; a shipped product left without any
///   fulfillment falls back to `delivery`;
/// - removing `online` from a digital product turns it into an in-store
///   physical product sold by unit with `pickup` fulfillment.
pub fn toggle_sales_channel(config: &mut ProductConfiguration, channel: SalesChannel) -> DomainResult<()> {
    if !config.has_channel(channel) {
        if !config.product_type.allows_channel(channel) {
            return Err(DomainError::rejected(
                "digital products can only be sold online",
            ));
        }
        config.sales_channels.insert(channel);
        return Ok(());
    }

    if channel == SalesChannel::Online && config.product_type == ProductType::Digital {
        config.product_type = ProductType::Physical;
        reset_selling_method(config, SellingMethod::Unit);
        config.sales_channels = BTreeSet::from([SalesChannel::InStore]);
        config.fulfillment_types = BTreeSet::from([FulfillmentType::Pickup]);
        tracing::debug!("online removed from digital product; switched to physical in-store");
        return Ok(());
    }

    if config.sales_channels.len() == 1 {
        return Err(DomainError::rejected(
            "at least one sales channel must stay enabled",
        ));
    }

    config.sales_channels.remove(&channel);

    if channel == SalesChannel::InStore {
        config.fulfillment_types.remove(&FulfillmentType::Pickup);
        if config.fulfillment_types.is_empty() && config.product_type.ships_goods() {
            config.fulfillment_types.insert(FulfillmentType::Delivery);
        }
    }

    Ok(())
}

/// Toggle a fulfillment option on or off.
///
/// Adding is rejected when the product type does not offer the option, or when
/// `pickup` is requested without the `in_store` channel. Removal is always
/// accepted; an empty set is reported at validation time.
pub fn toggle_fulfillment(config: &mut ProductConfiguration, fulfillment: FulfillmentType) -> DomainResult<()> {
    if config.has_fulfillment(fulfillment) {
        config.fulfillment_types.remove(&fulfillment);
        return Ok(());
    }

    if !config.product_type.allows_fulfillment(fulfillment) {
        return Err(DomainError::rejected(format!(
            "{} fulfillment is not available for {} products",
            fulfillment.as_str(),
            config.product_type.as_str()
        )));
    }

    if fulfillment == FulfillmentType::Pickup && !config.has_channel(SalesChannel::InStore) {
        return Err(DomainError::rejected(
            "pickup requires the in-store sales channel",
        ));
    }

    config.fulfillment_types.insert(fulfillment);
    Ok(())
}

/// Change the selling method; the unit label is re-derived.
pub fn set_selling_method(config: &mut ProductConfiguration, method: SellingMethod) -> DomainResult<()> {
    if !config.product_type.allows_selling_method(method) {
        return Err(DomainError::rejected(format!(
            "{} products cannot be sold by {}",
            config.product_type.as_str(),
            method.as_str()
        )));
    }
    if config.selling_method != method {
        reset_selling_method(config, method);
    }
    Ok(())
}

/// Free-text override of the derived unit label ("kg", "hour", ...).
pub fn set_selling_unit(config: &mut ProductConfiguration, unit: &str) {
    config.selling_unit = unit.trim().to_string();
}

pub fn set_subscription_interval(config: &mut ProductConfiguration, interval: &str) -> DomainResult<()> {
    if config.selling_method != SellingMethod::Subscription {
        return Err(DomainError::rejected(
            "a billing interval only applies to subscription products",
        ));
    }
    config.subscription_interval = interval.trim().to_string();
    Ok(())
}

/// Booking slots; only service products carry the flag.
pub fn set_requires_scheduling(config: &mut ProductConfiguration, requires: bool) -> DomainResult<()> {
    if requires && config.product_type != ProductType::Service {
        return Err(DomainError::rejected("only service products can require scheduling"));
    }
    config.requires_scheduling = requires;
    Ok(())
}

/// Every way the configuration currently breaks the constraint table.
pub fn violations(config: &ProductConfiguration) -> Vec<String> {
    let product_type = config.product_type;
    let mut found = Vec::new();

    if !product_type.allows_selling_method(config.selling_method) {
        found.push(format!(
            "selling method {} is not allowed for {} products",
            config.selling_method.as_str(),
            product_type.as_str()
        ));
    }

    for fulfillment in &config.fulfillment_types {
        if !product_type.allows_fulfillment(*fulfillment) {
            found.push(format!(
                "{} fulfillment is not allowed for {} products",
                fulfillment.as_str(),
                product_type.as_str()
            ));
        }
    }

    if config.has_fulfillment(FulfillmentType::Pickup) && !config.has_channel(SalesChannel::InStore) {
        found.push("pickup requires the in-store sales channel".to_string());
    }

    for channel in &config.sales_channels {
        if !product_type.allows_channel(*channel) {
            found.push(format!(
                "{} channel is not allowed for {} products",
                channel.as_str(),
                product_type.as_str()
            ));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(list: &[SalesChannel]) -> BTreeSet<SalesChannel> {
        list.iter().copied().collect()
    }

    fn fulfillment(list: &[FulfillmentType]) -> BTreeSet<FulfillmentType> {
        list.iter().copied().collect()
    }

    #[test]
    fn switching_to_digital_keeps_only_online() {
        let mut config = ProductConfiguration::new();
        assert_eq!(config.sales_channels, channels(&[SalesChannel::Online, SalesChannel::InStore]));

        apply_product_type(&mut config, ProductType::Digital);

        assert_eq!(config.sales_channels, channels(&[SalesChannel::Online]));
        assert_eq!(config.fulfillment_types, fulfillment(&[FulfillmentType::Digital]));
        assert_eq!(config.selling_method, SellingMethod::Unit);

        let before = config.clone();
        let err = toggle_sales_channel(&mut config, SalesChannel::InStore).unwrap_err();
        assert!(matches!(err, DomainError::Rejected(_)));
        assert_eq!(config, before);
    }

    #[test]
    fn switching_to_digital_from_in_store_only_forces_online() {
        let mut config = ProductConfiguration::new();
        config.sales_channels = channels(&[SalesChannel::InStore]);
        config.fulfillment_types = fulfillment(&[FulfillmentType::Pickup]);

        apply_product_type(&mut config, ProductType::Digital);

        assert_eq!(config.sales_channels, channels(&[SalesChannel::Online]));
    }

    #[test]
    fn switching_to_service_requires_scheduling_and_time() {
        let mut config = ProductConfiguration::new();
        apply_product_type(&mut config, ProductType::Service);

        assert!(config.requires_scheduling);
        assert_eq!(config.selling_method, SellingMethod::Time);
        assert_eq!(config.selling_unit, "hour");
        assert_eq!(config.fulfillment_types, fulfillment(&[FulfillmentType::Onsite]));

        config.requires_scheduling = false;
        assert!(violations(&config).is_empty());
    }

    #[test]
    fn switching_to_physical_without_in_store_delivers() {
        let mut config = ProductConfiguration::new();
        apply_product_type(&mut config, ProductType::Digital);
        apply_product_type(&mut config, ProductType::Physical);

        assert_eq!(config.fulfillment_types, fulfillment(&[FulfillmentType::Delivery]));

        toggle_sales_channel(&mut config, SalesChannel::InStore).unwrap();
        apply_product_type(&mut config, ProductType::Bundle);
        assert_eq!(config.fulfillment_types, fulfillment(&[FulfillmentType::Pickup]));
    }

    #[test]
    fn selecting_same_type_is_a_no_op() {
        let mut config = ProductConfiguration::new();
        set_selling_method(&mut config, SellingMethod::Weight).unwrap();
        let before = config.clone();

        apply_product_type(&mut config, ProductType::Physical);
        assert_eq!(config, before);
    }

    #[test]
    fn removing_last_channel_is_rejected() {
        let mut config = ProductConfiguration::new();
        toggle_sales_channel(&mut config, SalesChannel::Online).unwrap();
        assert_eq!(config.sales_channels, channels(&[SalesChannel::InStore]));

        let before = config.clone();
        let err = toggle_sales_channel(&mut config, SalesChannel::InStore).unwrap_err();
        assert!(err.rejection_reason().is_some());
        assert_eq!(config, before);
    }

    #[test]
    fn removing_in_store_drops_pickup_and_falls_back_to_delivery() {
        let mut config = ProductConfiguration::new();
        config.fulfillment_types = fulfillment(&[FulfillmentType::Pickup]);

        toggle_sales_channel(&mut config, SalesChannel::InStore).unwrap();

        assert_eq!(config.sales_channels, channels(&[SalesChannel::Online]));
        assert_eq!(config.fulfillment_types, fulfillment(&[FulfillmentType::Delivery]));
    }

    #[test]
    fn removing_in_store_keeps_existing_delivery() {
        let mut config = ProductConfiguration::new();
        toggle_sales_channel(&mut config, SalesChannel::InStore).unwrap();
        assert_eq!(config.fulfillment_types, fulfillment(&[FulfillmentType::Delivery]));
    }

    #[test]
    fn removing_online_from_digital_cascades_to_physical() {
        let mut config = ProductConfiguration::new();
        apply_product_type(&mut config, ProductType::Digital);

        toggle_sales_channel(&mut config, SalesChannel::Online).unwrap();

        assert_eq!(config.product_type, ProductType::Physical);
        assert_eq!(config.selling_method, SellingMethod::Unit);
        assert_eq!(config.sales_channels, channels(&[SalesChannel::InStore]));
        assert_eq!(config.fulfillment_types, fulfillment(&[FulfillmentType::Pickup]));
        assert!(violations(&config).is_empty());
    }

    #[test]
    fn pickup_needs_in_store() {
        let mut config = ProductConfiguration::new();
        toggle_sales_channel(&mut config, SalesChannel::InStore).unwrap();

        let err = toggle_fulfillment(&mut config, FulfillmentType::Pickup).unwrap_err();
        assert!(matches!(err, DomainError::Rejected(_)));

        toggle_sales_channel(&mut config, SalesChannel::InStore).unwrap();
        toggle_fulfillment(&mut config, FulfillmentType::Pickup).unwrap();
        assert!(config.has_fulfillment(FulfillmentType::Pickup));
    }

    #[test]
    fn fulfillment_must_match_type() {
        let mut config = ProductConfiguration::new();
        apply_product_type(&mut config, ProductType::Service);

        assert!(toggle_fulfillment(&mut config, FulfillmentType::Delivery).is_err());
        toggle_fulfillment(&mut config, FulfillmentType::Onsite).unwrap();
        assert!(config.fulfillment_types.is_empty());
        toggle_fulfillment(&mut config, FulfillmentType::Onsite).unwrap();
        assert!(config.has_fulfillment(FulfillmentType::Onsite));
    }

    #[test]
    fn selling_method_derives_unit() {
        let mut config = ProductConfiguration::new();
        set_selling_method(&mut config, SellingMethod::Length).unwrap();
        assert_eq!(config.selling_unit, "m");

        config.subscription_interval = "monthly".to_string();
        set_selling_method(&mut config, SellingMethod::Subscription).unwrap();
        set_selling_method(&mut config, SellingMethod::Unit).unwrap();
        assert!(config.subscription_interval.is_empty());

        assert!(set_selling_method(&mut config, SellingMethod::Time).is_err());
    }

    #[test]
    fn interval_and_scheduling_follow_type() {
        let mut config = ProductConfiguration::new();
        assert!(set_subscription_interval(&mut config, "monthly").is_err());
        assert!(set_requires_scheduling(&mut config, true).is_err());
        set_requires_scheduling(&mut config, false).unwrap();

        set_selling_method(&mut config, SellingMethod::Subscription).unwrap();
        set_subscription_interval(&mut config, " monthly ").unwrap();
        assert_eq!(config.subscription_interval, "monthly");

        apply_product_type(&mut config, ProductType::Service);
        set_requires_scheduling(&mut config, false).unwrap();
        assert!(!config.requires_scheduling);

        set_selling_unit(&mut config, " session ");
        assert_eq!(config.selling_unit, "session");
    }

    #[test]
    fn violations_report_broken_table() {
        let mut config = ProductConfiguration::new();
        config.product_type = ProductType::Digital;

        let found = violations(&config);
        assert!(found.iter().any(|v| v.contains("in_store channel")));
        assert!(found.iter().any(|v| v.contains("pickup fulfillment")));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Step {
            Type(ProductType),
            Channel(SalesChannel),
            Fulfillment(FulfillmentType),
        }

        fn step() -> impl Strategy<Value = Step> {
            prop_oneof![
                prop_oneof![
                    Just(ProductType::Physical),
                    Just(ProductType::Digital),
                    Just(ProductType::Service),
                    Just(ProductType::Bundle),
                ]
                .prop_map(Step::Type),
                prop_oneof![Just(SalesChannel::Online), Just(SalesChannel::InStore)]
                    .prop_map(Step::Channel),
                prop_oneof![
                    Just(FulfillmentType::Pickup),
                    Just(FulfillmentType::Delivery),
                    Just(FulfillmentType::Digital),
                    Just(FulfillmentType::Onsite),
                ]
                .prop_map(Step::Fulfillment),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of edits empties the sales channels or
            /// breaks the constraint table.
            #[test]
            fn channels_never_empty(steps in proptest::collection::vec(step(), 0..40)) {
                let mut config = ProductConfiguration::new();
                for step in steps {
                    let before = config.clone();
                    let outcome = match step {
                        Step::Type(t) => { apply_product_type(&mut config, t); Ok(()) }
                        Step::Channel(c) => toggle_sales_channel(&mut config, c),
                        Step::Fulfillment(f) => toggle_fulfillment(&mut config, f),
                    };
                    if outcome.is_err() {
                        prop_assert_eq!(&config, &before);
                    }
                    prop_assert!(!config.sales_channels.is_empty());
                    prop_assert!(violations(&config).is_empty(), "{:?}", violations(&config));
                }
            }
        }
    }
}
