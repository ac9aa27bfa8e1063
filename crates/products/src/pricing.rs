//! Price model: keeps price, compare-at price and discount consistent.
//!
//! While a discount is active and both inputs are present:
//!
//! ```text
//! percentage:   price = max(0, compare_at * (1 - value / 100))
//! fixed_amount: price = max(0, compare_at - value)
//! ```
//!
//! `price` is derived in that state and cannot be edited directly.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;

use storefront_core::{DomainError, DomainResult, Money, Percentage};

use crate::configuration::{DiscountSchedule, DiscountType, ProductConfiguration};

/// Discount assigned when a discount is first switched on, in percent.
pub const DEFAULT_DISCOUNT_PERCENT: Decimal = Decimal::TEN;

fn money(value: Decimal) -> Decimal {
    Money::new(value).amount()
}

fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `pct` percent of `basis`, saturating at the largest storable amount.
fn percent_of(basis: Decimal, pct: Decimal) -> Decimal {
    basis
        .checked_mul(pct)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .unwrap_or(Money::MAX.amount())
}

/// Share of `basis` that `amount` represents, in whole percent.
fn share_percent(amount: Decimal, basis: Decimal) -> Decimal {
    amount
        .checked_div(basis)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ONE_HUNDRED, round_whole)
}

/// Normalize a discount value for its type.
fn clamp_discount(discount_type: DiscountType, value: Decimal) -> Decimal {
    match discount_type {
        DiscountType::Percentage => Percentage::new(value).value(),
        DiscountType::FixedAmount | DiscountType::None => money(value),
    }
}

/// Price implied by a compare-at price and a discount.
pub fn discounted_price(
    compare_at: Decimal,
    discount_type: DiscountType,
    value: Decimal,
) -> Option<Decimal> {
    match discount_type {
        DiscountType::None => None,
        DiscountType::Percentage => {
            let pct = Percentage::new(value).value();
            Some(money(compare_at * (Decimal::ONE - pct / Decimal::ONE_HUNDRED)))
        }
        DiscountType::FixedAmount => Some(money(compare_at - value)),
    }
}

/// Discount value that turns `compare_at` into `price` (inverse of [`discounted_price`]).
pub fn derive_discount_value(
    price: Decimal,
    compare_at: Decimal,
    discount_type: DiscountType,
) -> Option<Decimal> {
    match discount_type {
        DiscountType::None => None,
        DiscountType::Percentage => {
            if compare_at.is_zero() {
                return None;
            }
            let pct = (compare_at - price) / compare_at * Decimal::ONE_HUNDRED;
            Some(Percentage::new(pct).value())
        }
        DiscountType::FixedAmount => Some(money(compare_at - price)),
    }
}

/// Effective discount in percent, for display ("-25%").
pub fn effective_discount_percent(config: &ProductConfiguration) -> Option<Decimal> {
    let price = config.price?;
    let compare_at = config.compare_at_price?;
    if compare_at <= price {
        return None;
    }
    derive_discount_value(price, compare_at, DiscountType::Percentage)
}

/// Re-derive `price` when a discount is active and both inputs are present.
fn recompute_price(config: &mut ProductConfiguration) {
    if let (Some(compare_at), Some(value)) = (config.compare_at_price, config.discount_value) {
        if let Some(price) = discounted_price(compare_at, config.discount_type, value) {
            config.price = Some(price);
        }
    }
}

/// Edit the price directly. Rejected while a discount is active.
pub fn set_price(config: &mut ProductConfiguration, price: Option<Decimal>) -> DomainResult<()> {
    if config.discount_type.is_active() {
        return Err(DomainError::rejected(
            "price is calculated from the discount; remove the discount to edit it",
        ));
    }
    config.price = price.map(money);
    Ok(())
}

pub fn set_compare_at_price(config: &mut ProductConfiguration, compare_at: Option<Decimal>) {
    config.compare_at_price = compare_at.map(money);
    if config.discount_type.is_active() {
        recompute_price(config);
    }
}

pub fn set_discount_value(config: &mut ProductConfiguration, value: Option<Decimal>) {
    config.discount_value = value.map(|v| clamp_discount(config.discount_type, v));
    if config.discount_type.is_active() {
        recompute_price(config);
    }
}

/// Switch the discount type, carrying the numbers across.
pub fn set_discount_type(config: &mut ProductConfiguration, new_type: DiscountType) {
    let old_type = config.discount_type;
    if old_type == new_type {
        return;
    }

    match (old_type, new_type) {
        (_, DiscountType::None) => {
            if let Some(compare_at) = config.compare_at_price.take() {
                config.price = Some(compare_at);
            }
            config.discount_value = None;
        }
        (DiscountType::None, _) => {
            if config.compare_at_price.is_none() {
                config.compare_at_price = config.price;
            }
            let basis = config.compare_at_price.unwrap_or(Decimal::ZERO);
            config.discount_value = Some(match new_type {
                DiscountType::Percentage => DEFAULT_DISCOUNT_PERCENT,
                _ => money(percent_of(basis, DEFAULT_DISCOUNT_PERCENT)),
            });
        }
        (DiscountType::Percentage, DiscountType::FixedAmount) => {
            let basis = discount_basis(config);
            config.discount_value = Some(match config.discount_value {
                Some(pct) => money(round_whole(percent_of(basis, pct))),
                None => money(percent_of(basis, DEFAULT_DISCOUNT_PERCENT)),
            });
        }
        (DiscountType::FixedAmount, DiscountType::Percentage) => {
            let basis = discount_basis(config);
            config.discount_value = Some(match config.discount_value {
                Some(_) if basis.is_zero() => Decimal::ZERO,
                Some(amount) => Percentage::new(share_percent(amount, basis)).value(),
                None => DEFAULT_DISCOUNT_PERCENT,
            });
        }
        (DiscountType::Percentage, DiscountType::Percentage)
        | (DiscountType::FixedAmount, DiscountType::FixedAmount) => {}
    }

    config.discount_type = new_type;
    if new_type.is_active() {
        recompute_price(config);
    }
}

fn discount_basis(config: &ProductConfiguration) -> Decimal {
    config
        .compare_at_price
        .or(config.price)
        .unwrap_or(Decimal::ZERO)
}

pub fn set_discount_schedule(
    config: &mut ProductConfiguration,
    enabled: bool,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) {
    config.discount_schedule = DiscountSchedule {
        enabled,
        starts_at,
        ends_at,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn priced(price: &str) -> ProductConfiguration {
        let mut config = ProductConfiguration::new();
        set_price(&mut config, Some(dec(price))).unwrap();
        config
    }

    #[test]
    fn percentage_discount_moves_price_to_compare_at() {
        let mut config = priced("100");

        set_discount_type(&mut config, DiscountType::Percentage);
        assert_eq!(config.compare_at_price, Some(dec("100")));
        assert_eq!(config.discount_value, Some(dec("10")));
        assert_eq!(config.price, Some(dec("90")));

        set_discount_value(&mut config, Some(dec("25")));
        assert_eq!(config.compare_at_price, Some(dec("100")));
        assert_eq!(config.price, Some(dec("75.00")));
    }

    #[test]
    fn fixed_discount_defaults_to_ten_percent_of_price() {
        let mut config = priced("80");

        set_discount_type(&mut config, DiscountType::FixedAmount);
        assert_eq!(config.discount_value, Some(dec("8")));
        assert_eq!(config.price, Some(dec("72")));
    }

    #[test]
    fn existing_compare_at_is_kept_when_discount_starts() {
        let mut config = priced("50");
        set_compare_at_price(&mut config, Some(dec("60")));

        set_discount_type(&mut config, DiscountType::Percentage);
        assert_eq!(config.compare_at_price, Some(dec("60")));
        assert_eq!(config.price, Some(dec("54")));
    }

    #[test]
    fn clearing_discount_restores_compare_at_as_price() {
        let mut config = priced("100");
        set_discount_type(&mut config, DiscountType::Percentage);
        set_discount_value(&mut config, Some(dec("30")));

        set_discount_type(&mut config, DiscountType::None);
        assert_eq!(config.price, Some(dec("100")));
        assert_eq!(config.compare_at_price, None);
        assert_eq!(config.discount_value, None);
    }

    #[test]
    fn price_is_locked_while_discounted() {
        let mut config = priced("100");
        set_discount_type(&mut config, DiscountType::FixedAmount);

        let before = config.clone();
        assert!(matches!(
            set_price(&mut config, Some(dec("5"))),
            Err(DomainError::Rejected(_))
        ));
        assert_eq!(config, before);
    }

    #[test]
    fn switching_between_discount_kinds_preserves_price() {
        let mut config = priced("200");
        set_discount_type(&mut config, DiscountType::Percentage);
        set_discount_value(&mut config, Some(dec("15")));
        assert_eq!(config.price, Some(dec("170")));

        set_discount_type(&mut config, DiscountType::FixedAmount);
        assert_eq!(config.discount_value, Some(dec("30")));
        assert_eq!(config.price, Some(dec("170")));

        set_discount_value(&mut config, Some(dec("33")));
        set_discount_type(&mut config, DiscountType::Percentage);
        // 33 / 200 = 16.5% -> 17%
        assert_eq!(config.discount_value, Some(dec("17")));
        assert_eq!(config.price, Some(dec("166")));
    }

    #[test]
    fn largest_prices_switch_discount_kinds_without_overflow() {
        let mut config = ProductConfiguration::new();
        set_price(&mut config, Some(Decimal::from_i128_with_scale(10i128.pow(28), 0))).unwrap();
        assert_eq!(config.price, Some(Money::MAX.amount()));

        set_discount_type(&mut config, DiscountType::FixedAmount);
        assert_eq!(config.compare_at_price, Some(Money::MAX.amount()));
        assert_eq!(config.discount_value, Some(dec("100000000000.00")));
        assert_eq!(config.price, Some(dec("899999999999.99")));

        set_discount_type(&mut config, DiscountType::Percentage);
        assert_eq!(config.discount_value, Some(dec("10")));

        // Values written straight into the record skip the cap.
        config.compare_at_price = Some(Decimal::MAX);
        config.discount_value = Some(dec("50"));
        set_discount_type(&mut config, DiscountType::FixedAmount);
        assert_eq!(config.discount_value, Some(Money::MAX.amount()));

        config.compare_at_price = Some(dec("0.01"));
        config.discount_value = Some(Decimal::MAX);
        set_discount_type(&mut config, DiscountType::Percentage);
        assert_eq!(config.discount_value, Some(Decimal::ONE_HUNDRED));
    }

    #[test]
    fn percentage_is_clamped_and_price_floors_at_zero() {
        let mut config = priced("40");
        set_discount_type(&mut config, DiscountType::Percentage);
        set_discount_value(&mut config, Some(dec("250")));
        assert_eq!(config.discount_value, Some(dec("100")));
        assert_eq!(config.price, Some(Decimal::ZERO));

        set_discount_type(&mut config, DiscountType::FixedAmount);
        set_discount_value(&mut config, Some(dec("55")));
        assert_eq!(config.price, Some(Decimal::ZERO));
    }

    #[test]
    fn missing_input_leaves_price_untouched() {
        let mut config = priced("100");
        set_discount_type(&mut config, DiscountType::Percentage);
        set_discount_value(&mut config, None);
        assert_eq!(config.price, Some(dec("90")));

        set_compare_at_price(&mut config, Some(dec("500")));
        assert_eq!(config.price, Some(dec("90")));
    }

    #[test]
    fn compare_at_edit_recomputes_price() {
        let mut config = priced("100");
        set_discount_type(&mut config, DiscountType::Percentage);
        set_compare_at_price(&mut config, Some(dec("120")));
        assert_eq!(config.price, Some(dec("108")));
    }

    #[test]
    fn inputs_are_clamped_to_cents() {
        let mut config = ProductConfiguration::new();
        set_price(&mut config, Some(dec("-4"))).unwrap();
        assert_eq!(config.price, Some(Decimal::ZERO));
        set_price(&mut config, Some(dec("19.999"))).unwrap();
        assert_eq!(config.price, Some(dec("20.00")));
    }

    #[test]
    fn effective_percent_for_display() {
        let mut config = priced("100");
        assert_eq!(effective_discount_percent(&config), None);
        set_discount_type(&mut config, DiscountType::FixedAmount);
        set_discount_value(&mut config, Some(dec("25")));
        assert_eq!(effective_discount_percent(&config), Some(dec("25")));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: deriving the discount back from the computed price
            /// lands within rounding tolerance of the starting percentage.
            #[test]
            fn percentage_round_trips(compare_cents in 100i64..10_000_000i64, pct_hundredths in 0i64..=10_000i64) {
                let compare_at = Decimal::new(compare_cents, 2);
                let pct = Decimal::new(pct_hundredths, 2);

                let price = discounted_price(compare_at, DiscountType::Percentage, pct).unwrap();
                let back = derive_discount_value(price, compare_at, DiscountType::Percentage).unwrap();

                let tolerance = dec("0.5") / compare_at + dec("0.01");
                prop_assert!((back - pct).abs() <= tolerance, "{} vs {} (compare_at {})", back, pct, compare_at);
            }

            /// Property: fixed discounts up to the compare-at price round-trip exactly.
            #[test]
            fn fixed_amount_round_trips(compare_cents in 1i64..10_000_000i64, share in 0.0f64..=1.0f64) {
                let compare_at = Decimal::new(compare_cents, 2);
                let amount_cents = ((compare_cents as f64) * share).floor() as i64;
                let amount = Decimal::new(amount_cents, 2);

                let price = discounted_price(compare_at, DiscountType::FixedAmount, amount).unwrap();
                let back = derive_discount_value(price, compare_at, DiscountType::FixedAmount).unwrap();
                prop_assert_eq!(back, amount);
            }
        }
    }
}
