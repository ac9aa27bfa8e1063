//! Variant options and their Cartesian expansion into sellable rows.
//!
//! Rows are enumerated row-major in option declaration order: the first option
//! varies slowest, the last option fastest. `[Size: S, M] x [Color: Red, Blue]`
//! yields `(S, Red), (S, Blue), (M, Red), (M, Blue)`.
//!
//! Every option or value edit regenerates the rows. Per-row edits (price, sku,
//! stock, enabled) do not survive a regeneration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::entity::position_of;
use storefront_core::{DomainError, DomainResult, Entity, Money, OptionId, VariantId};

use crate::configuration::ProductConfiguration;

/// Most options a product may declare.
pub const MAX_VARIANT_OPTIONS: usize = 3;

/// A named axis of variation ("Size") with its ordered, distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOption {
    pub id: OptionId,
    pub name: String,
    pub values: Vec<String>,
}

impl Entity for VariantOption {
    type Id = OptionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl VariantOption {
    /// Build an option from user input.
    ///
    /// Names and values are trimmed; blank values are dropped and duplicates
    /// (case-sensitive) keep their first occurrence.
    pub fn new<I, S>(name: &str, values: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::rejected("option name is required"));
        }

        let mut distinct: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref().trim();
            if !value.is_empty() && !distinct.iter().any(|v| v == value) {
                distinct.push(value.to_string());
            }
        }
        if distinct.is_empty() {
            return Err(DomainError::rejected(format!(
                "option \"{name}\" needs at least one value"
            )));
        }

        Ok(Self {
            id: OptionId::new(),
            name: name.to_string(),
            values: distinct,
        })
    }

    fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.values.is_empty()
            && self.values.iter().all(|v| !v.trim().is_empty())
            && self
                .values
                .iter()
                .enumerate()
                .all(|(i, v)| !self.values[..i].contains(v))
    }
}

/// Option name to value, in option declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OptionSelection(Vec<(String, String)>);

impl OptionSelection {
    pub fn get(&self, option_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == option_name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn values(&self) -> Vec<&str> {
        self.0.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display title, e.g. `"S / Red"`.
    pub fn title(&self) -> String {
        self.values().join(" / ")
    }

    fn with(&self, name: &str, value: &str) -> Self {
        let mut next = self.0.clone();
        next.push((name.to_string(), value.to_string()));
        Self(next)
    }
}

/// One sellable combination of option values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRow {
    pub id: VariantId,
    pub option_selection: OptionSelection,
    pub price: Option<Decimal>,
    pub sku: String,
    pub stock: u32,
    pub enabled: bool,
}

impl Entity for VariantRow {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl VariantRow {
    /// Same sellable content, ignoring the row identity.
    pub fn same_content(&self, other: &VariantRow) -> bool {
        self.option_selection == other.option_selection
            && self.price == other.price
            && self.sku == other.sku
            && self.stock == other.stock
            && self.enabled == other.enabled
    }
}

/// Number of rows a set of options expands to (zero options expand to nothing).
pub fn combination_count(options: &[VariantOption]) -> usize {
    if options.is_empty() {
        return 0;
    }
    options.iter().map(|o| o.values.len()).product()
}

/// Row-major Cartesian product of the option values.
pub fn expand(options: &[VariantOption]) -> Vec<OptionSelection> {
    if options.is_empty() {
        return Vec::new();
    }

    let mut combinations = vec![OptionSelection::default()];
    for option in options {
        combinations = combinations
            .iter()
            .flat_map(|prefix| {
                option
                    .values
                    .iter()
                    .map(move |value| prefix.with(&option.name, value))
            })
            .collect();
    }
    combinations
}

/// Recompute every variant row from the current options.
///
/// Rows inherit the base price and stock, an empty SKU, and start enabled.
///
/// # Panics
///
/// Panics on a malformed option list (more than [`MAX_VARIANT_OPTIONS`], blank
/// names or values, duplicate names or values). The editing operations in this
/// module never produce one.
pub fn regenerate(config: &mut ProductConfiguration) {
    let options = &config.variant_options;
    assert!(
        options.len() <= MAX_VARIANT_OPTIONS,
        "at most {MAX_VARIANT_OPTIONS} variant options, got {}",
        options.len()
    );
    for (i, option) in options.iter().enumerate() {
        assert!(option.is_well_formed(), "malformed variant option {:?}", option.name);
        assert!(
            !options[..i].iter().any(|o| o.name == option.name),
            "duplicate variant option {:?}",
            option.name
        );
    }

    let price = config.price;
    let stock = config.inventory.stock_quantity.unwrap_or(0);
    config.variants = expand(options)
        .into_iter()
        .map(|selection| VariantRow {
            id: VariantId::new(),
            option_selection: selection,
            price,
            sku: String::new(),
            stock,
            enabled: true,
        })
        .collect();

    tracing::debug!(rows = config.variants.len(), "variants regenerated");
}

fn option_mut(config: &mut ProductConfiguration, option_id: OptionId) -> DomainResult<&mut VariantOption> {
    let index = position_of(&config.variant_options, &option_id).ok_or_else(DomainError::not_found)?;
    Ok(&mut config.variant_options[index])
}

/// Declare a new option and regenerate the rows.
pub fn add_option<I, S>(config: &mut ProductConfiguration, name: &str, values: I) -> DomainResult<OptionId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if config.variant_options.len() >= MAX_VARIANT_OPTIONS {
        return Err(DomainError::rejected(format!(
            "a product can have at most {MAX_VARIANT_OPTIONS} options"
        )));
    }
    let option = VariantOption::new(name, values)?;
    if config.variant_options.iter().any(|o| o.name == option.name) {
        return Err(DomainError::rejected(format!(
            "option \"{}\" already exists",
            option.name
        )));
    }

    let id = option.id;
    config.variant_options.push(option);
    config.has_variants = true;
    regenerate(config);
    Ok(id)
}

pub fn remove_option(config: &mut ProductConfiguration, option_id: OptionId) -> DomainResult<()> {
    let index = position_of(&config.variant_options, &option_id).ok_or_else(DomainError::not_found)?;
    config.variant_options.remove(index);
    regenerate(config);
    Ok(())
}

/// Append a value to an option. Adding an existing value is a no-op.
pub fn add_value(config: &mut ProductConfiguration, option_id: OptionId, value: &str) -> DomainResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::rejected("option value cannot be blank"));
    }
    let option = option_mut(config, option_id)?;
    if option.values.iter().any(|v| v == value) {
        return Ok(());
    }
    option.values.push(value.to_string());
    regenerate(config);
    Ok(())
}

/// Remove a value; removing the last value removes the whole option.
pub fn remove_value(config: &mut ProductConfiguration, option_id: OptionId, value: &str) -> DomainResult<()> {
    let value = value.trim();
    let option = option_mut(config, option_id)?;
    let Some(index) = option.values.iter().position(|v| v == value) else {
        return Err(DomainError::not_found());
    };
    option.values.remove(index);

    if option.values.is_empty() {
        config.variant_options.retain(|o| o.id != option_id);
    }
    regenerate(config);
    Ok(())
}

/// Turn variants on or off. Turning them off drops every option and row.
pub fn set_has_variants(config: &mut ProductConfiguration, has_variants: bool) {
    config.has_variants = has_variants;
    if !has_variants {
        config.variant_options.clear();
        config.variants.clear();
    }
}

/// A hand edit on one generated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEdit {
    Price(Option<Decimal>),
    Sku(String),
    Stock(u32),
    Enabled(bool),
}

pub fn edit_row(config: &mut ProductConfiguration, row_id: VariantId, edit: RowEdit) -> DomainResult<()> {
    let index = position_of(&config.variants, &row_id).ok_or_else(DomainError::not_found)?;
    let row = &mut config.variants[index];
    match edit {
        RowEdit::Price(price) => row.price = price.map(|p| Money::new(p).amount()),
        RowEdit::Sku(sku) => row.sku = sku.trim().to_string(),
        RowEdit::Stock(stock) => row.stock = stock,
        RowEdit::Enabled(enabled) => row.enabled = enabled,
    }
    Ok(())
}

/// Whether the rows are exactly the expansion of the current options.
pub fn rows_match_options(config: &ProductConfiguration) -> bool {
    let expected = expand(&config.variant_options);
    expected.len() == config.variants.len()
        && expected
            .iter()
            .zip(&config.variants)
            .all(|(selection, row)| *selection == row.option_selection)
}
