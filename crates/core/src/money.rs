//! Monetary and percentage value objects.
//!
//! All amounts lie in `[0, MAX_AMOUNT]` and carry at most 2 decimal places
//! (half away from zero).

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Decimal places kept for monetary values and percentages.
pub const DECIMAL_PLACES: u32 = 2;

/// Largest storable amount: 999 999 999 999.99.
///
/// Keeps every discount computation well inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, DECIMAL_PLACES);

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// A monetary amount in `[0, MAX_AMOUNT]`, clamped to 2 decimal places.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const MAX: Money = Money(MAX_AMOUNT);

    /// Clamp to `[0, MAX_AMOUNT]` and round to 2 decimal places.
    pub fn new(amount: Decimal) -> Self {
        Self(round2(amount.clamp(Decimal::ZERO, MAX_AMOUNT)))
    }

    /// Parse a form field. Blank input is `None`; garbage is `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        Decimal::from_str(input).ok().map(Self::new)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A percentage in `[0, 100]`, clamped to 2 decimal places.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(Decimal);

impl ValueObject for Percentage {}

impl Percentage {
    pub fn new(value: Decimal) -> Self {
        Self(round2(value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)))
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    /// Fraction of `basis` this percentage represents, rounded to 2 places.
    pub fn of(self, basis: Money) -> Money {
        Money::new(basis.amount() * self.0 / Decimal::ONE_HUNDRED)
    }
}

impl From<Percentage> for Decimal {
    fn from(value: Percentage) -> Self {
        value.0
    }
}
