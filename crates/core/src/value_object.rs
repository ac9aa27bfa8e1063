//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes are
/// the same value. To "modify" one, construct a new one.
///
/// - **Value Object**: `Money(19.99)`, `Percentage(25)`
/// - **Entity**: a `VariantRow` keeps its id while its price is edited
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
