//! `storefront-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the product editor
//! (no IO, no async, no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors};
pub use id::{BrandId, CategoryId, ImageId, OptionId, ProductId, StoreId, VariantId};
pub use money::{MAX_AMOUNT, Money, Percentage};
pub use value_object::ValueObject;
