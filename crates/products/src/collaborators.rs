//! Contracts of the external services the editor depends on.
//!
//! Implementations (HTTP clients, storage adapters) live with the host. Every
//! call is async and may fail with a [`CollaboratorError`]; the editing session
//! turns such failures into `DomainError::Collaborator` and leaves the
//! configuration untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::{CategoryId, DomainError, ImageId, ProductId, StoreId};

use crate::configuration::BarcodeType;
use crate::images::{PendingImage, PersistedImage};
use crate::payload::ProductPayload;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("network error: {0}")]
    Network(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A generator ran out of unique values.
    #[error("exhausted: {0}")]
    Exhausted(String),
}

impl From<CollaboratorError> for DomainError {
    fn from(value: CollaboratorError) -> Self {
        DomainError::collaborator(value.to_string())
    }
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLevel {
    /// May be negative when backorders were taken.
    pub quantity: i64,
    pub low_stock_threshold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    /// Zero-based index of the file being sent.
    pub item_index: usize,
    pub item_count: usize,
    pub bytes_sent: u64,
    pub bytes_total: u64,
}

impl UploadProgress {
    /// Fraction of the current file sent, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            return 1.0;
        }
        (self.bytes_sent as f64 / self.bytes_total as f64).clamp(0.0, 1.0)
    }
}

/// Receives upload progress for display. Not part of the correctness contract.
pub trait UploadObserver: Send + Sync {
    fn on_progress(&self, progress: UploadProgress);
}

/// Result of an upload batch: stored images plus per-file failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    pub images: Vec<PersistedImage>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedBarcode {
    pub barcode: String,
    pub barcode_type: BarcodeType,
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn create_product(&self, payload: &ProductPayload) -> CollaboratorResult<ProductId>;

    async fn update_product(&self, id: &ProductId, payload: &ProductPayload) -> CollaboratorResult<()>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload files for a product. `featured_index` marks which of `files`
    /// becomes the primary image.
    async fn upload_images(
        &self,
        product_id: &ProductId,
        files: Vec<PendingImage>,
        featured_index: Option<usize>,
        observer: &dyn UploadObserver,
    ) -> CollaboratorResult<UploadOutcome>;

    async fn delete_image(&self, product_id: &ProductId, image_id: &ImageId) -> CollaboratorResult<()>;

    async fn set_image_primary(&self, product_id: &ProductId, image_id: &ImageId) -> CollaboratorResult<()>;
}

#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    async fn fetch_categories(&self) -> CollaboratorResult<Vec<Category>>;

    async fn fetch_product_categories(&self, product_id: &ProductId) -> CollaboratorResult<Vec<CategoryId>>;
}

#[async_trait]
pub trait InventoryLookup: Send + Sync {
    /// `None` when the product has no inventory row for the store.
    async fn fetch_inventory(
        &self,
        product_id: &ProductId,
        store_id: &StoreId,
    ) -> CollaboratorResult<Option<InventoryLevel>>;
}

#[async_trait]
pub trait PersistedImageSource: Send + Sync {
    async fn fetch_images(&self, product_id: &ProductId) -> CollaboratorResult<Vec<PersistedImage>>;
}

/// Uniqueness-checked identifier generators. `None` means the generator is
/// exhausted; callers fall back to local generation.
#[async_trait]
pub trait IdentifierService: Send + Sync {
    async fn generate_sku(&self, base_name: &str, existing: &[String]) -> CollaboratorResult<Option<String>>;

    async fn generate_barcode(
        &self,
        barcode_type: BarcodeType,
        existing: &[String],
    ) -> CollaboratorResult<Option<GeneratedBarcode>>;
}
