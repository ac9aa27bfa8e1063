//! Product configuration engine.
//!
//! Pure, synchronous rules that keep a merchant's in-progress product edit
//! consistent (classification, pricing, variants, bundles, images), a dirty
//! check against the loaded baseline, and a submission-time validator.
//!
//! [`session::EditorSession`] is the host-side controller that routes edits
//! through the rules and sequences the external collaborators
//! ([`collaborators`]); the rules themselves never perform IO.

pub mod bundle;
pub mod classification;
pub mod collaborators;
pub mod command;
pub mod configuration;
pub mod dirty;
pub mod editor_event;
pub mod identifiers;
pub mod images;
pub mod payload;
pub mod pricing;
pub mod session;
pub mod settings;
pub mod validation;
pub mod variants;

pub use bundle::{BundleCandidate, BundleItem, Substitute};
pub use collaborators::{
    Category, CategoryDirectory, CollaboratorError, CollaboratorResult, GeneratedBarcode,
    IdentifierService, ImageStore, InventoryLevel, InventoryLookup, PersistedImageSource,
    ProductCatalog, UploadObserver, UploadOutcome, UploadProgress,
};
pub use command::EditCommand;
pub use configuration::{
    BarcodeType, DiscountSchedule, DiscountType, FulfillmentType, Inventory, LocalizedText,
    ProductConfiguration, ProductType, SalesChannel, SellingMethod,
};
pub use dirty::{Baseline, compute_dirty};
pub use editor_event::{EditorEnvelope, EditorEvent, Notice};
pub use images::{FileHandle, PendingImage, PersistedImage, primary_image_url};
pub use payload::ProductPayload;
pub use session::{EditorSession, LoadState};
pub use settings::EditorSettings;
pub use validation::validate;
pub use variants::{OptionSelection, RowEdit, VariantOption, VariantRow};
