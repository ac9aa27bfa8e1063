//! The editing session: single owner of one product configuration.
//!
//! Lifecycle:
//!
//! ```text
//! create ─────────────────────────────► Creating ──submit──► Ready
//! begin_edit ──► Hydrating ──hydrate──► Ready ──submit──► Ready
//! ```
//!
//! While `Hydrating` the form is never reported dirty and cannot be submitted.
//! The baseline is captured
//! only after every prefetch has resolved, and `BaselineCaptured` is published
//! as the explicit load-completion signal.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use uuid::Uuid;

use storefront_core::{CategoryId, DomainError, DomainResult, ProductId};
use storefront_events::{EventBus, InMemoryEventBus};

use crate::collaborators::{
    Category, CategoryDirectory, CollaboratorError, GeneratedBarcode, IdentifierService, ImageStore,
    InventoryLookup, PersistedImageSource, ProductCatalog, UploadObserver, UploadOutcome, UploadProgress,
};
use crate::command::{self, EditCommand};
use crate::configuration::ProductConfiguration;
use crate::dirty::{self, Baseline};
use crate::editor_event::{EditorEnvelope, EditorEvent, Notice};
use crate::identifiers;
use crate::images::{featured_upload_index, primary_image_url};
use crate::payload::ProductPayload;
use crate::settings::EditorSettings;
use crate::validation::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// New product; dirty means "anything entered".
    Creating,
    /// Existing product whose prefetches have not all resolved.
    Hydrating,
    /// Baseline captured; dirty means "differs from baseline".
    Ready,
}

fn publish_on<B>(bus: &B, sequence: &AtomicU64, session_id: Uuid, event: EditorEvent)
where
    B: EventBus<EditorEnvelope>,
{
    let sequence_number = sequence.fetch_add(1, Ordering::Relaxed) + 1;
    if let Err(err) = bus.publish(EditorEnvelope::new(session_id, sequence_number, event)) {
        tracing::warn!(error = ?err, %session_id, "failed to publish editor event");
    }
}

/// Forwards upload progress onto the session's event stream.
struct ProgressPublisher<'a, B> {
    bus: &'a B,
    sequence: &'a AtomicU64,
    session_id: Uuid,
}

impl<B> UploadObserver for ProgressPublisher<'_, B>
where
    B: EventBus<EditorEnvelope>,
{
    fn on_progress(&self, progress: UploadProgress) {
        publish_on(
            self.bus,
            self.sequence,
            self.session_id,
            EditorEvent::UploadProgress { progress, at: Utc::now() },
        );
    }
}

fn category_depth(id: &CategoryId, tree: &[Category]) -> usize {
    let find = |id: &CategoryId| tree.iter().find(|c| &c.id == id);
    let mut depth = 0;
    let mut current = find(id);
    while let Some(category) = current {
        match &category.parent_id {
            Some(parent) if depth < tree.len() => {
                depth += 1;
                current = find(parent);
            }
            _ => break,
        }
    }
    depth
}

/// The deepest of the product's assigned categories.
fn deepest_category(assigned: &[CategoryId], tree: &[Category]) -> Option<CategoryId> {
    assigned
        .iter()
        .max_by_key(|id| category_depth(id, tree))
        .cloned()
}

pub struct EditorSession<B = InMemoryEventBus<EditorEnvelope>> {
    session_id: Uuid,
    settings: EditorSettings,
    config: ProductConfiguration,
    baseline: Option<Baseline>,
    state: LoadState,
    categories: Vec<Category>,
    last_processed_category_key: Option<String>,
    /// Id returned by `create_product`, kept so a retried submit updates
    /// instead of creating a second product.
    created_product_id: Option<ProductId>,
    sequence: AtomicU64,
    bus: B,
}

impl<B> EditorSession<B>
where
    B: EventBus<EditorEnvelope>,
{
    fn with_state(settings: EditorSettings, bus: B, config: ProductConfiguration, state: LoadState) -> Self {
        Self {
            session_id: Uuid::now_v7(),
            settings,
            config,
            baseline: None,
            state,
            categories: Vec::new(),
            last_processed_category_key: None,
            created_product_id: None,
            sequence: AtomicU64::new(0),
            bus,
        }
    }

    /// Start a session for a new product.
    pub fn create(settings: EditorSettings, bus: B) -> Self {
        let session = Self::with_state(settings, bus, ProductConfiguration::new(), LoadState::Creating);
        tracing::info!(session_id = %session.session_id, "editor opened for new product");
        session
    }

    /// Start a session for an existing product. The grace window stays open
    /// until [`hydrate`](Self::hydrate) completes.
    pub fn begin_edit(settings: EditorSettings, bus: B, product: ProductConfiguration) -> DomainResult<Self> {
        let Some(product_id) = product.product_id.clone() else {
            return Err(DomainError::invalid_id("an existing product needs an id"));
        };

        let session = Self::with_state(settings, bus, product, LoadState::Hydrating);
        tracing::info!(session_id = %session.session_id, %product_id, "hydration started");
        session.publish(EditorEvent::HydrationStarted {
            product_id,
            at: Utc::now(),
        });
        Ok(session)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn config(&self) -> &ProductConfiguration {
        &self.config
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    /// Category tree loaded during hydration.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn last_processed_category_key(&self) -> Option<&str> {
        self.last_processed_category_key.as_deref()
    }

    pub fn subscribe(&self) -> storefront_events::Subscription<EditorEnvelope> {
        self.bus.subscribe()
    }

    fn publish(&self, event: EditorEvent) {
        publish_on(&self.bus, &self.sequence, self.session_id, event);
    }

    /// Run the prefetches (category tree, assigned categories, inventory,
    /// images) concurrently and capture the baseline once all resolve.
    ///
    /// A failure or timeout leaves the session hydrating and the
    /// configuration untouched.
    pub async fn hydrate(
        &mut self,
        categories: &dyn CategoryDirectory,
        inventory: &dyn InventoryLookup,
        images: &dyn PersistedImageSource,
    ) -> DomainResult<()> {
        if self.state != LoadState::Hydrating {
            return Ok(());
        }
        let Some(product_id) = self.config.product_id.clone() else {
            return Err(DomainError::invalid_id("an existing product needs an id"));
        };
        let store_id = self.settings.store_id.clone();

        let prefetch = async {
            tokio::join!(
                categories.fetch_categories(),
                categories.fetch_product_categories(&product_id),
                inventory.fetch_inventory(&product_id, &store_id),
                images.fetch_images(&product_id),
            )
        };

        let (tree, assigned, level, persisted) =
            match tokio::time::timeout(self.settings.prefetch_timeout, prefetch).await {
                Ok(results) => results,
                Err(_) => {
                    tracing::error!(session_id = %self.session_id, %product_id, "prefetch timed out");
                    return Err(DomainError::collaborator("loading product details timed out"));
                }
            };

        let loaded = (|| Ok::<_, DomainError>((tree?, assigned?, level?, persisted?)))();
        let (tree, assigned, level, persisted) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::error!(session_id = %self.session_id, %product_id, error = %err, "prefetch failed");
                return Err(err);
            }
        };

        self.config.category_ids = deepest_category(&assigned, &tree).into_iter().collect();
        self.categories = tree;
        if let Some(level) = level {
            self.config.inventory.stock_quantity = Some(u32::try_from(level.quantity.max(0)).unwrap_or(u32::MAX));
            self.config.inventory.low_stock_threshold = level.low_stock_threshold;
        }
        self.config.persisted_images = persisted;
        self.config.featured_pending_index = None;

        self.baseline = Some(Baseline::capture(&self.config));
        self.state = LoadState::Ready;

        tracing::info!(session_id = %self.session_id, %product_id, "baseline captured");
        self.publish(EditorEvent::BaselineCaptured {
            product_id,
            at: Utc::now(),
        });
        Ok(())
    }

    /// Whether there are unsaved changes. Always `false` while hydrating.
    pub fn is_dirty(&self) -> bool {
        match self.state {
            LoadState::Hydrating => false,
            LoadState::Creating => dirty::compute_dirty(&self.config, None),
            LoadState::Ready => dirty::compute_dirty(&self.config, self.baseline.as_ref()),
        }
    }

    /// Tracked fields changed since the baseline (empty before one exists).
    pub fn changed_fields(&self) -> BTreeSet<&'static str> {
        match (&self.state, &self.baseline) {
            (LoadState::Ready, Some(baseline)) => dirty::changed_fields(&self.config, baseline),
            _ => BTreeSet::new(),
        }
    }

    fn edited(&self, command: &'static str) {
        self.publish(EditorEvent::Edited {
            command,
            dirty: self.is_dirty(),
            primary_image_url: primary_image_url(&self.config).map(str::to_string),
            at: Utc::now(),
        });
    }

    /// Apply one user edit.
    ///
    /// A rejected edit leaves the configuration untouched and publishes an
    /// auto-expiring notice carrying the reason.
    pub fn dispatch(&mut self, edit: EditCommand) -> DomainResult<()> {
        let name = edit.name();
        match command::apply(&mut self.config, edit) {
            Ok(()) => {
                tracing::debug!(session_id = %self.session_id, command = name, "edit applied");
                self.edited(name);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(session_id = %self.session_id, command = name, error = %err, "edit rejected");
                if let Some(reason) = err.rejection_reason() {
                    self.publish(EditorEvent::EditRejected {
                        command: name,
                        notice: Notice::new(reason, Utc::now(), self.settings.notice_ttl_chrono()),
                    });
                }
                Err(err)
            }
        }
    }

    /// Record the category path picked in the category selector; the deepest
    /// id is stored. Re-selecting the path already processed is ignored.
    ///
    /// Returns whether the configuration changed.
    pub fn select_category_path(&mut self, path: &[CategoryId]) -> bool {
        let key = path.iter().map(CategoryId::as_str).collect::<Vec<_>>().join("/");
        if self.last_processed_category_key.as_deref() == Some(key.as_str()) {
            tracing::debug!(session_id = %self.session_id, key, "category path already processed");
            return false;
        }

        self.config.category_ids = path.last().cloned().into_iter().collect();
        self.last_processed_category_key = Some(key);
        self.edited("select_category_path");
        true
    }

    /// Fill the SKU from the identifier service, falling back to a local one.
    pub async fn assign_generated_sku(
        &mut self,
        service: &dyn IdentifierService,
        existing: &[String],
    ) -> DomainResult<String> {
        let base_name = if self.config.name.en.trim().is_empty() {
            self.config.name.local.clone()
        } else {
            self.config.name.en.clone()
        };
        let sku = identifiers::sku_or_fallback(service, &base_name, existing).await;
        self.dispatch(EditCommand::SetSku(sku.clone()))?;
        Ok(sku)
    }

    /// Fill the barcode for the selected symbology, falling back to a local one.
    pub async fn assign_generated_barcode(
        &mut self,
        service: &dyn IdentifierService,
        existing: &[String],
    ) -> DomainResult<GeneratedBarcode> {
        let generated = identifiers::barcode_or_fallback(service, self.config.barcode_type, existing).await;
        self.dispatch(EditCommand::SetBarcodeType(generated.barcode_type))?;
        self.dispatch(EditCommand::SetBarcode(generated.barcode.clone()))?;
        Ok(generated)
    }

    /// Validate and persist the configuration, then upload pending images.
    ///
    /// Rejected while product details are still loading. On failure nothing
    /// entered is lost: images already deleted leave the pending-deletion list
    /// and everything else stays as it was. A retry after a successful create
    /// updates the created product instead of creating another.
    pub async fn submit(&mut self, catalog: &dyn ProductCatalog, image_store: &dyn ImageStore) -> DomainResult<ProductId> {
        match self.persist(catalog, image_store).await {
            Ok((product_id, created, outcome)) => {
                for error in &outcome.errors {
                    tracing::warn!(session_id = %self.session_id, %product_id, error, "image upload failed");
                }

                self.config.product_id = Some(product_id.clone());
                self.config.persisted_images.extend(outcome.images);
                self.config.pending_images.clear();
                self.config.pending_deletion_ids.clear();
                self.config.featured_pending_index = None;
                self.created_product_id = None;
                self.baseline = Some(Baseline::capture(&self.config));
                self.state = LoadState::Ready;

                tracing::info!(session_id = %self.session_id, %product_id, created, "product saved");
                self.publish(EditorEvent::Submitted {
                    product_id: product_id.clone(),
                    created,
                    at: Utc::now(),
                });
                Ok(product_id)
            }
            Err(err) => {
                tracing::error!(session_id = %self.session_id, error = %err, "submission failed");
                self.publish(EditorEvent::SubmissionFailed {
                    reason: err.to_string(),
                    at: Utc::now(),
                });
                Err(err)
            }
        }
    }

    async fn persist(
        &mut self,
        catalog: &dyn ProductCatalog,
        image_store: &dyn ImageStore,
    ) -> DomainResult<(ProductId, bool, UploadOutcome)> {
        if self.state == LoadState::Hydrating {
            return Err(DomainError::rejected("product details are still loading"));
        }
        validate(&self.config)?;
        let payload = ProductPayload::from(&self.config);

        let existing = self.config.product_id.clone().or_else(|| self.created_product_id.clone());
        let (product_id, created) = match existing {
            Some(product_id) => {
                while let Some(image_id) = self.config.pending_deletion_ids.first().cloned() {
                    match image_store.delete_image(&product_id, &image_id).await {
                        Ok(()) => {}
                        Err(CollaboratorError::NotFound(_)) => {
                            tracing::debug!(session_id = %self.session_id, %image_id, "image already deleted");
                        }
                        Err(err) => return Err(err.into()),
                    }
                    self.config.pending_deletion_ids.remove(&image_id);
                }
                catalog.update_product(&product_id, &payload).await?;
                (product_id, self.created_product_id.is_some())
            }
            None => {
                let product_id = catalog.create_product(&payload).await?;
                self.created_product_id = Some(product_id.clone());
                (product_id, true)
            }
        };

        let mut outcome = UploadOutcome::default();
        if !self.config.pending_images.is_empty() {
            let observer = ProgressPublisher {
                bus: &self.bus,
                sequence: &self.sequence,
                session_id: self.session_id,
            };
            outcome = image_store
                .upload_images(
                    &product_id,
                    self.config.pending_images.clone(),
                    featured_upload_index(&self.config),
                    &observer,
                )
                .await?;
        }

        let baseline_primary = self
            .baseline
            .as_ref()
            .and_then(|b| b.snapshot().persisted_images.iter().find(|i| i.is_primary))
            .map(|i| &i.id);
        if let Some(primary) = self.config.persisted_images.iter().find(|i| i.is_primary) {
            if baseline_primary != Some(&primary.id) {
                image_store.set_image_primary(&product_id, &primary.id).await?;
            }
        }

        Ok((product_id, created, outcome))
    }

    /// Discard the session and everything entered in it.
    pub fn cancel(self) {
        tracing::info!(session_id = %self.session_id, dirty = self.is_dirty(), "editor cancelled");
        self.publish(EditorEvent::Cancelled { at: Utc::now() });
    }
}
