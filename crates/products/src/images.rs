//! Image selection over two parallel lists: images already stored for the
//! product and files picked in this session but not yet uploaded.
//!
//! At most one image across both lists is the primary one. A persisted primary
//! is flagged on the image itself; a pending one is `featured_pending_index`.
//! Setting one clears the other.

use serde::{Deserialize, Serialize};

use storefront_core::entity::position_of;
use storefront_core::{DomainError, DomainResult, Entity, ImageId};

use crate::configuration::ProductConfiguration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedImage {
    pub id: ImageId,
    pub url: String,
    pub is_primary: bool,
}

impl Entity for PersistedImage {
    type Id = ImageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Host-side handle to a selected file. The bytes stay with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingImage {
    pub preview_url: String,
    pub file: FileHandle,
}

pub fn add_pending<I>(config: &mut ProductConfiguration, files: I)
where
    I: IntoIterator<Item = PendingImage>,
{
    config.pending_images.extend(files);
}

/// Drop a pending file. The featured index follows its image, or clears if
/// the featured image itself was removed.
pub fn remove_pending(config: &mut ProductConfiguration, index: usize) -> DomainResult<()> {
    if index >= config.pending_images.len() {
        return Err(DomainError::not_found());
    }
    config.pending_images.remove(index);

    config.featured_pending_index = match config.featured_pending_index {
        Some(featured) if featured == index => None,
        Some(featured) if featured > index => Some(featured - 1),
        other => other,
    };
    Ok(())
}

/// Schedule a stored image for deletion.
///
/// Deleting the primary image does not promote another one; the product stays
/// without a primary until the merchant picks one.
pub fn remove_persisted(config: &mut ProductConfiguration, id: &ImageId) -> DomainResult<()> {
    let index = position_of(&config.persisted_images, id).ok_or_else(DomainError::not_found)?;
    let removed = config.persisted_images.remove(index);
    config.pending_deletion_ids.insert(removed.id);
    Ok(())
}

pub fn set_persisted_primary(config: &mut ProductConfiguration, id: &ImageId) -> DomainResult<()> {
    if position_of(&config.persisted_images, id).is_none() {
        return Err(DomainError::not_found());
    }
    for image in &mut config.persisted_images {
        image.is_primary = &image.id == id;
    }
    config.featured_pending_index = None;
    Ok(())
}

pub fn set_pending_featured(config: &mut ProductConfiguration, index: usize) -> DomainResult<()> {
    if index >= config.pending_images.len() {
        return Err(DomainError::not_found());
    }
    for image in &mut config.persisted_images {
        image.is_primary = false;
    }
    config.featured_pending_index = Some(index);
    Ok(())
}

/// URL of the image the host shows as the product's representative image.
///
/// Persisted primary, else featured pending image, else first pending image.
pub fn primary_image_url(config: &ProductConfiguration) -> Option<&str> {
    if let Some(image) = config.persisted_images.iter().find(|i| i.is_primary) {
        return Some(&image.url);
    }
    config
        .featured_pending_index
        .and_then(|index| config.pending_images.get(index))
        .or_else(|| config.pending_images.first())
        .map(|image| image.preview_url.as_str())
}

/// `featuredIndex` argument for the upload collaborator.
pub fn featured_upload_index(config: &ProductConfiguration) -> Option<usize> {
    config
        .featured_pending_index
        .filter(|index| *index < config.pending_images.len())
}

/// Number of images currently designated primary across both lists.
pub fn primary_count(config: &ProductConfiguration) -> usize {
    let persisted = config.persisted_images.iter().filter(|i| i.is_primary).count();
    persisted + usize::from(featured_upload_index(config).is_some())
}

pub fn has_primary(config: &ProductConfiguration) -> bool {
    primary_count(config) > 0
}

#[cfg(test)]
pub(crate) fn pending(name: &str) -> PendingImage {
    PendingImage {
        preview_url: format!("blob:{name}"),
        file: FileHandle {
            name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: 1024,
        },
    }
}

#[cfg(test)]
pub(crate) fn persisted(id: &str, is_primary: bool) -> PersistedImage {
    PersistedImage {
        id: ImageId::new(id),
        url: format!("https://cdn.example/{id}.jpg"),
        is_primary,
    }
}
