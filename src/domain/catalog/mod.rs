//! Image and size catalogs: static compatibility tables validated once at startup.

mod error;
mod image;
mod size;
pub mod validate;

use serde_json::Value;

pub use error::CatalogError;
pub use image::{Architecture, Generation, ImageCatalogEntry, ImageRef};
pub use size::{AccelNetMode, DiskController, DiskSku, SizeCatalogEntry, SizeTags};

use crate::domain::AppError;

/// Undeserialized catalog documents as supplied by a catalog store.
#[derive(Debug, Clone)]
pub struct RawCatalogs {
    pub images: Value,
    pub sizes: Value,
}

/// Validated, read-only catalogs.
#[derive(Debug, Clone)]
pub struct Catalogs {
    images: Vec<ImageCatalogEntry>,
    sizes: Vec<SizeCatalogEntry>,
}

impl Catalogs {
    /// Validate raw catalog documents and deserialize them.
    ///
    /// Fails with every integrity issue found; a catalog that fails here must not be used.
    pub fn from_raw(raw: &RawCatalogs) -> Result<Self, AppError> {
        validate::check(raw)?;

        let images = serde_json::from_value(raw.images.clone()).map_err(|e| {
            AppError::ParseError { what: "image catalog".into(), details: e.to_string() }
        })?;
        let sizes = serde_json::from_value(raw.sizes.clone()).map_err(|e| {
            AppError::ParseError { what: "size catalog".into(), details: e.to_string() }
        })?;

        Ok(Self { images, sizes })
    }

    pub fn images(&self) -> &[ImageCatalogEntry] {
        &self.images
    }

    pub fn sizes(&self) -> &[SizeCatalogEntry] {
        &self.sizes
    }

    pub fn size(&self, name: &str) -> Option<&SizeCatalogEntry> {
        self.sizes.iter().find(|s| s.name == name)
    }

    pub fn size_ignore_case(&self, name: &str) -> Option<&SizeCatalogEntry> {
        self.sizes.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn image(&self, key: &str) -> Option<&ImageCatalogEntry> {
        self.images.iter().find(|i| i.key == key)
    }

    /// Find an image by marketplace coordinates, ignoring case and version.
    pub fn image_by_ref(
        &self,
        publisher: &str,
        offer: &str,
        sku: &str,
    ) -> Option<&ImageCatalogEntry> {
        self.images.iter().find(|i| i.image_ref.matches(publisher, offer, sku))
    }

    /// Distinct publishers in catalog order.
    pub fn publishers(&self) -> Vec<&str> {
        let mut publishers: Vec<&str> = Vec::new();
        for image in &self.images {
            if !publishers.contains(&image.image_ref.publisher.as_str()) {
                publishers.push(&image.image_ref.publisher);
            }
        }
        publishers
    }
}
