use include_dir::{Dir, include_dir};
use serde_json::Value;

use super::{IMAGES_FILE, SIZES_FILE};
use crate::domain::{AppError, RawCatalogs};
use crate::ports::CatalogStore;

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/catalog");

/// Catalogs compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedCatalogStore;

impl EmbeddedCatalogStore {
    pub fn new() -> Self {
        Self
    }
}

fn read_embedded(name: &str) -> Result<Value, AppError> {
    let content = CATALOG_DIR
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| AppError::config_error(format!("Embedded catalog '{}' is missing", name)))?;
    serde_json::from_str(content).map_err(|e| AppError::ParseError {
        what: format!("embedded {}", name),
        details: e.to_string(),
    })
}

impl CatalogStore for EmbeddedCatalogStore {
    fn load(&self) -> Result<RawCatalogs, AppError> {
        Ok(RawCatalogs { images: read_embedded(IMAGES_FILE)?, sizes: read_embedded(SIZES_FILE)? })
    }

    fn describe(&self) -> String {
        "embedded catalogs".to_string()
    }
}
