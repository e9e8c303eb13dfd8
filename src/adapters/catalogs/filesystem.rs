use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{IMAGES_FILE, SIZES_FILE};
use crate::domain::{AppError, RawCatalogs};
use crate::ports::CatalogStore;

/// Catalogs read from `images.json` and `sizes.json` in a directory.
#[derive(Debug, Clone)]
pub struct FilesystemCatalogStore {
    root: PathBuf,
}

impl FilesystemCatalogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, name: &str) -> Result<Value, AppError> {
        let path = self.root.join(name);
        let content = fs::read_to_string(&path).map_err(|e| {
            AppError::config_error(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| AppError::ParseError {
            what: path.display().to_string(),
            details: e.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CatalogStore for FilesystemCatalogStore {
    fn load(&self) -> Result<RawCatalogs, AppError> {
        Ok(RawCatalogs { images: self.read(IMAGES_FILE)?, sizes: self.read(SIZES_FILE)? })
    }

    fn describe(&self) -> String {
        format!("catalogs in {}", self.root.display())
    }
}
