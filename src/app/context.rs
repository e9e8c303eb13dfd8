use tracing::info;

use crate::domain::{AppError, Catalogs};
use crate::ports::{CatalogStore, TemplateGenerator};

/// Application context holding the validated catalogs and the template generator.
pub struct AppContext<G: TemplateGenerator> {
    catalogs: Catalogs,
    generator: G,
}

impl<G: TemplateGenerator> AppContext<G> {
    /// Load catalogs from a store and validate them. Fails on any catalog issue.
    pub fn load(store: &impl CatalogStore, generator: G) -> Result<Self, AppError> {
        let raw = store.load()?;
        let catalogs = Catalogs::from_raw(&raw)?;
        info!(
            source = %store.describe(),
            images = catalogs.images().len(),
            sizes = catalogs.sizes().len(),
            "catalogs loaded"
        );
        Ok(Self { catalogs, generator })
    }

    /// Create a context from catalogs that are already validated.
    pub fn new(catalogs: Catalogs, generator: G) -> Self {
        Self { catalogs, generator }
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}
