use crate::domain::{AppError, RawCatalogs};

/// Port for loading the raw image and size catalogs.
pub trait CatalogStore {
    /// Load both catalog documents. Validation happens in the caller.
    fn load(&self) -> Result<RawCatalogs, AppError>;

    /// Human-readable origin of the catalogs, for log and error messages.
    fn describe(&self) -> String;
}
