pub mod catalog;
pub mod clone;
pub mod error;
pub mod identifiers;
pub mod import;
pub mod model;
pub mod resolver;
pub mod sanitize;
pub mod shared_disk;
pub mod template;
pub mod validation;

pub use catalog::{Catalogs, CatalogError, RawCatalogs};
pub use error::AppError;
pub use import::{ImportError, ImportOutcome, PayloadRecovery};
pub use model::Configuration;
pub use sanitize::{SanitizeReport, sanitize};
pub use template::{Template, TemplateInput};
pub use validation::{Category, Verdict, Violation, validate};
