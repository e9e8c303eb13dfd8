//! vmtemplate: declare Azure virtual machines and emit validated ARM deployment templates.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::{
    CatalogSummary, CloneOutcome, GenerateOptions, GenerateOutcome, ImageSummary, ImportSummary,
    SanitizeOptions, SanitizeOutcome, SizeSummary, catalog_check, catalog_images, catalog_sizes,
    clone_machine, generate, import, sanitize, validate,
};
pub use domain::{AppError, Category, Configuration, Template, TemplateInput, Verdict, Violation};
