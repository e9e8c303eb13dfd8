//! API Facade for the application.
//!
//! This module exposes high-level functions that glue together context creation
//! and command execution.

use std::path::Path;

use crate::adapters::arm_template::ArmTemplateGenerator;
use crate::adapters::catalogs::{EmbeddedCatalogStore, FilesystemCatalogStore};
use crate::app::{AppContext, commands};

pub use crate::app::commands::catalog::{CatalogSummary, ImageSummary, SizeSummary};
pub use crate::app::commands::clone::CloneOutcome;
pub use crate::app::commands::generate::{GenerateOptions, GenerateOutcome};
pub use crate::app::commands::import::ImportSummary;
pub use crate::app::commands::sanitize::{SanitizeOptions, SanitizeOutcome};
pub use crate::domain::{AppError, Verdict};

/// Create an `AppContext` from a catalog directory, or the embedded catalogs when none is given.
fn create_context(
    catalog_dir: Option<&Path>,
) -> Result<AppContext<ArmTemplateGenerator>, AppError> {
    match catalog_dir {
        Some(dir) => {
            AppContext::load(&FilesystemCatalogStore::new(dir), ArmTemplateGenerator::new())
        }
        None => AppContext::load(&EmbeddedCatalogStore::new(), ArmTemplateGenerator::new()),
    }
}

// =============================================================================
// Catalog API
// =============================================================================

/// Load and validate the catalogs.
pub fn catalog_check(catalog_dir: Option<&Path>) -> Result<CatalogSummary, AppError> {
    let ctx = create_context(catalog_dir)?;
    Ok(commands::catalog::check(&ctx))
}

pub fn catalog_sizes(catalog_dir: Option<&Path>) -> Result<Vec<SizeSummary>, AppError> {
    let ctx = create_context(catalog_dir)?;
    Ok(commands::catalog::list_sizes(&ctx))
}

pub fn catalog_images(catalog_dir: Option<&Path>) -> Result<Vec<ImageSummary>, AppError> {
    let ctx = create_context(catalog_dir)?;
    Ok(commands::catalog::list_images(&ctx))
}

// =============================================================================
// Configuration API
// =============================================================================

/// Heal a configuration file, optionally writing the result back.
pub fn sanitize(
    config: &Path,
    options: SanitizeOptions,
    catalog_dir: Option<&Path>,
) -> Result<SanitizeOutcome, AppError> {
    let ctx = create_context(catalog_dir)?;
    commands::sanitize::execute(&ctx, config, options)
}

/// Validate a configuration file without modifying it.
pub fn validate(config: &Path, catalog_dir: Option<&Path>) -> Result<Verdict, AppError> {
    let ctx = create_context(catalog_dir)?;
    commands::validate::execute(&ctx, config)
}

/// Duplicate a machine under a fresh clone name.
pub fn clone_machine(
    config: &Path,
    machine: &str,
    write: bool,
    catalog_dir: Option<&Path>,
) -> Result<CloneOutcome, AppError> {
    let ctx = create_context(catalog_dir)?;
    commands::clone::execute(&ctx, config, machine, write)
}

// =============================================================================
// Template API
// =============================================================================

/// Sanitize, validate and generate a deployment template.
///
/// Fails with [`AppError::GenerationBlocked`] when the configuration has errors.
pub fn generate(
    config: &Path,
    options: GenerateOptions,
    catalog_dir: Option<&Path>,
) -> Result<GenerateOutcome, AppError> {
    let ctx = create_context(catalog_dir)?;
    commands::generate::execute(&ctx, config, options)
}

/// Rebuild a configuration file from a previously generated template.
pub fn import(
    template: &Path,
    output: &Path,
    catalog_dir: Option<&Path>,
) -> Result<ImportSummary, AppError> {
    let ctx = create_context(catalog_dir)?;
    commands::import::execute(&ctx, template, output)
}
