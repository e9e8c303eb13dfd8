//! Template commands: generate and import.

use std::path::{Path, PathBuf};

use crate::app::api::GenerateOptions;
use crate::domain::AppError;

pub fn run_generate(
    config: &Path,
    output: Option<PathBuf>,
    catalog_dir: Option<&Path>,
) -> Result<i32, AppError> {
    let outcome = match crate::app::api::generate(config, GenerateOptions { output }, catalog_dir) {
        Ok(outcome) => outcome,
        Err(AppError::GenerationBlocked { headline, violations }) => {
            eprintln!("❌ {}", headline);
            for violation in violations {
                eprintln!("  • {}", violation);
            }
            return Ok(1);
        }
        Err(e) => return Err(e),
    };

    let corrections = outcome.report.correction_count();
    if corrections > 0 {
        eprintln!("⚠️  Applied {} automatic correction(s) before generating", corrections);
    }
    match &outcome.written_to {
        Some(path) => {
            println!("✅ Wrote template to {} ({})", path.display(), outcome.template_hash)
        }
        None => println!("{}", outcome.template),
    }
    Ok(0)
}

pub fn run_import(
    template: &Path,
    output: &Path,
    catalog_dir: Option<&Path>,
) -> Result<(), AppError> {
    let summary = crate::app::api::import(template, output, catalog_dir)?;

    println!("✅ Imported {} machine(s) into {}", summary.imported.len(), output.display());
    for skipped in &summary.skipped {
        println!("  ⚠️  Skipped {}: {}", skipped.name, skipped.reason);
    }
    for name in &summary.payloads_cleared {
        println!("  ⚠️  {}: custom data could not be recovered and was cleared", name);
    }
    Ok(())
}
