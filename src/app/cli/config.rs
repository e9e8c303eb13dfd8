//! Configuration editing commands: sanitize, validate and clone.

use std::path::Path;

use crate::app::api::SanitizeOptions;
use crate::app::commands::sanitize::summarize;
use crate::domain::{AppError, SanitizeReport};

fn print_report(report: &SanitizeReport) {
    for line in summarize(report) {
        println!("  • {}", line);
    }
}

pub fn run_sanitize(
    config: &Path,
    write: bool,
    catalog_dir: Option<&Path>,
) -> Result<(), AppError> {
    let outcome = crate::app::api::sanitize(config, SanitizeOptions { write }, catalog_dir)?;

    if outcome.report.is_empty() {
        println!("✅ Configuration already consistent");
        return Ok(());
    }
    println!("Sanitize changes:");
    print_report(&outcome.report);
    if outcome.written {
        println!("✅ Updated {}", config.display());
    } else {
        println!("Run with --write to apply.");
    }
    Ok(())
}

/// Prints the diagnosis and returns a non-zero exit code when generation would be blocked.
pub fn run_validate(config: &Path, catalog_dir: Option<&Path>) -> Result<i32, AppError> {
    let verdict = crate::app::api::validate(config, catalog_dir)?;

    match verdict.headline() {
        None => {
            println!("✅ Configuration is valid");
            Ok(0)
        }
        Some(headline) => {
            eprintln!("❌ {}", headline);
            for violation in verdict.violations() {
                eprintln!("  • [{}] {}", violation.category, violation);
            }
            Ok(1)
        }
    }
}

pub fn run_clone(
    config: &Path,
    machine: &str,
    write: bool,
    catalog_dir: Option<&Path>,
) -> Result<(), AppError> {
    let outcome = crate::app::api::clone_machine(config, machine, write, catalog_dir)?;

    println!("✅ Cloned {} as {}", outcome.source, outcome.clone);
    print_report(&outcome.report);
    if !outcome.written {
        println!("Run with --write to apply.");
    }
    Ok(())
}
