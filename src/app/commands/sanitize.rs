use std::path::Path;

use crate::adapters::config_file;
use crate::app::AppContext;
use crate::domain::{AppError, SanitizeReport, sanitize};
use crate::ports::TemplateGenerator;

#[derive(Debug, Clone, Default)]
pub struct SanitizeOptions {
    /// Write the healed configuration back to its file.
    pub write: bool,
}

#[derive(Debug, Clone)]
pub struct SanitizeOutcome {
    pub report: SanitizeReport,
    pub written: bool,
}

pub fn execute<G: TemplateGenerator>(
    ctx: &AppContext<G>,
    path: &Path,
    options: SanitizeOptions,
) -> Result<SanitizeOutcome, AppError> {
    let mut config = config_file::load(path)?;
    let report = sanitize(&mut config, ctx.catalogs());

    if options.write {
        config_file::save(path, &config)?;
    }
    Ok(SanitizeOutcome { report, written: options.write })
}

/// Lines describing what a sanitize pass changed.
pub fn summarize(report: &SanitizeReport) -> Vec<String> {
    let mut lines = Vec::new();
    for machine in &report.machines {
        lines.push(format!("{}: {}", machine.machine, machine.corrections.describe().join(", ")));
    }
    let shared = &report.shared_disks;
    for change in &shared.scrubbed {
        lines.push(format!(
            "{}: shared flag cleared on disk '{}'",
            change.machine, change.shared_disk_id
        ));
    }
    for change in &shared.demoted {
        lines.push(format!(
            "{}: shared disk '{}' already has two attachments; converted to a normal disk",
            change.machine, change.shared_disk_id
        ));
    }
    for change in &shared.synced {
        lines.push(format!(
            "{}: shared disk '{}' synced to its primary",
            change.machine, change.shared_disk_id
        ));
    }
    lines
}
