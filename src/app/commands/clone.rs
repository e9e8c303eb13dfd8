use std::path::Path;

use crate::adapters::config_file;
use crate::app::AppContext;
use crate::domain::{AppError, SanitizeReport, sanitize};
use crate::ports::TemplateGenerator;

#[derive(Debug, Clone)]
pub struct CloneOutcome {
    pub source: String,
    pub clone: String,
    pub report: SanitizeReport,
    pub written: bool,
}

/// Clone a machine (by id or name) and sanitize the result.
pub fn execute<G: TemplateGenerator>(
    ctx: &AppContext<G>,
    path: &Path,
    machine: &str,
    write: bool,
) -> Result<CloneOutcome, AppError> {
    let mut config = config_file::load(path)?;
    let source = config
        .find_machine(machine)
        .map(|m| (m.id.clone(), m.name.clone()))
        .ok_or_else(|| AppError::MachineNotFound(machine.to_string()))?;

    let new_id = config.clone_machine(&source.0)?;
    let report = sanitize(&mut config, ctx.catalogs());
    let clone = config.machine(&new_id).map(|m| m.name.clone()).unwrap_or_default();

    if write {
        config_file::save(path, &config)?;
    }
    Ok(CloneOutcome { source: source.1, clone, report, written: write })
}
