use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::config_file;
use crate::app::{AppContext, pipeline};
use crate::domain::{AppError, SanitizeReport};
use crate::ports::TemplateGenerator;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Write the template here instead of returning it only.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub report: SanitizeReport,
    pub template: String,
    pub template_hash: String,
    pub written_to: Option<PathBuf>,
}

pub fn execute<G: TemplateGenerator>(
    ctx: &AppContext<G>,
    path: &Path,
    options: GenerateOptions,
) -> Result<GenerateOutcome, AppError> {
    let mut config = config_file::load(path)?;
    let outcome = pipeline::run(ctx, &mut config)?;
    let template = outcome.template.to_pretty_string()?;

    if let Some(output) = &options.output {
        fs::write(output, format!("{}\n", template))?;
    }
    Ok(GenerateOutcome {
        report: outcome.report,
        template_hash: outcome.template.template_hash().to_string(),
        template,
        written_to: options.output,
    })
}
