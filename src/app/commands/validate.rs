use std::path::Path;

use crate::adapters::config_file;
use crate::app::{AppContext, pipeline};
use crate::domain::{AppError, Verdict};
use crate::ports::TemplateGenerator;

/// Validate a configuration file as it would be after sanitize. The file is not modified.
pub fn execute<G: TemplateGenerator>(
    ctx: &AppContext<G>,
    path: &Path,
) -> Result<Verdict, AppError> {
    let mut config = config_file::load(path)?;
    let (_, verdict) = pipeline::check(ctx, &mut config);
    Ok(verdict)
}
