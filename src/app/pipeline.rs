//! sanitize → validate → generate, in that order, on one configuration.

use crate::app::AppContext;
use crate::domain::{
    AppError, Configuration, SanitizeReport, Template, TemplateInput, Verdict, sanitize, validate,
};
use crate::ports::TemplateGenerator;

/// Heal the configuration and decide whether it may be emitted.
pub fn check<G: TemplateGenerator>(
    ctx: &AppContext<G>,
    config: &mut Configuration,
) -> (SanitizeReport, Verdict) {
    let report = sanitize(config, ctx.catalogs());
    let verdict = validate(config, ctx.catalogs());
    (report, verdict)
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub report: SanitizeReport,
    pub template: Template,
}

/// Run the whole pipeline. The generator is never called while the gate is failing.
pub fn run<G: TemplateGenerator>(
    ctx: &AppContext<G>,
    config: &mut Configuration,
) -> Result<PipelineOutcome, AppError> {
    let (report, verdict) = check(ctx, config);
    if let Some(headline) = verdict.headline() {
        return Err(AppError::GenerationBlocked { headline, violations: verdict.messages() });
    }

    let template = ctx
        .generator()
        .generate(&TemplateInput { catalogs: ctx.catalogs(), configuration: config })?;
    Ok(PipelineOutcome { report, template })
}
