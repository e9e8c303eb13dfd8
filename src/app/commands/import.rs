use std::fs;
use std::path::Path;

use crate::adapters::config_file;
use crate::app::AppContext;
use crate::domain::import::{self, PayloadRecovery, SkippedMachine};
use crate::domain::{AppError, SanitizeReport, sanitize};
use crate::ports::TemplateGenerator;

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub imported: Vec<String>,
    /// Machines whose encoded custom data had to be dropped.
    pub payloads_cleared: Vec<String>,
    pub skipped: Vec<SkippedMachine>,
    pub report: SanitizeReport,
}

/// Import a generated template and write the resulting configuration to `output`.
///
/// Any existing configuration at `output` is replaced, even when some machines were skipped.
pub fn execute<G: TemplateGenerator>(
    ctx: &AppContext<G>,
    template: &Path,
    output: &Path,
) -> Result<ImportSummary, AppError> {
    let text = fs::read_to_string(template)?;
    let outcome = import::import_str(&text, ctx.catalogs())?;

    let imported = outcome.machines.iter().map(|m| m.machine.name.clone()).collect();
    let payloads_cleared = outcome
        .machines
        .iter()
        .filter(|m| m.payload == PayloadRecovery::ClearedOnImport)
        .map(|m| m.machine.name.clone())
        .collect();
    let skipped = outcome.skipped.clone();

    let mut config = outcome.into_configuration();
    let report = sanitize(&mut config, ctx.catalogs());
    config_file::save(output, &config)?;

    Ok(ImportSummary { imported, payloads_cleared, skipped, report })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::app::commands::generate::{self, GenerateOptions};
    use crate::testing::context;

    #[test]
    fn generated_template_imports_back() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("vms.toml");
        fs::write(
            &source,
            r#"
[[machines]]
name = "web"
size = "Standard_D2s_v5"
custom_data = "echo hi"
[[machines.nics]]
name = "nic1"
"#,
        )
        .unwrap();
        let template = dir.path().join("azuredeploy.json");
        let ctx = context();
        let options = GenerateOptions { output: Some(template.clone()) };
        generate::execute(&ctx, &source, options).unwrap();

        let output = dir.path().join("imported.yaml");
        let summary = execute(&ctx, &template, &output).unwrap();

        assert_eq!(summary.imported, vec!["web"]);
        assert_eq!(summary.payloads_cleared, vec!["web"]);
        let config = config_file::load(&output).unwrap();
        assert_eq!(config.machines[0].size, "Standard_D2s_v5");
        assert!(config.machines[0].custom_data.is_empty());
    }

    #[test]
    fn total_failure_leaves_output_untouched() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("t.json");
        fs::write(&template, r#"{"resources": []}"#).unwrap();
        let output = dir.path().join("out.toml");

        let err = execute(&context(), &template, &output).unwrap_err();

        assert!(matches!(err, AppError::Import(_)));
        assert!(!output.exists());
    }
}
