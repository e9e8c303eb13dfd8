use crate::domain::{AppError, Template, TemplateInput};

/// Port for turning a validated configuration into a deployment template.
pub trait TemplateGenerator {
    fn generate(&self, input: &TemplateInput<'_>) -> Result<Template, AppError>;
}
