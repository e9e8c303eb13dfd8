use crate::domain::template;
use crate::domain::{AppError, Template, TemplateInput};
use crate::ports::TemplateGenerator;

/// Generator emitting Azure Resource Manager JSON.
#[derive(Debug, Clone, Default)]
pub struct ArmTemplateGenerator;

impl ArmTemplateGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateGenerator for ArmTemplateGenerator {
    fn generate(&self, input: &TemplateInput<'_>) -> Result<Template, AppError> {
        template::generate(input)
    }
}
