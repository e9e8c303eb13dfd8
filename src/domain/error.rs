use std::io;

use thiserror::Error;

use crate::domain::catalog::CatalogError;
use crate::domain::import::ImportError;

/// Library-wide error type for vmtemplate operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Catalog failed startup validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Import of a previously generated template failed.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// Serialization error.
    #[error("Failed to serialize {what}: {details}")]
    SerializeError { what: String, details: String },

    /// Machine not present in the configuration.
    #[error("Machine '{0}' not found")]
    MachineNotFound(String),

    /// Size name not present in the size catalog.
    #[error("Size '{0}' not found in the size catalog")]
    SizeNotFound(String),

    /// Image key not present in the image catalog.
    #[error("Image '{0}' not found in the image catalog")]
    ImageNotFound(String),

    /// Adding another NIC or data disk would exceed the size's ceiling.
    #[error("Machine '{machine}' already has the maximum of {max} {what} for size '{size}'")]
    AttachmentLimit { machine: String, size: String, what: &'static str, max: u32 },

    /// Shared disk operation refused.
    #[error("Shared disk '{id}': {reason}")]
    SharedDisk { id: String, reason: String },

    /// Data disk index out of range.
    #[error("Machine '{machine}' has no data disk at index {index}")]
    DiskNotFound { machine: String, index: usize },

    /// The validation gate failed; no template was produced.
    #[error("Template generation blocked: {headline}")]
    GenerationBlocked { headline: String, violations: Vec<String> },

    /// Template rendering failed.
    #[error("Template rendering failed: {0}")]
    Render(String),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// Provide an `io::ErrorKind`-like view for callers mapping errors to exit codes.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::Configuration(_)
            | AppError::Catalog(_)
            | AppError::Import(_)
            | AppError::ParseError { .. }
            | AppError::AttachmentLimit { .. }
            | AppError::SharedDisk { .. }
            | AppError::GenerationBlocked { .. } => io::ErrorKind::InvalidInput,
            AppError::MachineNotFound(_)
            | AppError::SizeNotFound(_)
            | AppError::ImageNotFound(_)
            | AppError::DiskNotFound { .. } => io::ErrorKind::NotFound,
            AppError::SerializeError { .. } | AppError::Render(_) => io::ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_generation_reports_headline() {
        let err = AppError::GenerationBlocked {
            headline: "Disk 1 on 'vm1' must be larger than 1 GB".into(),
            violations: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Template generation blocked: Disk 1 on 'vm1' must be larger than 1 GB"
        );
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn missing_machine_maps_to_not_found() {
        assert_eq!(AppError::MachineNotFound("vm9".into()).kind(), io::ErrorKind::NotFound);
    }
}
