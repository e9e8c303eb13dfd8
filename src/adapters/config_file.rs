//! Machine configuration files: TOML or YAML, chosen by extension.

use std::fs;
use std::path::Path;

use crate::domain::{AppError, Configuration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yml") | Some("yaml") => Ok(ConfigFormat::Yaml),
            _ => Err(AppError::config_error(format!(
                "Unsupported configuration file '{}': expected .toml, .yml or .yaml",
                path.display()
            ))),
        }
    }
}

pub fn parse(content: &str, format: ConfigFormat, what: &str) -> Result<Configuration, AppError> {
    let parsed = match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|details| AppError::ParseError { what: what.to_string(), details })
}

pub fn render(config: &Configuration, format: ConfigFormat) -> Result<String, AppError> {
    let rendered = match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::to_string(config).map_err(|e| e.to_string()),
    };
    rendered.map_err(|details| AppError::SerializeError { what: "configuration".into(), details })
}

/// Read a configuration file. Missing machine and NIC ids are assigned.
pub fn load(path: &Path) -> Result<Configuration, AppError> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let mut config = parse(&content, format, &path.display().to_string())?;
    config.assign_missing_ids();
    Ok(config)
}

/// Write a configuration file in the format its extension names.
pub fn save(path: &Path, config: &Configuration) -> Result<(), AppError> {
    let format = ConfigFormat::from_path(path)?;
    fs::write(path, render(config, format)?)?;
    Ok(())
}
