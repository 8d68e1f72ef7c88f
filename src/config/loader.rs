//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::TzkitConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<TzkitConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: TzkitConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), chain = %config.node.chain, "Configuration loaded");
    Ok(config)
}

/// Loads `path` when given, otherwise returns the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<TzkitConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(TzkitConfig::default()),
    }
}
