//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits sane)
//! - Check the provider URL parses and uses HTTP(S)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: TzkitConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::TzkitConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem, keyed by its TOML path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &TzkitConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.node.provider_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "node.provider_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "node.provider_url",
            format!("invalid URL '{}': {}", config.node.provider_url, e),
        )),
    }

    let chain = config.node.chain.as_str();
    if chain.trim().is_empty() {
        errors.push(ValidationError::new("node.chain", "must not be empty"));
    } else if chain.contains('/') {
        errors.push(ValidationError::new("node.chain", "must not contain '/'"));
    }

    if config.node.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "node.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.wallet.default_gas_limit == 0 {
        errors.push(ValidationError::new(
            "wallet.default_gas_limit",
            "must be greater than 0",
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
