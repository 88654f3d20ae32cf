//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("limits.max_line_length must be greater than 0")]
    ZeroLineLength,
    #[error("limits.message_burst must be at least 1 when message_rate is set")]
    ZeroMessageBurst,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    let limits = &config.limits;
    if limits.max_line_length == 0 {
        errors.push(ValidationError::ZeroLineLength);
    }
    if limits.flood_limit_enabled() && limits.message_burst == 0 {
        errors.push(ValidationError::ZeroMessageBurst);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
