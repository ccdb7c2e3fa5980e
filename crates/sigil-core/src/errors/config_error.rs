//! Configuration errors.

use super::error_code::{self, SigilErrorCode};

/// Errors raised while parsing or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config at {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid config value for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("invalid glob pattern {pattern:?} in domain {domain:?}: {message}")]
    InvalidPattern {
        domain: String,
        pattern: String,
        message: String,
    },
}

impl SigilErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ParseError { .. } => error_code::CONFIG_PARSE,
            Self::ValidationFailed { .. } => error_code::CONFIG_VALIDATION,
            Self::InvalidPattern { .. } => error_code::CONFIG_PATTERN,
        }
    }
}
