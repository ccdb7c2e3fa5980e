//! Pipeline errors.

use super::error_code::{self, SigilErrorCode};
use super::{ConfigError, ExpandError};
use crate::diagnostics::Diagnostic;

/// Errors that abort an indexing run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Expansion error: {0}")]
    Expand(#[from] ExpandError),

    /// Strict mode: the first diagnostic above warning aborts the run.
    #[error("strict mode abort: {}", .0.message)]
    Strict(Diagnostic),

    #[error("run cancelled")]
    Cancelled,
}

impl SigilErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Expand(e) => e.error_code(),
            Self::Strict(_) => error_code::PIPELINE_STRICT,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
