//! Variable expansion errors (fatal paths only; advisory findings go
//! through the diagnostics stream).

use super::error_code::{self, SigilErrorCode};

/// Errors raised by the variable expansion engine in strict mode.
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    #[error("unresolved variable ${name}")]
    Unresolved { name: String },

    #[error("circular variable reference: {path}")]
    Circular { path: String },
}

impl SigilErrorCode for ExpandError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unresolved { .. } => error_code::EXPAND_UNRESOLVED,
            Self::Circular { .. } => error_code::EXPAND_CIRCULAR,
        }
    }
}
