//! sigil-core: shared foundation for the sigil annotation engine.
//!
//! Holds the pieces every subsystem needs:
//! - Configuration: typed config structs with compiled defaults
//! - Errors: one `thiserror` enum per subsystem, zero `anyhow`
//! - Diagnostics: the structured diagnostics stream all components report to
//! - Cancellation: cooperative token checked at task boundaries

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod traits;

pub use config::{
    ClassifierConfig, ConstraintDefaults, ContinuationTarget, DomainPatternConfig, LimitsConfig,
    ParserConfig, SigilConfig, Strictness,
};
pub use diagnostics::{Category, Diagnostic, DiagnosticSink, Location, Severity};
pub use errors::{ConfigError, ExpandError, PipelineError, SigilErrorCode};
pub use traits::{Cancellable, CancellationToken};
