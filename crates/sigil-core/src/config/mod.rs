//! Configuration for a sigil run.
//!
//! File discovery and config-file location are the caller's concern; the
//! core only parses, validates, and applies defaults.

pub mod limits;
pub mod sigil_config;

pub use limits::LimitsConfig;
pub use sigil_config::{
    ClassifierConfig, ConstraintDefaults, ContinuationTarget, DomainPatternConfig, ParserConfig,
    SigilConfig, Strictness,
};
