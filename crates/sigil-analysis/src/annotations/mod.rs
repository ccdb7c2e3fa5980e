//! Annotation subsystem: `@acp:` grammar parsing and directive validation.

pub mod directive;
pub mod grammar;
pub mod namespace;

pub use directive::validate_annotations;
pub use grammar::parse_block;
pub use namespace::{is_extension, reserved_spec, NamespaceSpec};

use serde::{Deserialize, Serialize};

/// One parsed `@acp:namespace value - directive` unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Namespace, e.g. `lock` or `x-acme` for extensions.
    pub namespace: String,
    /// Sub-namespace, e.g. the `rules` of `style:rules`, or the feature of
    /// an `x-{vendor}:{feature}` extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_namespace: Option<String>,
    /// Primary value after the namespace, unquoted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Self-documenting directive text after the ` - ` separator. Empty
    /// until the validator has run when the author omitted it.
    pub directive: String,
    /// True when the directive was synthesized from per-namespace defaults.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_generated: bool,
    /// 1-indexed source line.
    pub source_line: usize,
    /// True when at least one continuation line was absorbed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub continued: bool,
}

impl Annotation {
    /// True for `x-{vendor}:{feature}` extension annotations, which pass
    /// through opaquely and are never interpreted.
    pub fn is_extension(&self) -> bool {
        namespace::is_extension(&self.namespace)
    }
}
