//! Constraint types.

use serde::{Deserialize, Serialize};

use sigil_core::config::ConstraintDefaults;
use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

use crate::annotations::Annotation;

/// Lock level controlling how freely a symbol or file may be modified.
///
/// Variants are declared least-restrictive-first so the derived `Ord`
/// makes "most restrictive wins" a plain `max`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum LockLevel {
    Experimental,
    #[default]
    Normal,
    DocsRequired,
    TestsRequired,
    ApprovalRequired,
    Restricted,
    Frozen,
}

impl LockLevel {
    /// Parse the annotation/config value form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "experimental" => Some(Self::Experimental),
            "normal" => Some(Self::Normal),
            "docs-required" => Some(Self::DocsRequired),
            "tests-required" => Some(Self::TestsRequired),
            "approval-required" => Some(Self::ApprovalRequired),
            "restricted" => Some(Self::Restricted),
            "frozen" => Some(Self::Frozen),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Experimental => "experimental",
            Self::Normal => "normal",
            Self::DocsRequired => "docs-required",
            Self::TestsRequired => "tests-required",
            Self::ApprovalRequired => "approval-required",
            Self::Restricted => "restricted",
            Self::Frozen => "frozen",
        }
    }
}

impl std::fmt::Display for LockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the assistant should approach changes under this constraint set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorProfile {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl BehaviorProfile {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "conservative" => Some(Self::Conservative),
            "balanced" => Some(Self::Balanced),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }
}

/// Style constraints: a replaceable guide plus accumulating rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,
}

/// Effective constraints for one scope after cascade resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub lock_level: LockLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_reason: Option<String>,
    /// Directive text carried by the winning lock annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleConstraint>,
    pub behavior: BehaviorProfile,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality: Vec<String>,
}

/// Constraint values contributed by one cascade level, before resolution.
/// Every field is optional; absent means "this level says nothing".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_directive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_guide: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_rules: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<BehaviorProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality: Vec<String>,
}

impl ConstraintLayer {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a layer from configuration defaults. Invalid values are
    /// reported and skipped.
    pub fn from_defaults(
        defaults: &ConstraintDefaults,
        scope: &str,
        sink: &DiagnosticSink,
    ) -> Self {
        let mut layer = Self::default();
        if let Some(lock) = defaults.lock.as_deref() {
            match LockLevel::parse(lock) {
                Some(level) => layer.lock = Some(level),
                None => sink.emit(Diagnostic::new(
                    Category::Semantic,
                    Severity::Warning,
                    "invalid-lock-level",
                    format!("config {scope}: unknown lock level `{lock}`"),
                )),
            }
        }
        layer.lock_reason = defaults.lock_reason.clone();
        layer.style_guide = defaults.style_guide.clone();
        layer.style_rules = defaults.style_rules.clone();
        if let Some(behavior) = defaults.behavior.as_deref() {
            match BehaviorProfile::parse(behavior) {
                Some(profile) => layer.behavior = Some(profile),
                None => sink.emit(Diagnostic::new(
                    Category::Semantic,
                    Severity::Warning,
                    "invalid-behavior",
                    format!("config {scope}: unknown behavior `{behavior}`"),
                )),
            }
        }
        layer.quality = defaults.quality.clone();
        layer
    }

    /// Fold one constraint annotation into this layer.
    ///
    /// Within a single level, scalars are last-defined-wins and arrays
    /// accumulate, matching the builder's merge rule.
    pub fn apply_annotation(&mut self, ann: &Annotation, path: &str, sink: &DiagnosticSink) {
        match ann.namespace.as_str() {
            "lock" => match ann.value.as_deref().map(LockLevel::parse) {
                Some(Some(level)) => {
                    self.lock = Some(level);
                    self.lock_directive = Some(ann.directive.clone());
                }
                Some(None) => sink.emit(
                    Diagnostic::new(
                        Category::Semantic,
                        Severity::Warning,
                        "invalid-lock-level",
                        format!(
                            "unknown lock level `{}`",
                            ann.value.as_deref().unwrap_or_default()
                        ),
                    )
                    .at(path, Some(ann.source_line)),
                ),
                None => sink.emit(
                    Diagnostic::new(
                        Category::Semantic,
                        Severity::Warning,
                        "invalid-lock-level",
                        "`@acp:lock` requires a level value",
                    )
                    .at(path, Some(ann.source_line)),
                ),
            },
            "style" => match ann.sub_namespace.as_deref() {
                Some("rules") => {
                    if let Some(value) = ann.value.as_deref() {
                        for rule in value.split(',').map(str::trim).filter(|r| !r.is_empty()) {
                            if !self.style_rules.iter().any(|r| r == rule) {
                                self.style_rules.push(rule.to_string());
                            }
                        }
                    }
                }
                Some("guide") | None => {
                    self.style_guide = ann.value.clone();
                }
                Some(_) => {}
            },
            "behavior" => match ann.value.as_deref().map(BehaviorProfile::parse) {
                Some(Some(profile)) => self.behavior = Some(profile),
                _ => sink.emit(
                    Diagnostic::new(
                        Category::Semantic,
                        Severity::Warning,
                        "invalid-behavior",
                        format!(
                            "unknown behavior `{}`",
                            ann.value.as_deref().unwrap_or_default()
                        ),
                    )
                    .at(path, Some(ann.source_line)),
                ),
            },
            "quality" => {
                if let Some(value) = ann.value.as_deref() {
                    for gate in value.split(',').map(str::trim).filter(|g| !g.is_empty()) {
                        if !self.quality.iter().any(|q| q == gate) {
                            self.quality.push(gate.to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_total_order() {
        assert!(LockLevel::Frozen > LockLevel::Restricted);
        assert!(LockLevel::Restricted > LockLevel::ApprovalRequired);
        assert!(LockLevel::ApprovalRequired > LockLevel::TestsRequired);
        assert!(LockLevel::TestsRequired > LockLevel::DocsRequired);
        assert!(LockLevel::DocsRequired > LockLevel::Normal);
        assert!(LockLevel::Normal > LockLevel::Experimental);
    }

    #[test]
    fn test_lock_parse_roundtrip() {
        for s in [
            "frozen",
            "restricted",
            "approval-required",
            "tests-required",
            "docs-required",
            "normal",
            "experimental",
        ] {
            assert_eq!(LockLevel::parse(s).unwrap().as_str(), s);
        }
        assert!(LockLevel::parse("review-required").is_none());
    }

    #[test]
    fn test_layer_from_defaults_reports_bad_values() {
        let defaults = ConstraintDefaults {
            lock: Some("very-locked".to_string()),
            ..Default::default()
        };
        let sink = DiagnosticSink::new();
        let layer = ConstraintLayer::from_defaults(&defaults, "project", &sink);
        assert!(layer.lock.is_none());
        assert_eq!(sink.snapshot()[0].code, "invalid-lock-level");
    }
}
