//! Top-level sigil configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::LimitsConfig;
use crate::errors::ConfigError;

/// Run-wide strictness policy.
///
/// Permissive mode records every diagnostic and continues with best-effort
/// defaults; strict mode aborts on the first diagnostic above warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[default]
    Permissive,
    Strict,
}

/// Which annotation field a continuation line extends when both the value
/// and the directive are already present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContinuationTarget {
    #[default]
    Directive,
    Value,
}

/// Annotation parser knobs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParserConfig {
    pub continuation_target: ContinuationTarget,
    /// Minimum directive length before the validator flags it as low quality.
    pub min_directive_len: Option<usize>,
}

impl ParserConfig {
    pub fn effective_min_directive_len(&self) -> usize {
        self.min_directive_len.unwrap_or(3)
    }
}

/// Domain/layer classifier knobs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Fraction of a file's resolved imports that must belong to one
    /// already-classified domain before the heuristic applies.
    pub majority_threshold: Option<f64>,
}

impl ClassifierConfig {
    pub fn effective_majority_threshold(&self) -> f64 {
        self.majority_threshold.unwrap_or(0.6)
    }
}

/// Path patterns assigning files to a domain when no annotation says so.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DomainPatternConfig {
    /// Glob patterns, root-relative (e.g. `src/billing/**`).
    pub patterns: Vec<String>,
    pub description: Option<String>,
    /// Layer applied alongside the domain, if any.
    pub layer: Option<String>,
}

/// Constraint values supplied by configuration for one cascade level.
///
/// Values are kept as strings here; the resolver parses them and reports
/// invalid values through the diagnostics stream.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConstraintDefaults {
    pub lock: Option<String>,
    pub lock_reason: Option<String>,
    pub style_guide: Option<String>,
    pub style_rules: Vec<String>,
    pub behavior: Option<String>,
    pub quality: Vec<String>,
}

impl ConstraintDefaults {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Top-level configuration consumed by a run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SigilConfig {
    pub strictness: Strictness,
    pub limits: LimitsConfig,
    pub parser: ParserConfig,
    pub classifier: ClassifierConfig,
    /// Domain name to path-pattern table.
    pub domains: BTreeMap<String, DomainPatternConfig>,
    /// Project-level constraint defaults (lowest cascade level).
    pub constraints: ConstraintDefaults,
    /// Directory-level constraint overrides, keyed by root-relative
    /// directory prefix. The longest matching prefix wins.
    pub directory_constraints: BTreeMap<String, ConstraintDefaults>,
}

impl SigilConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threshold) = self.classifier.majority_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::ValidationFailed {
                    field: "classifier.majority_threshold".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if let Some(size) = self.limits.max_file_size {
            if size == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "limits.max_file_size".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(depth) = self.limits.max_expansion_depth {
            if depth == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "limits.max_expansion_depth".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The directory-level constraint defaults for a file path: the entry
    /// with the longest prefix that contains the path, if any.
    pub fn directory_constraints_for(&self, path: &str) -> Option<&ConstraintDefaults> {
        self.directory_constraints
            .iter()
            .filter(|(prefix, _)| {
                path.starts_with(prefix.as_str())
                    && (path.len() == prefix.len()
                        || path.as_bytes().get(prefix.len()) == Some(&b'/')
                        || prefix.ends_with('/'))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, defaults)| defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SigilConfig::default();
        assert_eq!(config.strictness, Strictness::Permissive);
        assert_eq!(config.limits.effective_max_file_size(), 1_048_576);
        assert_eq!(config.limits.effective_max_expansion_depth(), 10);
        assert!((config.classifier.effective_majority_threshold() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_directory_prefix_longest_wins() {
        let toml = r#"
[directory_constraints."src"]
lock = "normal"

[directory_constraints."src/payments"]
lock = "approval-required"
"#;
        let config = SigilConfig::from_toml(toml).unwrap();
        let hit = config
            .directory_constraints_for("src/payments/charge.ts")
            .unwrap();
        assert_eq!(hit.lock.as_deref(), Some("approval-required"));
        let outer = config.directory_constraints_for("src/api/routes.ts").unwrap();
        assert_eq!(outer.lock.as_deref(), Some("normal"));
        assert!(config.directory_constraints_for("lib/util.ts").is_none());
    }

    #[test]
    fn test_prefix_must_fall_on_component_boundary() {
        let toml = r#"
[directory_constraints."src/pay"]
lock = "frozen"
"#;
        let config = SigilConfig::from_toml(toml).unwrap();
        // "src/payments" shares the byte prefix but not the path component.
        assert!(config
            .directory_constraints_for("src/payments/charge.ts")
            .is_none());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let toml = r#"
[classifier]
majority_threshold = 1.5
"#;
        let err = SigilConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }
}
