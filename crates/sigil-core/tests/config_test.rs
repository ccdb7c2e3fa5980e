//! Tests for the sigil configuration system.

use sigil_core::config::{ContinuationTarget, SigilConfig, Strictness};
use sigil_core::errors::{ConfigError, SigilErrorCode};

#[test]
fn test_compiled_defaults() {
    let config = SigilConfig::default();
    assert_eq!(config.strictness, Strictness::Permissive);
    assert_eq!(config.limits.effective_max_file_size(), 1_048_576);
    assert_eq!(config.limits.effective_max_files(), 10_000);
    assert_eq!(config.limits.effective_max_annotations_per_file(), 500);
    assert_eq!(config.limits.effective_max_expansion_depth(), 10);
    assert_eq!(config.parser.effective_min_directive_len(), 3);
    assert_eq!(config.parser.continuation_target, ContinuationTarget::Directive);
    assert!(config.domains.is_empty());
    assert!(config.constraints.is_empty());
}

#[test]
fn test_full_toml_round() {
    let toml = r#"
strictness = "strict"

[limits]
max_file_size = 2_000_000
max_annotations_per_file = 100

[parser]
continuation_target = "value"
min_directive_len = 5

[classifier]
majority_threshold = 0.75

[domains.billing]
patterns = ["src/billing/**", "src/invoices/**"]
description = "Money flows"
layer = "service"

[constraints]
lock = "normal"
quality = ["tests"]

[directory_constraints."src/payments"]
lock = "approval-required"
lock_reason = "PCI scope"
"#;
    let config = SigilConfig::from_toml(toml).unwrap();
    assert_eq!(config.strictness, Strictness::Strict);
    assert_eq!(config.limits.max_file_size, Some(2_000_000));
    assert_eq!(config.limits.effective_max_files(), 10_000);
    assert_eq!(config.parser.continuation_target, ContinuationTarget::Value);
    assert_eq!(config.classifier.effective_majority_threshold(), 0.75);
    assert_eq!(config.domains["billing"].patterns.len(), 2);
    assert_eq!(config.constraints.quality, vec!["tests"]);
    let dir = config
        .directory_constraints_for("src/payments/charge.ts")
        .unwrap();
    assert_eq!(dir.lock.as_deref(), Some("approval-required"));
    assert_eq!(dir.lock_reason.as_deref(), Some("PCI scope"));
}

#[test]
fn test_unknown_keys_rejected_as_parse_error() {
    // serde(default) structs still reject mistyped values.
    let err = SigilConfig::from_toml("strictness = 42\n").unwrap_err();
    match err {
        ConfigError::ParseError { path, .. } => assert_eq!(path, "<string>"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_validation_errors_carry_codes() {
    let err = SigilConfig::from_toml("[limits]\nmax_file_size = 0\n").unwrap_err();
    assert_eq!(err.error_code(), "SIGIL_CONFIG_VALIDATION");

    let err = SigilConfig::from_toml("[limits]\nmax_expansion_depth = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "limits.max_expansion_depth"));
}
