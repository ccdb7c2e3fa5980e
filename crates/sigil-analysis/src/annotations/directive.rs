//! Directive validator.
//!
//! Checks directive presence and quality, reporting through the
//! diagnostics stream. In permissive mode a missing directive is filled
//! from per-namespace defaults and marked auto-generated; in strict mode
//! it is an error and the annotation is left untouched.

use sigil_core::config::{ParserConfig, Strictness};
use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

use super::Annotation;

/// Validate every annotation's directive in place.
pub fn validate_annotations(
    annotations: &mut [Annotation],
    path: &str,
    strictness: Strictness,
    config: &ParserConfig,
    sink: &DiagnosticSink,
) {
    for ann in annotations.iter_mut() {
        if ann.is_extension() {
            // Extensions pass through opaquely, directive included.
            continue;
        }

        if ann.directive.is_empty() {
            let severity = match strictness {
                Strictness::Permissive => Severity::Warning,
                Strictness::Strict => Severity::Error,
            };
            sink.emit(
                Diagnostic::new(
                    Category::Syntax,
                    severity,
                    "missing-directive",
                    format!("`@acp:{}` has no ` - directive` suffix", ann.namespace),
                )
                .at(path, Some(ann.source_line))
                .with_suggestion("append ` - <why this annotation exists>`"),
            );
            if strictness == Strictness::Permissive {
                if let Some(default) = default_directive(&ann.namespace, ann.value.as_deref()) {
                    ann.directive = default;
                    ann.auto_generated = true;
                }
            }
            continue;
        }

        if ann.directive.chars().count() < config.effective_min_directive_len() {
            sink.emit(
                Diagnostic::new(
                    Category::Syntax,
                    Severity::Warning,
                    "short-directive",
                    format!(
                        "directive for `@acp:{}` is too short to be useful",
                        ann.namespace
                    ),
                )
                .at(path, Some(ann.source_line)),
            );
        }

        if ann.value.as_deref() == Some(ann.directive.as_str()) {
            sink.emit(
                Diagnostic::new(
                    Category::Syntax,
                    Severity::Info,
                    "directive-repeats-value",
                    format!("directive for `@acp:{}` merely repeats its value", ann.namespace),
                )
                .at(path, Some(ann.source_line)),
            );
        }
    }
}

/// Per-namespace default directive, used when the author omitted one.
pub fn default_directive(namespace: &str, value: Option<&str>) -> Option<String> {
    match namespace {
        "lock" => match value {
            Some("frozen") => Some("must not be modified under any circumstances".into()),
            Some("restricted") => {
                Some("explain proposed changes and wait for explicit approval".into())
            }
            Some("approval-required") => {
                Some("propose changes and request confirmation before applying".into())
            }
            Some("tests-required") => Some("changes must include corresponding tests".into()),
            Some("docs-required") => Some("changes must update documentation".into()),
            Some("experimental") => Some("unstable code, changes welcome".into()),
            Some("normal") | None => Some("safe to modify following project conventions".into()),
            _ => None,
        },
        "hack" => Some("temporary workaround, check expiry before modifying".into()),
        "deprecated" => Some("do not use or extend".into()),
        "todo" => Some("pending work item".into()),
        "fixme" => Some("known issue requiring a fix".into()),
        "critical" => Some("critical section, extra review required".into()),
        "perf" => Some("performance-sensitive code".into()),
        "fn" | "method" => Some("function implementation".into()),
        "class" => Some("class definition".into()),
        "const" => Some("constant definition".into()),
        "purpose" | "summary" | "module" => value.map(|v| v.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(namespace: &str, value: Option<&str>, directive: &str) -> Annotation {
        Annotation {
            namespace: namespace.to_string(),
            sub_namespace: None,
            value: value.map(|v| v.to_string()),
            directive: directive.to_string(),
            auto_generated: false,
            source_line: 1,
            continued: false,
        }
    }

    #[test]
    fn test_missing_directive_synthesized_in_permissive() {
        let mut anns = vec![ann("lock", Some("frozen"), "")];
        let sink = DiagnosticSink::new();
        validate_annotations(
            &mut anns,
            "a.rs",
            Strictness::Permissive,
            &ParserConfig::default(),
            &sink,
        );
        assert!(anns[0].auto_generated);
        assert!(!anns[0].directive.is_empty());
        let diags = sink.snapshot();
        assert_eq!(diags[0].code, "missing-directive");
        assert_eq!(diags[0].severity, Severity::Warning);
    }

    #[test]
    fn test_missing_directive_is_error_in_strict() {
        let mut anns = vec![ann("lock", Some("frozen"), "")];
        let sink = DiagnosticSink::new();
        validate_annotations(
            &mut anns,
            "a.rs",
            Strictness::Strict,
            &ParserConfig::default(),
            &sink,
        );
        assert!(!anns[0].auto_generated);
        assert!(anns[0].directive.is_empty());
        assert!(sink.has_errors());
    }

    #[test]
    fn test_every_validated_annotation_has_directive_text() {
        let mut anns = vec![
            ann("lock", Some("restricted"), ""),
            ann("todo", None, ""),
            ann("summary", Some("parses things"), ""),
        ];
        let sink = DiagnosticSink::new();
        validate_annotations(
            &mut anns,
            "a.rs",
            Strictness::Permissive,
            &ParserConfig::default(),
            &sink,
        );
        for a in &anns {
            assert!(!a.directive.is_empty(), "{} lacks a directive", a.namespace);
        }
    }

    #[test]
    fn test_quality_checks_emit_only_diagnostics() {
        let mut anns = vec![ann("lock", Some("frozen"), "no")];
        let sink = DiagnosticSink::new();
        validate_annotations(
            &mut anns,
            "a.rs",
            Strictness::Permissive,
            &ParserConfig::default(),
            &sink,
        );
        assert_eq!(anns[0].directive, "no");
        assert_eq!(sink.snapshot()[0].code, "short-directive");
    }
}
