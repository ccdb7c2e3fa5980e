//! The annotation grammar parser.
//!
//! Grammar: `@acp:` namespace [`:` sub_namespace] [value] ` - ` directive.
//! namespace = `[a-z][a-z0-9-]*`; value = quoted string (backslash-escaped
//! quotes) or bare run up to the ` - ` separator; directive = free text.

use once_cell::sync::Lazy;
use regex::Regex;

use sigil_core::config::{ContinuationTarget, ParserConfig};
use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

use super::{namespace, Annotation};
use crate::comments::CommentBlock;

/// Head of an annotation line: namespace, optional sub-namespace, rest.
static HEAD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@acp:([a-z][a-z0-9-]*)(?::([a-z][a-z0-9-]*))?(?:\s+(.*))?$").unwrap()
});

/// Parse every annotation in one comment block.
///
/// Non-`@acp:` lines following an annotation are continuation lines and
/// are appended single-space-joined. Parsing the same block twice yields
/// the identical sequence.
pub fn parse_block(
    block: &CommentBlock,
    path: &str,
    config: &ParserConfig,
    sink: &DiagnosticSink,
) -> Vec<Annotation> {
    let mut annotations: Vec<Annotation> = Vec::new();

    for (offset, line) in block.lines.iter().enumerate() {
        let line_no = block.start_line + offset;
        let trimmed = line.trim();

        if !trimmed.starts_with("@acp:") {
            // Continuation of the most recent annotation, if any.
            if !trimmed.is_empty() {
                if let Some(prev) = annotations.last_mut() {
                    absorb_continuation(prev, trimmed, config.continuation_target);
                }
            }
            continue;
        }

        match HEAD_PATTERN.captures(trimmed) {
            Some(caps) => {
                let ns = caps.get(1).unwrap().as_str().to_string();
                let sub = caps.get(2).map(|m| m.as_str().to_string());
                let rest = caps.get(3).map(|m| m.as_str()).unwrap_or("");

                let (value, directive) = match split_value_directive(rest) {
                    Ok(parts) => parts,
                    Err(message) => {
                        sink.emit(
                            Diagnostic::new(
                                Category::Syntax,
                                Severity::Warning,
                                "malformed-annotation",
                                message,
                            )
                            .at(path, Some(line_no))
                            .with_snippet(trimmed),
                        );
                        continue;
                    }
                };

                check_namespace(&ns, sub.as_deref(), path, line_no, sink);

                annotations.push(Annotation {
                    namespace: ns,
                    sub_namespace: sub,
                    value,
                    directive: directive.unwrap_or_default(),
                    auto_generated: false,
                    source_line: line_no,
                    continued: false,
                });
            }
            None => {
                sink.emit(
                    Diagnostic::new(
                        Category::Syntax,
                        Severity::Warning,
                        "malformed-annotation",
                        "annotation does not match `@acp:namespace [value] - directive`",
                    )
                    .at(path, Some(line_no))
                    .with_snippet(trimmed),
                );
            }
        }
    }

    annotations
}

/// Append a continuation line to the previous annotation.
///
/// The directive absorbs it when present (or becomes it when absent);
/// `ContinuationTarget::Value` redirects the both-present case.
fn absorb_continuation(prev: &mut Annotation, text: &str, target: ContinuationTarget) {
    prev.continued = true;
    if prev.directive.is_empty() {
        prev.directive = text.to_string();
        return;
    }
    match target {
        ContinuationTarget::Directive => {
            prev.directive.push(' ');
            prev.directive.push_str(text);
        }
        ContinuationTarget::Value => match prev.value.as_mut() {
            Some(value) => {
                value.push(' ');
                value.push_str(text);
            }
            None => {
                prev.directive.push(' ');
                prev.directive.push_str(text);
            }
        },
    }
}

/// Split the post-namespace rest into (value, directive).
fn split_value_directive(rest: &str) -> Result<(Option<String>, Option<String>), String> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok((None, None));
    }

    if let Some(after_quote) = rest.strip_prefix('"') {
        let (value, consumed) = read_quoted(after_quote)
            .ok_or_else(|| "unterminated quoted value".to_string())?;
        let tail = after_quote[consumed..].trim_start();
        if tail.is_empty() {
            return Ok((Some(value), None));
        }
        let directive = tail
            .strip_prefix("- ")
            .or_else(|| tail.strip_prefix('-').filter(|t| t.is_empty()))
            .ok_or_else(|| "expected ` - directive` after quoted value".to_string())?;
        let directive = directive.trim();
        return Ok((
            Some(value),
            (!directive.is_empty()).then(|| directive.to_string()),
        ));
    }

    // Bare value: everything up to the first ` - ` separator.
    match rest.find(" - ") {
        Some(idx) => {
            let value = rest[..idx].trim();
            let directive = rest[idx + 3..].trim();
            Ok((
                (!value.is_empty()).then(|| value.to_string()),
                (!directive.is_empty()).then(|| directive.to_string()),
            ))
        }
        None => Ok((Some(rest.to_string()), None)),
    }
}

/// Read a quoted value body (opening quote already consumed). Returns the
/// unescaped value and the bytes consumed including the closing quote.
fn read_quoted(body: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = body.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(escaped);
            }
            '"' => return Some((value, i + 1)),
            _ => value.push(ch),
        }
    }
    None
}

/// Namespace checks: unknown non-extension namespaces are still parsed but
/// tagged; extensions must carry their feature part.
fn check_namespace(
    ns: &str,
    sub: Option<&str>,
    path: &str,
    line: usize,
    sink: &DiagnosticSink,
) {
    if namespace::is_extension(ns) {
        if sub.is_none() {
            sink.emit(
                Diagnostic::new(
                    Category::Semantic,
                    Severity::Warning,
                    "extension-missing-feature",
                    format!("extension namespace `{ns}` is missing its `:feature` part"),
                )
                .at(path, Some(line)),
            );
        }
        return;
    }
    match namespace::reserved_spec(ns) {
        Some(spec) => {
            if let Some(sub) = sub {
                if !spec.subs.contains(&sub) {
                    sink.emit(
                        Diagnostic::new(
                            Category::Semantic,
                            Severity::Warning,
                            "unknown-sub-namespace",
                            format!("namespace `{ns}` has no sub-namespace `{sub}`"),
                        )
                        .at(path, Some(line)),
                    );
                }
            }
        }
        None => {
            sink.emit(
                Diagnostic::new(
                    Category::Semantic,
                    Severity::Warning,
                    "unknown-namespace",
                    format!("`{ns}` is not a reserved namespace"),
                )
                .at(path, Some(line))
                .with_suggestion("use an `x-{vendor}:{feature}` extension namespace"),
            );
        }
    }
}
