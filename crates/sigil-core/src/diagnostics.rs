//! The structured diagnostics stream.
//!
//! Every component reports findings here instead of aborting on its own.
//! A single strictness policy (checked by the pipeline) decides whether a
//! diagnostic above `Warning` aborts the run or is merely recorded.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Diagnostic taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Malformed grammar or continuation.
    Syntax,
    /// Unknown namespace, invalid constraint value, same-level conflict,
    /// invalid modifier.
    Semantic,
    /// Size or count limit exceeded.
    Resource,
    /// Unresolved variable, circular expansion, dangling graph or domain
    /// reference found at assembly.
    Reference,
}

/// Diagnostic severity, ordered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Source location a diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    /// 1-indexed line, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// One structured diagnostic. Callers decide how to print or route these.
/// Serialize-only: the stream flows out of the engine, never back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: Category,
    pub severity: Severity,
    /// Stable machine code, e.g. `missing-directive`.
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        category: Category,
        severity: Severity,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            code,
            message: message.into(),
            location: None,
            snippet: None,
            suggestion: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>, line: Option<usize>) -> Self {
        self.location = Some(Location {
            path: path.into(),
            line,
        });
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Thread-safe collector behind the diagnostics stream.
///
/// Cloning shares the underlying buffer, so parallel workers and the
/// aggregation phase report into the same stream.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    inner: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        if let Ok(mut buf) = self.inner.lock() {
            buf.push(diagnostic);
        }
    }

    /// Number of diagnostics recorded so far.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First diagnostic at or above the given severity, if any.
    pub fn first_at_least(&self, severity: Severity) -> Option<Diagnostic> {
        self.inner
            .lock()
            .ok()
            .and_then(|b| b.iter().find(|d| d.severity >= severity).cloned())
    }

    /// True if any recorded diagnostic is above `Warning`.
    pub fn has_errors(&self) -> bool {
        self.first_at_least(Severity::Error).is_some()
    }

    /// Snapshot of everything recorded so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.inner.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Drain the stream, consuming the sink's view of it.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().unwrap_or_default(),
            Err(shared) => shared.lock().map(|b| b.clone()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_sink_is_shared_across_clones() {
        let sink = DiagnosticSink::new();
        let worker = sink.clone();
        worker.emit(Diagnostic::new(
            Category::Syntax,
            Severity::Warning,
            "missing-directive",
            "annotation has no directive",
        ));
        assert_eq!(sink.len(), 1);
        assert!(!sink.has_errors());
    }

    #[test]
    fn test_first_at_least_finds_errors() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::new(
            Category::Semantic,
            Severity::Warning,
            "unknown-namespace",
            "namespace not reserved",
        ));
        sink.emit(
            Diagnostic::new(
                Category::Reference,
                Severity::Error,
                "dangling-symbol",
                "graph node has no symbol",
            )
            .at("src/a.ts", Some(4)),
        );
        let first = sink.first_at_least(Severity::Error).unwrap();
        assert_eq!(first.code, "dangling-symbol");
        assert_eq!(first.location.as_ref().unwrap().path, "src/a.ts");
    }
}
