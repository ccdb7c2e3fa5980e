//! Per-file extraction.
//!
//! A pure function of one file's bytes plus global config: locator,
//! grammar parser, and symbol/file builder in sequence. Safe to run in
//! parallel with no shared mutable state beyond the diagnostics sink and
//! results collector.

use sigil_core::config::{SigilConfig, Strictness};
use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

use crate::comments::Language;
use crate::index::{build_file, FileExtraction};

/// One pre-resolved input file. Discovery, language tagging, and mtime
/// capture happen outside the core.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Root-relative path.
    pub path: String,
    /// Language tag (e.g. `typescript`); falls back to extension sniffing.
    pub language: Option<String>,
    pub bytes: Vec<u8>,
    /// Last modification time, epoch milliseconds.
    pub modified_at_ms: Option<u64>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, language: &str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            language: Some(language.to_string()),
            bytes: bytes.into(),
            modified_at_ms: None,
        }
    }
}

/// Extract one file. Returns `None` when the file is skipped (unknown
/// language or limits); the reason is on the diagnostics stream.
pub fn extract_file(
    source: &SourceFile,
    config: &SigilConfig,
    sink: &DiagnosticSink,
) -> Option<FileExtraction> {
    let escalated = match config.strictness {
        Strictness::Permissive => Severity::Warning,
        Strictness::Strict => Severity::Error,
    };

    if source.bytes.len() as u64 > config.limits.effective_max_file_size() {
        sink.emit(
            Diagnostic::new(
                Category::Resource,
                escalated,
                "file-too-large",
                format!(
                    "{} is {} bytes, over the {} byte limit",
                    source.path,
                    source.bytes.len(),
                    config.limits.effective_max_file_size()
                ),
            )
            .at(&source.path, None),
        );
        return None;
    }

    let language = source
        .language
        .as_deref()
        .and_then(Language::from_tag)
        .or_else(|| Language::from_extension(source.path.rsplit_once('.').map(|(_, e)| e)));
    let Some(language) = language else {
        sink.emit(
            Diagnostic::new(
                Category::Semantic,
                escalated,
                "unsupported-language",
                format!("no comment dialect for `{}`", source.path),
            )
            .at(&source.path, None),
        );
        return None;
    };

    let content = String::from_utf8_lossy(&source.bytes);
    let extraction = build_file(&source.path, language, &content, config, sink);

    let max_annotations = config.limits.effective_max_annotations_per_file();
    if extraction.annotation_count > max_annotations {
        sink.emit(
            Diagnostic::new(
                Category::Resource,
                escalated,
                "too-many-annotations",
                format!(
                    "{} has {} annotations, over the limit of {max_annotations}",
                    source.path, extraction.annotation_count
                ),
            )
            .at(&source.path, None),
        );
    }

    Some(extraction)
}
