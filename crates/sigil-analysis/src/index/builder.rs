//! Symbol/File builder.
//!
//! Partitions comment blocks into file-level (before the first code
//! element) and symbol-level (immediately preceding a detected element),
//! attaches inline markers to the nearest enclosing symbol, and folds
//! annotation values into File/Symbol records and constraint layers.
//!
//! Merge rule for two blocks targeting the same scope: scalar fields
//! overwrite (last wins), array-typed fields accumulate in insertion
//! order.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use sigil_core::config::SigilConfig;
use sigil_core::diagnostics::{Category, Diagnostic, DiagnosticSink, Severity};

use super::detect::{detect_elements, detect_imports, CodeElement};
use super::types::{FileEntry, InlineAnnotation, SymbolEntry, SymbolType};
use crate::annotations::{parse_block, validate_annotations, Annotation};
use crate::comments::{locate_blocks, Language};
use crate::constraints::ConstraintLayer;

/// Per-file extraction result: everything aggregation needs, nothing more.
#[derive(Debug, Clone, Default)]
pub struct FileExtraction {
    pub file: Option<FileEntry>,
    pub symbols: Vec<SymbolEntry>,
    /// Constraint annotations found at file level.
    pub file_layer: ConstraintLayer,
    /// Constraint annotations per qualified symbol name.
    pub symbol_layers: HashMap<String, ConstraintLayer>,
    /// Unresolved callee names per qualified caller (detected + declared).
    pub calls: Vec<(String, Vec<String>)>,
    /// Annotations parsed in this file (limit accounting).
    pub annotation_count: usize,
}

/// Markers that are always inline, attaching to the enclosing scope.
const INLINE_KINDS: &[&str] = &["todo", "fixme", "critical", "perf", "hack"];

static CALL_SITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

/// Words that match the call-site pattern but are not calls.
const CALL_BLACKLIST: &[&str] = &[
    "if", "for", "while", "switch", "return", "catch", "match", "fn", "def", "func", "function",
    "new", "assert", "sizeof", "typeof", "print", "println",
];

/// Build one file's extraction from its bytes. Pure function of the
/// inputs; safe to run in parallel across files.
pub fn build_file(
    path: &str,
    language: Language,
    content: &str,
    config: &SigilConfig,
    sink: &DiagnosticSink,
) -> FileExtraction {
    let blocks = locate_blocks(content, language);
    let elements = detect_elements(content, language);
    let lines: Vec<&str> = content.lines().collect();

    let mut file = FileEntry::new(path, language, lines.len());
    file.imports = detect_imports(content, language);

    let mut out = FileExtraction::default();
    let mut summaries: HashMap<String, String> = HashMap::new();
    let mut symbol_extensions: HashMap<String, Vec<Annotation>> = HashMap::new();
    let mut declared_calls: HashMap<String, Vec<String>> = HashMap::new();
    let mut synthetic: Vec<SymbolEntry> = Vec::new();

    let first_element_line = elements.first().map(|e| e.line).unwrap_or(usize::MAX);

    for block in &blocks {
        let mut annotations = parse_block(block, path, &config.parser, sink);
        if annotations.is_empty() {
            continue;
        }
        validate_annotations(
            &mut annotations,
            path,
            config.strictness,
            &config.parser,
            sink,
        );
        out.annotation_count += annotations.len();

        // Trailing comments attach where they sit; whole-line blocks
        // document what follows, falling back to their enclosing scope.
        let target = if block.trails_code {
            match enclosing_element(block.start_line, &elements) {
                Some(element) => Target::Symbol(element.path.clone()),
                None => Target::File,
            }
        } else {
            match preceding_element(block.end_line, &elements, &lines) {
                Some(element) => Target::Symbol(element.path.clone()),
                None if block.start_line < first_element_line => Target::File,
                None => match enclosing_element(block.start_line, &elements) {
                    Some(element) => Target::Symbol(element.path.clone()),
                    None => Target::File,
                },
            }
        };

        for ann in annotations {
            apply_annotation(
                ann,
                &target,
                path,
                &elements,
                &mut file,
                &mut out,
                &mut summaries,
                &mut symbol_extensions,
                &mut declared_calls,
                &mut synthetic,
                sink,
            );
        }
    }

    // Materialize detected elements as symbols.
    for element in &elements {
        let qualified = qualified_name(path, &element.path);
        let mut callees = collect_call_sites(element, &elements, &lines);
        if let Some(declared) = declared_calls.remove(&qualified) {
            for callee in declared {
                if !callees.contains(&callee) {
                    callees.push(callee);
                }
            }
        }
        if !callees.is_empty() {
            out.calls.push((qualified.clone(), callees));
        }

        if element.exported && !file.exports.contains(&element.path) {
            file.exports.push(element.path.clone());
        }

        out.symbols.push(SymbolEntry {
            name: element.name.clone(),
            qualified_name: qualified.clone(),
            symbol_type: element.kind,
            file: path.to_string(),
            lines: [element.line, element.end_line],
            exported: element.exported,
            signature: Some(element.signature.clone()),
            summary: summaries.remove(&element.path),
            calls: Vec::new(),
            called_by: Vec::new(),
            extensions: symbol_extensions.remove(&element.path).unwrap_or_default(),
        });
    }

    // Annotation-declared symbols for languages detection missed.
    for mut symbol in synthetic {
        if let Some(declared) = declared_calls.remove(&symbol.qualified_name) {
            out.calls.push((symbol.qualified_name.clone(), declared));
        }
        if let Some(summary) = summaries.remove(&strip_path(&symbol.qualified_name)) {
            symbol.summary = Some(summary);
        }
        out.symbols.push(symbol);
    }

    out.file = Some(file);
    out
}

enum Target {
    File,
    Symbol(String),
}

fn qualified_name(path: &str, dotted: &str) -> String {
    format!("{path}:{dotted}")
}

fn strip_path(qualified: &str) -> String {
    qualified
        .rsplit_once(':')
        .map(|(_, dotted)| dotted.to_string())
        .unwrap_or_else(|| qualified.to_string())
}

/// The element this block immediately precedes, if any: only blank lines
/// may sit between the block and the declaration.
fn preceding_element<'a>(
    block_end: usize,
    elements: &'a [CodeElement],
    lines: &[&str],
) -> Option<&'a CodeElement> {
    let element = elements.iter().find(|e| e.line > block_end)?;
    let gap_clear = (block_end..element.line - 1)
        .all(|idx| lines.get(idx).map(|l| l.trim().is_empty()).unwrap_or(true));
    gap_clear.then_some(element)
}

/// The element whose body contains the given line, innermost match.
fn enclosing_element<'a>(line: usize, elements: &'a [CodeElement]) -> Option<&'a CodeElement> {
    elements
        .iter()
        .filter(|e| e.line <= line && line <= e.end_line)
        .max_by_key(|e| e.line)
}

#[allow(clippy::too_many_arguments)]
fn apply_annotation(
    ann: Annotation,
    target: &Target,
    path: &str,
    elements: &[CodeElement],
    file: &mut FileEntry,
    out: &mut FileExtraction,
    summaries: &mut HashMap<String, String>,
    symbol_extensions: &mut HashMap<String, Vec<Annotation>>,
    declared_calls: &mut HashMap<String, Vec<String>>,
    synthetic: &mut Vec<SymbolEntry>,
    sink: &DiagnosticSink,
) {
    // Extensions round-trip opaquely to whichever scope owns the block.
    if ann.is_extension() {
        match target {
            Target::File => file.extensions.push(ann),
            Target::Symbol(dotted) => symbol_extensions
                .entry(dotted.clone())
                .or_default()
                .push(ann),
        }
        return;
    }

    // Inline markers attach by position, not by block target.
    if INLINE_KINDS.contains(&ann.namespace.as_str()) {
        let symbol = enclosing_element(ann.source_line, elements)
            .map(|e| qualified_name(path, &e.path));
        file.inline.push(build_inline(ann, symbol));
        return;
    }

    match ann.namespace.as_str() {
        "module" => file.module = ann.value,
        "summary" => match target {
            Target::File => file.summary = ann.value,
            Target::Symbol(dotted) => {
                if let Some(value) = ann.value {
                    summaries.insert(dotted.clone(), value);
                }
            }
        },
        "purpose" => {
            if file.summary.is_none() {
                file.summary = ann.value;
            }
        }
        "owner" => file.owner = ann.value,
        "domain" => {
            if let Some(value) = ann.value {
                if !file.domains.contains(&value) {
                    file.domains.push(value);
                }
            }
        }
        "layer" => file.layer = ann.value,
        "exports" => {
            if let Some(value) = ann.value.as_deref() {
                for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                    if !file.exports.iter().any(|e| e == name) {
                        file.exports.push(name.to_string());
                    }
                }
            }
        }
        "imports" => {
            if let Some(value) = ann.value.as_deref() {
                for spec in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    if !file.imports.iter().any(|i| i == spec) {
                        file.imports.push(spec.to_string());
                    }
                }
            }
        }
        "lock" | "style" | "behavior" | "quality" => {
            let layer = match target {
                Target::File => &mut out.file_layer,
                Target::Symbol(dotted) => out
                    .symbol_layers
                    .entry(qualified_name(path, dotted))
                    .or_default(),
            };
            layer.apply_annotation(&ann, path, sink);
        }
        "calls" => match target {
            Target::Symbol(dotted) => {
                if let Some(value) = ann.value.as_deref() {
                    let entry = declared_calls
                        .entry(qualified_name(path, dotted))
                        .or_default();
                    for callee in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                        if !entry.iter().any(|e| e == callee) {
                            entry.push(callee.to_string());
                        }
                    }
                }
            }
            Target::File => sink.emit(
                Diagnostic::new(
                    Category::Semantic,
                    Severity::Warning,
                    "calls-outside-symbol",
                    "`@acp:calls` must annotate a symbol, not a file",
                )
                .at(path, Some(ann.source_line)),
            ),
        },
        "fn" | "class" | "method" | "const" => {
            // Declares a symbol the detector could not see.
            if let Some(name) = ann.value.clone() {
                let already_detected = elements.iter().any(|e| e.path == name);
                if !already_detected {
                    let kind = match ann.namespace.as_str() {
                        "class" => SymbolType::Class,
                        "method" => SymbolType::Method,
                        "const" => SymbolType::Const,
                        _ => SymbolType::Function,
                    };
                    synthetic.push(SymbolEntry {
                        name: name.split('.').next_back().unwrap_or(&name).to_string(),
                        qualified_name: qualified_name(path, &name),
                        symbol_type: kind,
                        file: path.to_string(),
                        lines: [ann.source_line, ann.source_line],
                        exported: true,
                        signature: None,
                        summary: (!ann.directive.is_empty()).then(|| ann.directive.clone()),
                        calls: Vec::new(),
                        called_by: Vec::new(),
                        extensions: Vec::new(),
                    });
                }
            }
        }
        _ => {
            // Unknown namespaces were already flagged by the grammar;
            // nothing to fold in.
        }
    }
}

/// Build an inline annotation record, parsing hack `key=value` parts.
fn build_inline(ann: Annotation, symbol: Option<String>) -> InlineAnnotation {
    let mut expires = None;
    let mut ticket = None;
    let mut plain_value = ann.value.clone();

    if ann.namespace == "hack" {
        if let Some(value) = ann.value.as_deref() {
            let mut rest = Vec::new();
            for part in value.split_whitespace() {
                if let Some(date) = part.strip_prefix("expires=") {
                    expires = Some(date.to_string());
                } else if let Some(id) = part.strip_prefix("ticket=") {
                    ticket = Some(id.to_string());
                } else {
                    rest.push(part);
                }
            }
            plain_value = (!rest.is_empty()).then(|| rest.join(" "));
        }
    }

    InlineAnnotation {
        line: ann.source_line,
        kind: ann.namespace,
        value: plain_value,
        directive: ann.directive,
        expires,
        ticket,
        symbol,
    }
}

/// Same-file static call sites within an element body.
fn collect_call_sites(
    element: &CodeElement,
    elements: &[CodeElement],
    lines: &[&str],
) -> Vec<String> {
    if element.kind == SymbolType::Class || element.kind == SymbolType::Const {
        return Vec::new();
    }
    let mut callees = Vec::new();
    let start = element.line;
    let end = element.end_line.min(lines.len());

    for line in lines.iter().take(end).skip(start - 1) {
        for caps in CALL_SITE.captures_iter(line) {
            let name = caps.get(1).unwrap().as_str();
            if name == element.name || CALL_BLACKLIST.contains(&name) {
                continue;
            }
            let known = elements
                .iter()
                .any(|e| e.name == name && e.kind != SymbolType::Const && e.path != element.path);
            if known && !callees.iter().any(|c| c == name) {
                callees.push(name.to_string());
            }
        }
    }
    callees
}
