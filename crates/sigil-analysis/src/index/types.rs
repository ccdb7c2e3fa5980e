//! File and symbol records.

use serde::{Deserialize, Serialize};

use crate::annotations::Annotation;
use crate::comments::Language;

/// Symbol type (closed set).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolType {
    #[default]
    Function,
    Method,
    Class,
    Const,
}

/// An inline marker annotation (todo, fixme, critical, perf, hack)
/// attached to the nearest enclosing symbol, else the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineAnnotation {
    /// 1-indexed source line.
    pub line: usize,
    /// One of `todo`, `fixme`, `critical`, `perf`, `hack`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub directive: String,
    /// Expiry date from `expires=YYYY-MM-DD` (hack only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    /// Tracking ticket from `ticket=ID` (hack only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    /// Qualified name of the enclosing symbol, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// A file entry in the index. `path` is root-relative and unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub language: Language,
    /// Total line count.
    pub lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline: Vec<InlineAnnotation>,
    /// Opaque `x-{vendor}:{feature}` annotations, round-tripped verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Annotation>,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, language: Language, lines: usize) -> Self {
        Self {
            path: path.into(),
            language,
            lines,
            module: None,
            summary: None,
            owner: None,
            domains: Vec::new(),
            layer: None,
            exports: Vec::new(),
            imports: Vec::new(),
            inline: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

/// A symbol entry. `qualified_name` is `{file_path}:{dotted_symbol_path}`
/// and unique across the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub qualified_name: String,
    #[serde(rename = "type")]
    pub symbol_type: SymbolType,
    pub file: String,
    /// `[start_line, end_line]`, 1-indexed inclusive.
    pub lines: [usize; 2],
    pub exported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Qualified names this symbol calls (filled during aggregation).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<String>,
    /// Qualified names calling this symbol (filled during aggregation).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub called_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Annotation>,
}
