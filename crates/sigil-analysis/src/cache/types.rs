//! The cache aggregate and staleness types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::call_graph::CallGraph;
use crate::constraints::ConstraintSet;
use crate::domains::DomainEntry;
use crate::index::{FileEntry, SymbolEntry};

/// Project metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub root: String,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            name: "project".to_string(),
            root: ".".to_string(),
        }
    }
}

/// Aggregate statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub files: usize,
    pub symbols: usize,
    pub lines: usize,
    pub annotations: usize,
    /// Percentage of symbols carrying a summary.
    #[serde(default)]
    pub annotation_coverage: f64,
}

/// Effective constraints resolved per scope, plus a lock-level index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintIndex {
    /// Effective set per file path.
    #[serde(default)]
    pub by_file: BTreeMap<String, ConstraintSet>,
    /// Effective set per qualified symbol name.
    #[serde(default)]
    pub by_symbol: BTreeMap<String, ConstraintSet>,
    /// File paths grouped by effective lock level (non-normal only).
    #[serde(default)]
    pub by_lock_level: BTreeMap<String, Vec<String>>,
}

/// The assembled, immutable run aggregate. The only persisted artifact;
/// readers only ever see a complete, finalized cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cache {
    /// Engine version that produced this cache.
    pub version: String,
    /// Generation time, epoch milliseconds.
    pub generated_at_ms: u64,
    /// Authoritative for staleness when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    pub project: ProjectInfo,
    pub stats: Stats,
    /// Every indexed file to its last-observed mtime (epoch ms).
    pub source_files: BTreeMap<String, u64>,
    pub files: BTreeMap<String, FileEntry>,
    /// Symbols keyed by qualified name.
    pub symbols: BTreeMap<String, SymbolEntry>,
    pub graph: CallGraph,
    pub domains: BTreeMap<String, DomainEntry>,
    pub constraints: ConstraintIndex,
}

impl Cache {
    /// O(log n) symbol lookup by qualified name.
    pub fn get_symbol(&self, qualified: &str) -> Option<&SymbolEntry> {
        self.symbols.get(qualified)
    }

    pub fn get_file(&self, path: &str) -> Option<&FileEntry> {
        self.files.get(path)
    }

    pub fn get_callers(&self, qualified: &str) -> Option<&Vec<String>> {
        self.graph.callers(qualified)
    }

    pub fn get_callees(&self, qualified: &str) -> Option<&Vec<String>> {
        self.graph.callees(qualified)
    }

    /// Effective constraints for a file; defaults when unlisted.
    pub fn file_constraints(&self, path: &str) -> ConstraintSet {
        self.constraints.by_file.get(path).cloned().unwrap_or_default()
    }

    /// Effective constraints for a symbol. Symbols without their own
    /// entry inherit their file's effective set (the cascade already
    /// folded directory and project levels into it).
    pub fn symbol_constraints(&self, qualified: &str) -> ConstraintSet {
        if let Some(set) = self.constraints.by_symbol.get(qualified) {
            return set.clone();
        }
        let file = qualified.rsplit_once(':').map(|(f, _)| f).unwrap_or("");
        self.file_constraints(file)
    }
}

/// Current source state supplied by the caller for staleness checks.
/// The core performs no I/O of its own.
#[derive(Debug, Clone, Default)]
pub struct SourceState {
    pub git_commit: Option<String>,
    /// Path to current mtime (epoch ms).
    pub mtimes_ms: BTreeMap<String, u64>,
}

/// Why a cache is considered stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum StalenessReason {
    CommitChanged { cached: String, current: String },
    FileModified { path: String },
    FileAdded { path: String },
    FileRemoved { path: String },
}

/// Advisory staleness verdict: a rebuild is recommended, never forced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessReport {
    pub stale: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<StalenessReason>,
}
