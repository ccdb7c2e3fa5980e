//! Resource limits.

use serde::{Deserialize, Serialize};

/// Limits enforced during the parallel extraction phase. Exceeding one
/// produces a `Resource` diagnostic for the offending file; it never
/// corrupts other files' results.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in bytes.
    pub max_file_size: Option<u64>,
    /// Maximum number of input files per run.
    pub max_files: Option<usize>,
    /// Maximum annotations accepted per file.
    pub max_annotations_per_file: Option<usize>,
    /// Maximum recursive variable expansion depth.
    pub max_expansion_depth: Option<usize>,
}

impl LimitsConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(1_048_576)
    }

    pub fn effective_max_files(&self) -> usize {
        self.max_files.unwrap_or(10_000)
    }

    pub fn effective_max_annotations_per_file(&self) -> usize {
        self.max_annotations_per_file.unwrap_or(500)
    }

    pub fn effective_max_expansion_depth(&self) -> usize {
        self.max_expansion_depth.unwrap_or(10)
    }
}
