//! Domain subsystem: 3-tier fallback classification and domain groupings.

pub mod classifier;

pub use classifier::{build_domain_entries, classify_files};

use serde::{Deserialize, Serialize};

/// A domain grouping in the assembled cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntry {
    pub name: String,
    /// Files in this domain, sorted.
    pub files: Vec<String>,
    /// Qualified symbol names in this domain, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
