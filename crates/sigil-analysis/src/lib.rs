//! sigil-analysis: the indexing and resolution engine.
//!
//! Pipeline order (leaf-first):
//! - Comments: per-language comment-dialect scanning
//! - Annotations: `@acp:` grammar parsing and directive validation
//! - Index: symbol/file association
//! - Domains: 3-tier fallback classification
//! - Call graph: best-effort forward/reverse adjacency
//! - Constraints: four-level cascade resolution
//! - Cache: aggregate assembly, integrity checks, staleness
//! - Vars: variable table derivation and `$NAME` expansion
//! - Pipeline: parallel per-file extraction + single aggregation barrier

pub mod annotations;
pub mod cache;
pub mod call_graph;
pub mod comments;
pub mod constraints;
pub mod domains;
pub mod index;
pub mod pipeline;
pub mod vars;

// Re-exports for convenience
pub use annotations::Annotation;
pub use cache::{
    check_staleness, Cache, ProjectInfo, SourceState, StalenessReport, Stats,
};
pub use call_graph::CallGraph;
pub use comments::{CommentBlock, Language};
pub use constraints::{
    resolve, BehaviorProfile, ConstraintLayer, ConstraintSet, LockLevel, StyleConstraint,
};
pub use domains::DomainEntry;
pub use index::{FileEntry, InlineAnnotation, SymbolEntry, SymbolType};
pub use pipeline::{Pipeline, RunOutput, SourceFile};
pub use vars::{Expander, ExpansionOutput, VarType, VariableDefinition, VariableTable};
