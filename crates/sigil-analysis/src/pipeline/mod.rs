//! Pipeline: parallel per-file extraction, one aggregation barrier, and
//! the run-wide strictness policy.

pub mod extract;
pub mod runner;

pub use extract::{extract_file, SourceFile};
pub use runner::{Pipeline, RunOutput};
