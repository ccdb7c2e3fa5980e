//! Call graph subsystem.
//!
//! Best-effort: only statically resolvable same-project calls and
//! explicitly declared relations are recorded. Dynamic dispatch,
//! reflection, and cross-language calls are not tracked.

pub mod builder;
pub mod types;

pub use builder::build_call_graph;
pub use types::CallGraph;
