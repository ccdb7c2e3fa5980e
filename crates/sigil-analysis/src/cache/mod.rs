//! Cache subsystem: the immutable run aggregate, assembly with
//! referential integrity checks, and advisory staleness detection.

pub mod assembler;
pub mod staleness;
pub mod types;

pub use assembler::assemble;
pub use staleness::check_staleness;
pub use types::{
    Cache, ConstraintIndex, ProjectInfo, SourceState, StalenessReason, StalenessReport, Stats,
};
