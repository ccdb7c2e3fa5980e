//! Constraint subsystem: types and the four-level cascade resolver.

pub mod resolver;
pub mod types;

pub use resolver::resolve;
pub use types::{BehaviorProfile, ConstraintLayer, ConstraintSet, LockLevel, StyleConstraint};
