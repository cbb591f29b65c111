//! Domain layer types and invariants.

pub mod error;
pub mod incident;
pub mod policy;
pub mod sop;
