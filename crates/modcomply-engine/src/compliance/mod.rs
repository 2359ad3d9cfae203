//! Compliance engine.
//!
//! Owns a registry of bound modules (module identity → implementation),
//! requires unanimous approval before a transfer, and forwards
//! administrative calls to modules as itself.

pub mod engine;

pub use engine::{ComplianceEngine, Receipt, MAX_MODULES};
