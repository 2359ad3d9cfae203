//! modcomply engine library entry.
//!
//! Wires the policy primitives, module code and proxies, the compliance
//! engine, config, metrics, and the read-only HTTP surface. Consumed by the
//! binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod app_state;
pub mod compliance;
pub mod config;
pub mod module;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;

pub use compliance::{ComplianceEngine, Receipt};
pub use module::{ComplianceModule, ModuleFactory, ModuleKind, ModuleProxy};
