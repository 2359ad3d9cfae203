//! Top-level facade crate for modcomply.
//!
//! Re-exports core types and the engine library so users can depend on a single crate.

pub mod core {
    pub use modcomply_core::*;
}

pub mod engine {
    pub use modcomply_engine::*;
}
