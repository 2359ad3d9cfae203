//! modcomply core: identities, error taxonomy, module events, and the encoded
//! call format shared by the engine, modules, and tooling.
//!
//! This crate carries no async runtime or transport so it can be
//! reused by anything that needs to talk to a policy module.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ModcomplyError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod event;
pub mod identity;
pub mod protocol;

/// Shared result type.
pub use error::{ModcomplyError, Result};
pub use event::{LoggedEvent, ModuleEvent};
pub use identity::{Address, Amount};
