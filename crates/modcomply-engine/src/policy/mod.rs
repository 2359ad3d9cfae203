//! Policy primitives shared by module code and the engine.
//!
//! Each primitive owns one slice of persisted state and exposes a check that
//! returns an [`Authorized`] capability. Mutating functions take that
//! capability by reference, so a write cannot be reached without the check
//! having passed first.

pub mod access;
pub mod allowlist;
pub mod binding;
pub mod guard;
pub mod upgrade;

pub use access::Ownable;
pub use allowlist::AllowList;
pub use binding::Binding;
pub use guard::{Authorized, BoundEngine, Owner, Token};
pub use upgrade::{authorize_upgrade, Initializable};
