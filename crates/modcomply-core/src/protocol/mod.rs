//! Engine → module wire format.
//!
//! The engine forwards administrative calls to modules as compact binary
//! frames (version byte, selector, fixed-width arguments). The parser is
//! panic-free: malformed input is reported as `ModcomplyError` instead of
//! panicking or indexing raw buffers.

pub mod call;

pub use call::{decode_call, encode_call, ModuleCall};
