//! Capability tokens.
//!
//! An `Authorized<R>` proves that `caller` passed the check for role `R`.
//! Only this crate can mint one.

use std::marker::PhantomData;

use modcomply_core::Address;

/// Holder of administrative rights (ownership transfer, upgrades).
#[derive(Debug)]
pub struct Owner;

/// The engine instance a module is bound to.
#[derive(Debug)]
pub struct BoundEngine;

/// The token bound to an engine.
#[derive(Debug)]
pub struct Token;

#[derive(Debug)]
pub struct Authorized<R> {
    caller: Address,
    _role: PhantomData<R>,
}

impl<R> Authorized<R> {
    pub(crate) fn grant(caller: Address) -> Self {
        Self {
            caller,
            _role: PhantomData,
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }
}
