//! Single-owner access control.
//!
//! No acceptance step: ownership moves as soon as the current owner asks.

use modcomply_core::{Address, ModcomplyError, ModuleEvent, Result};

use super::guard::{Authorized, Owner};

#[derive(Debug, Clone, Default)]
pub struct Ownable {
    owner: Option<Address>,
}

impl Ownable {
    /// `None` until initialized.
    pub fn owner(&self) -> Option<Address> {
        self.owner
    }

    /// Fails closed: an unset owner matches nobody.
    pub fn only_owner(&self, caller: Address) -> Result<Authorized<Owner>> {
        match self.owner {
            Some(owner) if owner == caller => Ok(Authorized::grant(caller)),
            _ => Err(ModcomplyError::NotOwner),
        }
    }

    /// Establish the first owner.
    pub(crate) fn init(&mut self, owner: Address) -> Result<ModuleEvent> {
        if owner.is_zero() {
            return Err(ModcomplyError::InvalidNewOwner);
        }
        let previous_owner = self.owner.unwrap_or(Address::ZERO);
        self.owner = Some(owner);
        Ok(ModuleEvent::OwnershipTransferred {
            previous_owner,
            new_owner: owner,
        })
    }

    pub fn transfer_ownership(
        &mut self,
        auth: &Authorized<Owner>,
        new_owner: Address,
    ) -> Result<ModuleEvent> {
        if new_owner.is_zero() {
            return Err(ModcomplyError::InvalidNewOwner);
        }
        self.owner = Some(new_owner);
        Ok(ModuleEvent::OwnershipTransferred {
            previous_owner: auth.caller(),
            new_owner,
        })
    }
}
