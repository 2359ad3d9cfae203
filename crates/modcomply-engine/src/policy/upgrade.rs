//! One-shot initializer and upgrade authorization.

use modcomply_core::{Address, ModcomplyError, ModuleEvent, Result};

use super::access::Ownable;
use super::guard::{Authorized, Owner};

/// Version reported by the `Initialized` event.
pub const INITIALIZER_VERSION: u8 = 1;

/// Monotonic: once set, never cleared (upgrades included).
#[derive(Debug, Clone, Copy, Default)]
pub struct Initializable {
    initialized: bool,
}

impl Initializable {
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn initializer(&mut self) -> Result<ModuleEvent> {
        if self.initialized {
            return Err(ModcomplyError::AlreadyInitialized);
        }
        self.initialized = true;
        Ok(ModuleEvent::Initialized {
            version: INITIALIZER_VERSION,
        })
    }
}

/// Upgrade hook: only the owner may swap the code pointer.
pub fn authorize_upgrade(ownable: &Ownable, caller: Address) -> Result<Authorized<Owner>> {
    ownable.only_owner(caller)
}
