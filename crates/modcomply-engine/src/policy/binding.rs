//! Module → engine binding.
//!
//! The engine's registration flow binds itself; the module only ever reads
//! the bound value afterwards. Ownership does not grant policy-mutation
//! rights: only the bound engine gets an `Authorized<BoundEngine>`.

use modcomply_core::{Address, ModcomplyError, ModuleEvent, Result};

use super::guard::{Authorized, BoundEngine};

#[derive(Debug, Clone, Copy, Default)]
pub struct Binding {
    engine: Option<Address>,
}

impl Binding {
    pub fn bound(&self) -> Option<Address> {
        self.engine
    }

    pub fn is_bound_caller(&self, caller: Address) -> bool {
        self.engine == Some(caller)
    }

    pub fn only_bound_compliance(&self, caller: Address) -> Result<Authorized<BoundEngine>> {
        if self.is_bound_caller(caller) {
            Ok(Authorized::grant(caller))
        } else {
            Err(ModcomplyError::CallerNotBoundCompliance)
        }
    }

    /// Only `engine` itself may bind, and only while unbound.
    pub(crate) fn bind(&mut self, caller: Address, engine: Address) -> Result<ModuleEvent> {
        if caller != engine || engine.is_zero() {
            return Err(ModcomplyError::OnlyComplianceCanBind);
        }
        if let Some(current) = self.engine {
            return Err(ModcomplyError::ComplianceAlreadyBound(current));
        }
        self.engine = Some(engine);
        Ok(ModuleEvent::ComplianceBound { compliance: engine })
    }

    pub(crate) fn unbind(&mut self, caller: Address, engine: Address) -> Result<ModuleEvent> {
        if caller != engine {
            return Err(ModcomplyError::OnlyComplianceCanBind);
        }
        if self.engine != Some(engine) {
            return Err(ModcomplyError::ComplianceNotBound(engine));
        }
        self.engine = None;
        Ok(ModuleEvent::ComplianceUnbound { compliance: engine })
    }
}
