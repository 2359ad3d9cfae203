//! Module instance: storage behind one lock, plus a swappable code pointer.
//!
//! Every entry point runs to completion under the instance lock. Guards run
//! before any write, and emitted events are appended to the audit log only
//! when the whole call succeeded, so a rejected call leaves no trace.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use modcomply_core::protocol::ModuleCall;
use modcomply_core::{Address, Amount, ModcomplyError, ModuleEvent, Result};

use super::{ComplianceModule, ModuleLogic, ModuleStorage};
use crate::policy::authorize_upgrade;

pub struct ModuleProxy {
    address: Address,
    state: Mutex<ProxyState>,
}

struct ProxyState {
    storage: ModuleStorage,
    implementation: Arc<dyn ModuleLogic>,
    log: Vec<ModuleEvent>,
}

impl ModuleProxy {
    /// Deployed but not initialized: no owner, unbound, empty allow-list.
    pub fn new(address: Address, implementation: Arc<dyn ModuleLogic>) -> Self {
        Self {
            address,
            state: Mutex::new(ProxyState {
                storage: ModuleStorage::default(),
                implementation,
                log: Vec::new(),
            }),
        }
    }

    /// Mutating calls refuse to run on a poisoned lock.
    fn lock_mut(&self) -> Result<MutexGuard<'_, ProxyState>> {
        self.state
            .lock()
            .map_err(|_| ModcomplyError::Internal(format!("module {} state poisoned", self.address)))
    }

    // Writes only happen after every guard passed, so even a poisoned guard
    // holds committed state.
    fn lock_read(&self) -> MutexGuard<'_, ProxyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transact<F>(&self, op: &'static str, f: F) -> Result<Vec<ModuleEvent>>
    where
        F: FnOnce(&mut ProxyState) -> Result<Vec<ModuleEvent>>,
    {
        let mut state = self.lock_mut()?;
        match f(&mut state) {
            Ok(events) => {
                for ev in &events {
                    tracing::info!(module = %self.address, op, event = ev.name(), ?ev, "module event");
                }
                state.log.extend(events.iter().cloned());
                Ok(events)
            }
            Err(e) => {
                tracing::warn!(module = %self.address, op, code = e.client_code().as_str(), "module call rejected");
                Err(e)
            }
        }
    }

    /// One-shot: sets the owner to `caller`.
    pub fn initialize(&self, caller: Address) -> Result<Vec<ModuleEvent>> {
        self.transact("initialize", |s| {
            if s.storage.init.is_initialized() {
                return Err(ModcomplyError::AlreadyInitialized);
            }
            let owned = s.storage.ownable.init(caller)?;
            let initialized = s.storage.init.initializer()?;
            Ok(vec![owned, initialized])
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.lock_read().storage.init.is_initialized()
    }

    pub fn owner(&self) -> Option<Address> {
        self.lock_read().storage.ownable.owner()
    }

    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<Vec<ModuleEvent>> {
        self.transact("transferOwnership", |s| {
            let auth = s.storage.ownable.only_owner(caller)?;
            let ev = s.storage.ownable.transfer_ownership(&auth, new_owner)?;
            Ok(vec![ev])
        })
    }

    /// Swap the code body. Storage, including the initialized flag, is kept.
    pub fn upgrade_to(&self, caller: Address, implementation: Arc<dyn ModuleLogic>) -> Result<Vec<ModuleEvent>> {
        self.transact("upgradeTo", |s| {
            authorize_upgrade(&s.storage.ownable, caller)?;
            let code_ref = implementation.code_ref();
            s.implementation = implementation;
            Ok(vec![ModuleEvent::Upgraded {
                implementation: code_ref,
            }])
        })
    }

    /// Current code reference.
    pub fn implementation(&self) -> Address {
        self.lock_read().implementation.code_ref()
    }

    pub fn bound_compliance(&self) -> Option<Address> {
        self.lock_read().storage.binding.bound()
    }

    pub fn is_user_allowed(&self, compliance: Address, user: Address) -> bool {
        self.lock_read().storage.allow_list.is_allowed(compliance, user)
    }

    /// Users currently allowed under `compliance`.
    pub fn allowed_count(&self, compliance: Address) -> usize {
        self.lock_read().storage.allow_list.len(compliance)
    }

    /// Snapshot of every event this instance committed, oldest first.
    pub fn events(&self) -> Vec<ModuleEvent> {
        self.lock_read().log.clone()
    }
}

impl ComplianceModule for ModuleProxy {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &'static str {
        self.lock_read().implementation.name()
    }

    fn is_plug_and_play(&self) -> bool {
        self.lock_read().implementation.is_plug_and_play()
    }

    fn can_compliance_bind(&self, compliance: Address) -> bool {
        self.lock_read().implementation.can_compliance_bind(compliance)
    }

    fn is_compliance_bound(&self, compliance: Address) -> bool {
        self.lock_read().storage.binding.bound() == Some(compliance)
    }

    fn bind_compliance(&self, caller: Address, compliance: Address) -> Result<Vec<ModuleEvent>> {
        self.transact("bindCompliance", |s| {
            Ok(vec![s.storage.binding.bind(caller, compliance)?])
        })
    }

    fn unbind_compliance(&self, caller: Address, compliance: Address) -> Result<Vec<ModuleEvent>> {
        self.transact("unbindCompliance", |s| {
            Ok(vec![s.storage.binding.unbind(caller, compliance)?])
        })
    }

    // A poisoned instance denies.
    fn module_check(&self, from: Address, to: Address, value: Amount, compliance: Address) -> bool {
        match self.state.lock() {
            Ok(s) => s
                .implementation
                .module_check(&s.storage, from, to, value, compliance),
            Err(_) => false,
        }
    }

    fn call(&self, caller: Address, call: &ModuleCall) -> Result<Vec<ModuleEvent>> {
        self.transact(call.function(), |s| {
            let auth = s.storage.binding.only_bound_compliance(caller)?;
            let code = Arc::clone(&s.implementation);
            code.execute(&mut s.storage, &auth, call)
        })
    }
}
