//! Policy modules.
//!
//! A module instance is a [`ModuleProxy`]: persisted [`ModuleStorage`] plus a
//! swappable code body implementing [`ModuleLogic`]. The engine talks to
//! instances only through [`ComplianceModule`], so heterogeneous modules can
//! be registered side by side.

pub mod factory;
pub mod proxy;
pub mod transfer_restrict;

use serde::Deserialize;

use modcomply_core::protocol::ModuleCall;
use modcomply_core::{Address, Amount, ModuleEvent, Result};

use crate::policy::{AllowList, Authorized, Binding, BoundEngine, Initializable, Ownable};

pub use factory::ModuleFactory;
pub use proxy::ModuleProxy;
pub use transfer_restrict::TransferRestrictLogic;

/// Deployable module kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    TransferRestrict,
}

/// Storage of one module instance. Survives code upgrades untouched.
#[derive(Debug, Clone, Default)]
pub struct ModuleStorage {
    pub ownable: Ownable,
    pub init: Initializable,
    pub binding: Binding,
    pub allow_list: AllowList,
}

/// A code body. Stateless: everything it reads or writes lives in the
/// `ModuleStorage` handed to it.
pub trait ModuleLogic: Send + Sync {
    /// Identity of the deployed code.
    fn code_ref(&self) -> Address;
    fn name(&self) -> &'static str;
    fn is_plug_and_play(&self) -> bool;
    fn can_compliance_bind(&self, compliance: Address) -> bool;

    /// Transfer-eligibility predicate. Must not fail.
    fn module_check(
        &self,
        storage: &ModuleStorage,
        from: Address,
        to: Address,
        value: Amount,
        compliance: Address,
    ) -> bool;

    /// Run a routed call. The binding guard has already passed.
    fn execute(
        &self,
        storage: &mut ModuleStorage,
        auth: &Authorized<BoundEngine>,
        call: &ModuleCall,
    ) -> Result<Vec<ModuleEvent>>;
}

/// What the engine sees of a module instance.
pub trait ComplianceModule: Send + Sync {
    fn address(&self) -> Address;
    fn name(&self) -> &'static str;

    /// `true` when no engine-side setup is needed before binding.
    fn is_plug_and_play(&self) -> bool;

    /// Pre-bind compatibility check.
    fn can_compliance_bind(&self, compliance: Address) -> bool;
    fn is_compliance_bound(&self, compliance: Address) -> bool;

    fn bind_compliance(&self, caller: Address, compliance: Address) -> Result<Vec<ModuleEvent>>;
    fn unbind_compliance(&self, caller: Address, compliance: Address) -> Result<Vec<ModuleEvent>>;

    fn module_check(&self, from: Address, to: Address, value: Amount, compliance: Address) -> bool;

    fn module_mint_action(&self, caller: Address, to: Address, value: Amount) -> Result<()> {
        self.call(caller, &ModuleCall::MintAction { to, value }).map(|_| ())
    }

    fn module_burn_action(&self, caller: Address, from: Address, value: Amount) -> Result<()> {
        self.call(caller, &ModuleCall::BurnAction { from, value }).map(|_| ())
    }

    fn module_transfer_action(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        value: Amount,
    ) -> Result<()> {
        self.call(caller, &ModuleCall::TransferAction { from, to, value })
            .map(|_| ())
    }

    /// Invoke a mutating entry point as `caller`.
    fn call(&self, caller: Address, call: &ModuleCall) -> Result<Vec<ModuleEvent>>;
}
