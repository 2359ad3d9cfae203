//! Transfer restriction: both parties must be allow-listed, except for mint
//! (null sender) and burn (null receiver).

use modcomply_core::protocol::ModuleCall;
use modcomply_core::{Address, Amount, ModuleEvent, Result};

use super::{ModuleLogic, ModuleStorage};
use crate::policy::{Authorized, BoundEngine};

pub const TRANSFER_RESTRICT_NAME: &str = "TransferRestrictModule";

#[derive(Debug, Clone, Copy)]
pub struct TransferRestrictLogic {
    code_ref: Address,
}

impl TransferRestrictLogic {
    pub fn new(code_ref: Address) -> Self {
        Self { code_ref }
    }
}

impl ModuleLogic for TransferRestrictLogic {
    fn code_ref(&self) -> Address {
        self.code_ref
    }

    fn name(&self) -> &'static str {
        TRANSFER_RESTRICT_NAME
    }

    fn is_plug_and_play(&self) -> bool {
        true
    }

    fn can_compliance_bind(&self, _compliance: Address) -> bool {
        true
    }

    // `_value` is part of the uniform module interface; this rule ignores it.
    fn module_check(
        &self,
        storage: &ModuleStorage,
        from: Address,
        to: Address,
        _value: Amount,
        compliance: Address,
    ) -> bool {
        if from.is_zero() || to.is_zero() {
            return true;
        }
        storage.allow_list.is_allowed(compliance, from) && storage.allow_list.is_allowed(compliance, to)
    }

    fn execute(
        &self,
        storage: &mut ModuleStorage,
        auth: &Authorized<BoundEngine>,
        call: &ModuleCall,
    ) -> Result<Vec<ModuleEvent>> {
        let list = &mut storage.allow_list;
        let events = match call {
            ModuleCall::AllowUser(user) => vec![list.allow(auth, *user)],
            ModuleCall::DisallowUser(user) => vec![list.disallow(auth, *user)],
            ModuleCall::BatchAllowUsers(users) => list.batch_allow(auth, users),
            ModuleCall::BatchDisallowUsers(users) => list.batch_disallow(auth, users),
            // no derived state to track
            ModuleCall::MintAction { .. }
            | ModuleCall::BurnAction { .. }
            | ModuleCall::TransferAction { .. } => Vec::new(),
        };
        Ok(events)
    }
}
