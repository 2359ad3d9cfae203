//! Module deployment.
//!
//! Code bodies are deployed once and shared; each instance gets fresh
//! storage and is initialized independently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use modcomply_core::{Address, Result};

use super::{ModuleKind, ModuleLogic, ModuleProxy, TransferRestrictLogic};

pub struct ModuleFactory {
    address: Address,
    nonce: AtomicU64,
}

impl ModuleFactory {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            nonce: AtomicU64::new(1),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn next_address(&self) -> Address {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        Address::derive(self.address, nonce)
    }

    /// Deploy a new code body of `kind`.
    pub fn deploy_logic(&self, kind: ModuleKind) -> Arc<dyn ModuleLogic> {
        let code_ref = self.next_address();
        tracing::debug!(factory = %self.address, ?kind, %code_ref, "code deployed");
        match kind {
            ModuleKind::TransferRestrict => Arc::new(TransferRestrictLogic::new(code_ref)),
        }
    }

    /// Fresh instance, not initialized yet.
    pub fn deploy_uninitialized(&self, implementation: Arc<dyn ModuleLogic>) -> Arc<ModuleProxy> {
        Arc::new(ModuleProxy::new(self.next_address(), implementation))
    }

    /// Fresh instance initialized by `deployer`, who becomes its owner.
    pub fn deploy_proxy(
        &self,
        deployer: Address,
        implementation: Arc<dyn ModuleLogic>,
    ) -> Result<Arc<ModuleProxy>> {
        let proxy = self.deploy_uninitialized(implementation);
        proxy.initialize(deployer)?;
        Ok(proxy)
    }
}
