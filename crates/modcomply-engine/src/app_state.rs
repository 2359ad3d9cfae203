//! Shared application state for the modcomply engine.
//!
//! Builds the engine from config, deploys and binds the configured modules,
//! and seeds their allow-lists through the engine's routed call path.

use std::collections::HashMap;
use std::sync::Arc;

use modcomply_core::error::{ModcomplyError, Result};
use modcomply_core::protocol::ModuleCall;
use modcomply_core::Address;

use crate::compliance::ComplianceEngine;
use crate::config::EngineConfig;
use crate::module::{ComplianceModule, ModuleFactory, ModuleProxy};
use crate::obs::EngineMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    engine: Arc<ComplianceEngine>,
    metrics: Arc<EngineMetrics>,
}

struct AppStateInner {
    cfg: EngineConfig,
    deployments: HashMap<Address, Arc<ModuleProxy>>,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        let owner = cfg.engine.owner;
        let metrics = Arc::new(EngineMetrics::default());

        // 1) Engine + factory identities derive from the owner
        let engine_addr = Address::derive(owner, 0);
        let engine = Arc::new(ComplianceEngine::new(
            engine_addr,
            owner,
            cfg.engine.max_modules,
            Arc::clone(&metrics),
        )?);
        if let Some(token) = cfg.engine.token {
            engine.bind_token(owner, token)?;
        }
        let factory = ModuleFactory::new(Address::derive(engine_addr, 0));

        // 2) Deploy, bind, seed
        let mut deployments = HashMap::new();
        for (i, m) in cfg.modules.iter().enumerate() {
            let code = factory.deploy_logic(m.kind);
            let proxy = factory.deploy_proxy(owner, code)?;
            let addr = proxy.address();

            engine.add_module(owner, proxy.clone()).map_err(|e| {
                ModcomplyError::BadRequest(format!("module #{i} ({:?}) bind failed: {e}", m.kind))
            })?;

            if !m.allow.is_empty() {
                let receipt = engine.route_call(owner, addr, &ModuleCall::BatchAllowUsers(m.allow.clone()))?;
                tracing::info!(module = %addr, allowed = receipt.events.len(), "allow-list seeded");
            }

            deployments.insert(addr, proxy);
        }

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, deployments }),
            engine,
            metrics,
        })
    }

    pub fn cfg(&self) -> &EngineConfig {
        &self.inner.cfg
    }

    pub fn engine(&self) -> Arc<ComplianceEngine> {
        Arc::clone(&self.engine)
    }

    pub fn deployment(&self, module: Address) -> Option<Arc<ModuleProxy>> {
        self.inner.deployments.get(&module).cloned()
    }

    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }
}
