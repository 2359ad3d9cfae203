//! The compliance engine: module registry, call router, and transfer gate.
//!
//! Lock order is always engine state → module instance. Modules never call
//! back into the engine.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use bytes::Bytes;
use dashmap::DashMap;

use modcomply_core::protocol::{decode_call, ModuleCall};
use modcomply_core::{Address, Amount, LoggedEvent, ModcomplyError, ModuleEvent, Result};

use crate::module::ComplianceModule;
use crate::obs::EngineMetrics;
use crate::policy::{Authorized, Ownable, Token};

/// Upper bound on bound modules.
pub const MAX_MODULES: usize = 25;

/// Events emitted by one engine call, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    pub events: Vec<LoggedEvent>,
}

impl Receipt {
    fn from_module(module: Address, events: Vec<ModuleEvent>) -> Self {
        Self {
            events: events
                .into_iter()
                .map(|event| LoggedEvent { module, event })
                .collect(),
        }
    }

    /// Events of a given kind, e.g. `"UserAllowed"`.
    pub fn named(&self, name: &str) -> Vec<&ModuleEvent> {
        self.events
            .iter()
            .map(|l| &l.event)
            .filter(|e| e.name() == name)
            .collect()
    }
}

struct EngineState {
    ownable: Ownable,
    token: Option<Address>,
    order: Vec<Address>,
}

pub struct ComplianceEngine {
    address: Address,
    max_modules: usize,
    state: Mutex<EngineState>,
    modules: DashMap<Address, Arc<dyn ComplianceModule>>,
    metrics: Arc<EngineMetrics>,
}

impl ComplianceEngine {
    pub fn new(address: Address, owner: Address, max_modules: usize, metrics: Arc<EngineMetrics>) -> Result<Self> {
        if !(1..=MAX_MODULES).contains(&max_modules) {
            return Err(ModcomplyError::BadRequest(format!(
                "max_modules must be between 1 and {MAX_MODULES}"
            )));
        }
        let mut ownable = Ownable::default();
        ownable.init(owner)?;

        tracing::info!(engine = %address, %owner, max_modules, "compliance engine created");
        Ok(Self {
            address,
            max_modules,
            state: Mutex::new(EngineState {
                ownable,
                token: None,
                order: Vec::new(),
            }),
            modules: DashMap::new(),
            metrics,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineState>> {
        self.state
            .lock()
            .map_err(|_| ModcomplyError::Internal("engine state poisoned".into()))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Result<Option<Address>> {
        Ok(self.lock()?.ownable.owner())
    }

    pub fn token(&self) -> Result<Option<Address>> {
        Ok(self.lock()?.token)
    }

    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<()> {
        let mut st = self.lock()?;
        let auth = st.ownable.only_owner(caller)?;
        st.ownable.transfer_ownership(&auth, new_owner)?;
        tracing::info!(engine = %self.address, previous = %caller, %new_owner, "engine ownership transferred");
        Ok(())
    }

    pub fn bind_token(&self, caller: Address, token: Address) -> Result<()> {
        let mut st = self.lock()?;
        st.ownable.only_owner(caller)?;
        if token.is_zero() {
            return Err(ModcomplyError::BadRequest("token must not be the null identity".into()));
        }
        st.token = Some(token);
        tracing::info!(engine = %self.address, %token, "token bound");
        Ok(())
    }

    pub fn unbind_token(&self, caller: Address) -> Result<()> {
        let mut st = self.lock()?;
        st.ownable.only_owner(caller)?;
        if let Some(token) = st.token.take() {
            tracing::info!(engine = %self.address, %token, "token unbound");
        }
        Ok(())
    }

    fn only_token(st: &EngineState, caller: Address) -> Result<Authorized<Token>> {
        match st.token {
            Some(token) if token == caller => Ok(Authorized::grant(caller)),
            _ => Err(ModcomplyError::OnlyTokenCanCall),
        }
    }

    /// Bound modules in registration order.
    pub fn modules(&self) -> Result<Vec<Address>> {
        Ok(self.lock()?.order.clone())
    }

    pub fn is_module_bound(&self, module: Address) -> bool {
        self.modules.contains_key(&module)
    }

    /// Register and bind `module` to this engine.
    pub fn add_module(&self, caller: Address, module: Arc<dyn ComplianceModule>) -> Result<Receipt> {
        let mut st = self.lock()?;
        st.ownable.only_owner(caller)?;

        let addr = module.address();
        if self.modules.contains_key(&addr) {
            return Err(ModcomplyError::ModuleAlreadyBound(addr));
        }
        if st.order.len() >= self.max_modules {
            return Err(ModcomplyError::TooManyModules(self.max_modules));
        }
        if !module.is_plug_and_play() && !module.can_compliance_bind(self.address) {
            return Err(ModcomplyError::ModuleNotBindable(addr));
        }

        let events = module.bind_compliance(self.address, self.address)?;
        self.modules.insert(addr, module);
        st.order.push(addr);
        self.metrics.modules_bound.set(st.order.len() as i64);

        tracing::info!(engine = %self.address, module = %addr, "module added");
        Ok(self.record(Receipt::from_module(addr, events)))
    }

    /// Unbind and drop `module` from the registry.
    pub fn remove_module(&self, caller: Address, module: Address) -> Result<Receipt> {
        let mut st = self.lock()?;
        st.ownable.only_owner(caller)?;

        let handle = self
            .modules
            .get(&module)
            .map(|m| Arc::clone(m.value()))
            .ok_or(ModcomplyError::ModuleNotBound(module))?;

        let events = handle.unbind_compliance(self.address, self.address)?;
        self.modules.remove(&module);
        st.order.retain(|m| *m != module);
        self.metrics.modules_bound.set(st.order.len() as i64);

        tracing::info!(engine = %self.address, %module, "module removed");
        Ok(self.record(Receipt::from_module(module, events)))
    }

    /// Forward `call` to a bound module, as the engine.
    pub fn route_call(&self, caller: Address, module: Address, call: &ModuleCall) -> Result<Receipt> {
        let res = self.route_call_inner(caller, module, call);
        let outcome = match &res {
            Ok(_) => "ok",
            Err(e) => e.client_code().as_str(),
        };
        self.metrics
            .routed_calls
            .inc(&[("fn", call.function()), ("outcome", outcome)]);
        res
    }

    fn route_call_inner(&self, caller: Address, module: Address, call: &ModuleCall) -> Result<Receipt> {
        let st = self.lock()?;
        st.ownable.only_owner(caller)?;

        let handle = self
            .modules
            .get(&module)
            .map(|m| Arc::clone(m.value()))
            .ok_or(ModcomplyError::ModuleNotBound(module))?;

        let events = handle.call(self.address, call)?;
        drop(st);
        Ok(self.record(Receipt::from_module(module, events)))
    }

    /// Decode a binary call frame and route it.
    pub fn route_encoded(&self, caller: Address, module: Address, frame: Bytes) -> Result<Receipt> {
        let call = decode_call(frame)?;
        self.route_call(caller, module, &call)
    }

    /// Unanimous approval of every bound module. No modules means no rule.
    pub fn can_transfer(&self, from: Address, to: Address, amount: Amount) -> bool {
        let started = Instant::now();
        let allowed = match self.lock() {
            Ok(st) => st.order.iter().all(|addr| {
                self.modules
                    .get(addr)
                    .map(|m| m.module_check(from, to, amount, self.address))
                    .unwrap_or(false)
            }),
            // fail closed
            Err(_) => false,
        };

        let result = if allowed { "allowed" } else { "rejected" };
        self.metrics.transfer_checks.inc(&[("result", result)]);
        self.metrics
            .check_duration
            .observe(&[("engine", "default")], started.elapsed());
        tracing::debug!(engine = %self.address, %from, %to, %amount, result, "transfer check");
        allowed
    }

    /// Post-transfer hook, driven by the bound token.
    pub fn transferred(&self, caller: Address, from: Address, to: Address, amount: Amount) -> Result<()> {
        self.run_hooks(caller, "transfer", &[from, to], amount, |m, engine| {
            m.module_transfer_action(engine, from, to, amount)
        })
    }

    /// Post-mint hook, driven by the bound token.
    pub fn created(&self, caller: Address, to: Address, amount: Amount) -> Result<()> {
        self.run_hooks(caller, "mint", &[to], amount, |m, engine| m.module_mint_action(engine, to, amount))
    }

    /// Post-burn hook, driven by the bound token.
    pub fn destroyed(&self, caller: Address, from: Address, amount: Amount) -> Result<()> {
        self.run_hooks(caller, "burn", &[from], amount, |m, engine| m.module_burn_action(engine, from, amount))
    }

    fn run_hooks<F>(&self, caller: Address, hook: &'static str, parties: &[Address], amount: Amount, f: F) -> Result<()>
    where
        F: Fn(&dyn ComplianceModule, Address) -> Result<()>,
    {
        let st = self.lock()?;
        Self::only_token(&st, caller)?;
        if parties.iter().any(Address::is_zero) {
            return Err(ModcomplyError::BadRequest("invalid argument - zero address".into()));
        }
        if amount == 0 {
            return Err(ModcomplyError::BadRequest("invalid argument - no value transfer".into()));
        }

        for addr in &st.order {
            let Some(module) = self.modules.get(addr).map(|m| Arc::clone(m.value())) else {
                continue;
            };
            if let Err(e) = f(module.as_ref(), self.address) {
                self.metrics
                    .hook_calls
                    .inc(&[("hook", hook), ("outcome", e.client_code().as_str())]);
                tracing::warn!(engine = %self.address, module = %addr, hook, error = %e, "module hook failed");
                return Err(e);
            }
        }
        self.metrics.hook_calls.inc(&[("hook", hook), ("outcome", "ok")]);
        Ok(())
    }

    fn record(&self, receipt: Receipt) -> Receipt {
        for l in &receipt.events {
            self.metrics.module_events.inc(&[("event", l.event.name())]);
        }
        receipt
    }
}
