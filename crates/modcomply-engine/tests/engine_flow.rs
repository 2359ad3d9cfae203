//! Engine-side lifecycle: registration, unanimity, token-driven hooks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use modcomply_core::protocol::ModuleCall;
use modcomply_core::{Address, Amount, ModcomplyError, ModuleEvent, Result};
use modcomply_engine::module::{ComplianceModule, ModuleKind, ModuleProxy};

use fixture::{addr, deploy_suite, engine_with, Suite};

fn second_module(s: &Suite) -> Arc<ModuleProxy> {
    let code = s.factory.deploy_logic(ModuleKind::TransferRestrict);
    let m = s.factory.deploy_proxy(s.accounts.deployer, code).unwrap();
    s.engine.add_module(s.accounts.deployer, m.clone()).unwrap();
    m
}

fn allow_on(s: &Suite, module: Address, users: &[Address]) {
    s.engine
        .route_call(s.accounts.deployer, module, &ModuleCall::BatchAllowUsers(users.to_vec()))
        .unwrap();
}

/// Module that requires engine-side setup and refuses every engine.
struct PickyModule {
    address: Address,
}

impl ComplianceModule for PickyModule {
    fn address(&self) -> Address {
        self.address
    }
    fn name(&self) -> &'static str {
        "PickyModule"
    }
    fn is_plug_and_play(&self) -> bool {
        false
    }
    fn can_compliance_bind(&self, _compliance: Address) -> bool {
        false
    }
    fn is_compliance_bound(&self, _compliance: Address) -> bool {
        false
    }
    fn bind_compliance(&self, _caller: Address, _compliance: Address) -> Result<Vec<ModuleEvent>> {
        panic!("engine must not bind a module that refused")
    }
    fn unbind_compliance(&self, _caller: Address, _compliance: Address) -> Result<Vec<ModuleEvent>> {
        Ok(vec![])
    }
    fn module_check(&self, _from: Address, _to: Address, _value: Amount, _compliance: Address) -> bool {
        false
    }
    fn call(&self, _caller: Address, _call: &ModuleCall) -> Result<Vec<ModuleEvent>> {
        Ok(vec![])
    }
}

#[test]
fn engine_without_modules_allows_everything() {
    let (engine, _) = engine_with(addr(0xd0), 25);
    assert!(engine.modules().unwrap().is_empty());
    assert!(engine.can_transfer(addr(1), addr(2), 10));
}

#[test]
fn can_transfer_requires_unanimity() {
    let s = deploy_suite();
    let a = &s.accounts;
    let second = second_module(&s);
    assert_eq!(s.engine.modules().unwrap(), vec![s.module.address(), second.address()]);

    allow_on(&s, s.module.address(), &[a.alice, a.bob]);
    assert!(!s.engine.can_transfer(a.alice, a.bob, 10), "second module still rejects");

    allow_on(&s, second.address(), &[a.alice, a.bob]);
    assert!(s.engine.can_transfer(a.alice, a.bob, 10));
    assert!(!s.engine.can_transfer(a.alice, a.carol, 10));

    // mint and burn bypass every transfer-restrict module
    assert!(s.engine.can_transfer(Address::ZERO, a.carol, 10));
    assert!(s.engine.can_transfer(a.carol, Address::ZERO, 10));

    assert_eq!(s.metrics.transfer_checks.get(&[("result", "allowed")]), 3);
    assert_eq!(s.metrics.transfer_checks.get(&[("result", "rejected")]), 2);
}

#[test]
fn add_module_rejects_duplicates_and_non_owner() {
    let s = deploy_suite();
    let a = &s.accounts;

    assert_eq!(
        s.engine.add_module(a.deployer, s.module.clone()).unwrap_err(),
        ModcomplyError::ModuleAlreadyBound(s.module.address())
    );

    let code = s.factory.deploy_logic(ModuleKind::TransferRestrict);
    let m = s.factory.deploy_proxy(a.deployer, code).unwrap();
    assert_eq!(s.engine.add_module(a.alice, m.clone()).unwrap_err(), ModcomplyError::NotOwner);
    assert!(!s.engine.is_module_bound(m.address()));
    assert_eq!(m.bound_compliance(), None);
}

#[test]
fn module_bound_elsewhere_cannot_be_added() {
    let s = deploy_suite();
    let (other, _) = engine_with(addr(0xee), 25);

    let err = other.add_module(addr(0xee), s.module.clone()).unwrap_err();
    assert_eq!(err, ModcomplyError::ComplianceAlreadyBound(s.engine.address()));
    assert!(!other.is_module_bound(s.module.address()));
    assert_eq!(s.module.bound_compliance(), Some(s.engine.address()));
}

#[test]
fn module_limit_is_enforced() {
    let s = deploy_suite();
    let (engine, metrics) = engine_with(s.accounts.deployer, 1);

    let code = s.factory.deploy_logic(ModuleKind::TransferRestrict);
    let first = s.factory.deploy_proxy(s.accounts.deployer, code.clone()).unwrap();
    let second = s.factory.deploy_proxy(s.accounts.deployer, code).unwrap();

    engine.add_module(s.accounts.deployer, first).unwrap();
    assert_eq!(
        engine.add_module(s.accounts.deployer, second).unwrap_err(),
        ModcomplyError::TooManyModules(1)
    );
    assert_eq!(metrics.modules_bound.get(), 1);
}

#[test]
fn non_plug_and_play_module_must_accept_binding() {
    let s = deploy_suite();
    let picky = Arc::new(PickyModule { address: addr(0x99) });

    let err = s.engine.add_module(s.accounts.deployer, picky).unwrap_err();
    assert_eq!(err, ModcomplyError::ModuleNotBindable(addr(0x99)));
    assert!(!s.engine.is_module_bound(addr(0x99)));
}

#[test]
fn only_the_engine_binds_itself() {
    let s = deploy_suite();
    let code = s.factory.deploy_logic(ModuleKind::TransferRestrict);
    let m = s.factory.deploy_proxy(s.accounts.deployer, code).unwrap();
    let engine = s.engine.address();

    // owner of the module is not the engine
    assert_eq!(
        m.bind_compliance(s.accounts.deployer, engine),
        Err(ModcomplyError::OnlyComplianceCanBind)
    );
    assert_eq!(m.unbind_compliance(s.accounts.alice, engine), Err(ModcomplyError::OnlyComplianceCanBind));
    assert_eq!(m.unbind_compliance(engine, engine), Err(ModcomplyError::ComplianceNotBound(engine)));
    assert_eq!(m.bound_compliance(), None);
}

#[test]
fn remove_module_retires_binding() {
    let s = deploy_suite();
    let a = &s.accounts;
    let engine = s.engine.address();
    let module = s.module.address();
    allow_on(&s, module, &[a.alice]);

    assert_eq!(s.engine.remove_module(a.alice, module).unwrap_err(), ModcomplyError::NotOwner);

    let r = s.engine.remove_module(a.deployer, module).unwrap();
    assert_eq!(r.named("ComplianceUnbound"), vec![&ModuleEvent::ComplianceUnbound { compliance: engine }]);
    assert!(!s.engine.is_module_bound(module));
    assert!(s.engine.modules().unwrap().is_empty());
    assert_eq!(s.module.bound_compliance(), None);
    assert_eq!(s.metrics.modules_bound.get(), 0);

    // the engine lost its mutation rights
    assert_eq!(
        s.module.call(engine, &ModuleCall::AllowUser(a.bob)),
        Err(ModcomplyError::CallerNotBoundCompliance)
    );
    assert_eq!(
        s.engine.route_call(a.deployer, module, &ModuleCall::AllowUser(a.bob)).unwrap_err(),
        ModcomplyError::ModuleNotBound(module)
    );
    assert_eq!(
        s.engine.remove_module(a.deployer, module).unwrap_err(),
        ModcomplyError::ModuleNotBound(module)
    );

    // storage stays readable
    assert!(s.module.is_user_allowed(engine, a.alice));
}

#[test]
fn hooks_are_driven_by_the_bound_token() {
    let s = deploy_suite();
    let a = &s.accounts;
    second_module(&s);

    s.engine.transferred(a.token, a.alice, a.bob, 10).unwrap();
    s.engine.created(a.token, a.alice, 10).unwrap();
    s.engine.destroyed(a.token, a.alice, 10).unwrap();
    assert_eq!(s.metrics.hook_calls.get(&[("hook", "transfer"), ("outcome", "ok")]), 1);

    for caller in [a.deployer, a.alice] {
        assert_eq!(s.engine.transferred(caller, a.alice, a.bob, 10), Err(ModcomplyError::OnlyTokenCanCall));
        assert_eq!(s.engine.created(caller, a.alice, 10), Err(ModcomplyError::OnlyTokenCanCall));
        assert_eq!(s.engine.destroyed(caller, a.alice, 10), Err(ModcomplyError::OnlyTokenCanCall));
    }
}

#[test]
fn hooks_reject_null_parties_and_zero_value() {
    let s = deploy_suite();
    let a = &s.accounts;

    let codes = [
        s.engine.transferred(a.token, Address::ZERO, a.bob, 10),
        s.engine.transferred(a.token, a.alice, Address::ZERO, 10),
        s.engine.transferred(a.token, a.alice, a.bob, 0),
        s.engine.created(a.token, Address::ZERO, 10),
        s.engine.destroyed(a.token, Address::ZERO, 10),
        s.engine.created(a.token, a.alice, 0),
    ];
    for res in codes {
        assert_eq!(res.unwrap_err().client_code().as_str(), "BAD_REQUEST");
    }
}

#[test]
fn unbound_token_stops_hooks() {
    let s = deploy_suite();
    let a = &s.accounts;

    assert_eq!(s.engine.unbind_token(a.alice), Err(ModcomplyError::NotOwner));
    s.engine.unbind_token(a.deployer).unwrap();
    assert_eq!(s.engine.token().unwrap(), None);
    assert_eq!(s.engine.created(a.token, a.alice, 10), Err(ModcomplyError::OnlyTokenCanCall));
}

#[test]
fn engine_ownership_transfer() {
    let s = deploy_suite();
    let a = &s.accounts;

    assert_eq!(s.engine.transfer_ownership(a.alice, a.alice), Err(ModcomplyError::NotOwner));
    assert_eq!(
        s.engine.transfer_ownership(a.deployer, Address::ZERO),
        Err(ModcomplyError::InvalidNewOwner)
    );
    s.engine.transfer_ownership(a.deployer, a.bob).unwrap();
    assert_eq!(s.engine.owner().unwrap(), Some(a.bob));

    assert_eq!(
        s.engine
            .route_call(a.deployer, s.module.address(), &ModuleCall::AllowUser(a.alice))
            .unwrap_err(),
        ModcomplyError::NotOwner
    );
    s.engine
        .route_call(a.bob, s.module.address(), &ModuleCall::AllowUser(a.alice))
        .unwrap();
    // module ownership is independent from engine ownership
    assert_eq!(s.module.owner(), Some(a.deployer));
}

#[test]
fn concurrent_routed_calls_are_serialized() {
    let s = deploy_suite();
    let module = s.module.address();
    let engine = s.engine.address();

    std::thread::scope(|scope| {
        for t in 0..4u8 {
            let s = &s;
            scope.spawn(move || {
                for i in 0..25u8 {
                    let user = Address::new([t.wrapping_mul(32).wrapping_add(i + 1); 20]);
                    s.engine
                        .route_call(s.accounts.deployer, module, &ModuleCall::AllowUser(user))
                        .unwrap();
                }
            });
        }
    });

    let allowed = s
        .module
        .events()
        .into_iter()
        .filter(|e| matches!(e, ModuleEvent::UserAllowed { .. }))
        .count();
    assert_eq!(allowed, 100);
    for t in 0..4u8 {
        for i in 0..25u8 {
            let user = Address::new([t.wrapping_mul(32).wrapping_add(i + 1); 20]);
            assert!(s.module.is_user_allowed(engine, user));
        }
    }
    assert_eq!(s.metrics.routed_calls.get(&[("fn", "allowUser"), ("outcome", "ok")]), 100);
}
