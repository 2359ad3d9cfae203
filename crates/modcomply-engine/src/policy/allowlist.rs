//! Allow-list store.
//!
//! Membership is keyed by `(engine, user)`. Every mutation emits a
//! notification whether or not membership changed.

use std::collections::{HashMap, HashSet};

use modcomply_core::{Address, ModuleEvent};

use super::guard::{Authorized, BoundEngine};

#[derive(Debug, Clone, Default)]
pub struct AllowList {
    users: HashMap<Address, HashSet<Address>>,
}

impl AllowList {
    pub fn is_allowed(&self, engine: Address, user: Address) -> bool {
        self.users
            .get(&engine)
            .map(|set| set.contains(&user))
            .unwrap_or(false)
    }

    /// Number of users allowed under `engine`.
    pub fn len(&self, engine: Address) -> usize {
        self.users.get(&engine).map(HashSet::len).unwrap_or(0)
    }

    pub fn allow(&mut self, auth: &Authorized<BoundEngine>, user: Address) -> ModuleEvent {
        let engine = auth.caller();
        self.users.entry(engine).or_default().insert(user);
        ModuleEvent::UserAllowed {
            compliance: engine,
            user,
        }
    }

    pub fn disallow(&mut self, auth: &Authorized<BoundEngine>, user: Address) -> ModuleEvent {
        let engine = auth.caller();
        if let Some(set) = self.users.get_mut(&engine) {
            set.remove(&user);
            if set.is_empty() {
                self.users.remove(&engine);
            }
        }
        ModuleEvent::UserDisallowed {
            compliance: engine,
            user,
        }
    }

    /// Applied in input order; duplicates notify once per occurrence.
    pub fn batch_allow(&mut self, auth: &Authorized<BoundEngine>, users: &[Address]) -> Vec<ModuleEvent> {
        users.iter().map(|u| self.allow(auth, *u)).collect()
    }

    pub fn batch_disallow(
        &mut self,
        auth: &Authorized<BoundEngine>,
        users: &[Address],
    ) -> Vec<ModuleEvent> {
        users.iter().map(|u| self.disallow(auth, *u)).collect()
    }
}
