//! Module notifications.
//!
//! Append-only audit trail of intent. Consumers must re-query module state for
//! current truth; an `UserAllowed` for an already-allowed identity is still
//! emitted.

use serde::Serialize;

use crate::identity::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum ModuleEvent {
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    Initialized {
        version: u8,
    },
    Upgraded {
        implementation: Address,
    },
    ComplianceBound {
        compliance: Address,
    },
    ComplianceUnbound {
        compliance: Address,
    },
    UserAllowed {
        compliance: Address,
        user: Address,
    },
    UserDisallowed {
        compliance: Address,
        user: Address,
    },
}

impl ModuleEvent {
    /// Stable event name, used as a metrics label.
    pub fn name(&self) -> &'static str {
        match self {
            ModuleEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
            ModuleEvent::Initialized { .. } => "Initialized",
            ModuleEvent::Upgraded { .. } => "Upgraded",
            ModuleEvent::ComplianceBound { .. } => "ComplianceBound",
            ModuleEvent::ComplianceUnbound { .. } => "ComplianceUnbound",
            ModuleEvent::UserAllowed { .. } => "UserAllowed",
            ModuleEvent::UserDisallowed { .. } => "UserDisallowed",
        }
    }
}

/// An event together with the module instance that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedEvent {
    pub module: Address,
    #[serde(flatten)]
    pub event: ModuleEvent,
}
