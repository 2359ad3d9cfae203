//! Shared error type across modcomply crates.

use thiserror::Error;

use crate::identity::Address;

/// Caller-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Owner-gated operation called by someone else.
    NotOwner,
    /// Second `initialize` on the same instance.
    AlreadyInitialized,
    /// Ownership handed to the null identity.
    InvalidNewOwner,
    /// Mutating module call not coming from the bound engine.
    CallerNotBoundCompliance,
    /// Binding protocol violation (bind/unbind).
    BindingRejected,
    /// Engine-side module registry violation.
    ModuleRegistry,
    /// Post-transfer hook not driven by the bound token.
    OnlyTokenCanCall,
    /// Invalid input / malformed encoded call.
    BadRequest,
    /// Unsupported wire version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::NotOwner => "NOT_OWNER",
            ClientCode::AlreadyInitialized => "ALREADY_INITIALIZED",
            ClientCode::InvalidNewOwner => "INVALID_NEW_OWNER",
            ClientCode::CallerNotBoundCompliance => "CALLER_NOT_BOUND_COMPLIANCE",
            ClientCode::BindingRejected => "BINDING_REJECTED",
            ClientCode::ModuleRegistry => "MODULE_REGISTRY",
            ClientCode::OnlyTokenCanCall => "ONLY_TOKEN_CAN_CALL",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ModcomplyError>;

/// Unified error type used by core and engine.
///
/// Every variant is terminal: the call that produced it committed nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModcomplyError {
    #[error("caller is not the owner")]
    NotOwner,
    #[error("contract is already initialized")]
    AlreadyInitialized,
    #[error("new owner is the null identity")]
    InvalidNewOwner,
    #[error("only bound compliance can call")]
    CallerNotBoundCompliance,
    #[error("only the compliance itself can bind or unbind")]
    OnlyComplianceCanBind,
    #[error("module already bound to compliance {0}")]
    ComplianceAlreadyBound(Address),
    #[error("compliance {0} is not bound")]
    ComplianceNotBound(Address),
    #[error("module {0} already bound")]
    ModuleAlreadyBound(Address),
    #[error("module {0} not bound")]
    ModuleNotBound(Address),
    #[error("module {0} cannot be bound to this compliance")]
    ModuleNotBindable(Address),
    #[error("cannot add more than {0} modules")]
    TooManyModules(usize),
    #[error("only the bound token can call")]
    OnlyTokenCanCall,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported protocol version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ModcomplyError {
    /// Map internal error to a stable caller-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ModcomplyError::NotOwner => ClientCode::NotOwner,
            ModcomplyError::AlreadyInitialized => ClientCode::AlreadyInitialized,
            ModcomplyError::InvalidNewOwner => ClientCode::InvalidNewOwner,
            ModcomplyError::CallerNotBoundCompliance => ClientCode::CallerNotBoundCompliance,
            ModcomplyError::OnlyComplianceCanBind
            | ModcomplyError::ComplianceAlreadyBound(_)
            | ModcomplyError::ComplianceNotBound(_) => ClientCode::BindingRejected,
            ModcomplyError::ModuleAlreadyBound(_)
            | ModcomplyError::ModuleNotBound(_)
            | ModcomplyError::ModuleNotBindable(_)
            | ModcomplyError::TooManyModules(_) => ClientCode::ModuleRegistry,
            ModcomplyError::OnlyTokenCanCall => ClientCode::OnlyTokenCanCall,
            ModcomplyError::BadRequest(_) => ClientCode::BadRequest,
            ModcomplyError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            ModcomplyError::Internal(_) => ClientCode::Internal,
        }
    }
}
