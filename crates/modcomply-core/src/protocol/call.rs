//! Encoded module calls (panic-free).
//!
//! Layout: `v:u8 | selector:u8 | args`. Addresses are 20 raw bytes, amounts
//! are `u128` little-endian, batch lengths are `u16` little-endian.
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ModcomplyError, Result};
use crate::identity::{Address, Amount, ADDRESS_LEN};

/// Wire version.
pub const CALL_VERSION: u8 = 1;

pub const SEL_ALLOW_USER: u8 = 0x01;
pub const SEL_DISALLOW_USER: u8 = 0x02;
pub const SEL_BATCH_ALLOW_USERS: u8 = 0x03;
pub const SEL_BATCH_DISALLOW_USERS: u8 = 0x04;
pub const SEL_MINT_ACTION: u8 = 0x10;
pub const SEL_BURN_ACTION: u8 = 0x11;
pub const SEL_TRANSFER_ACTION: u8 = 0x12;

const AMOUNT_LEN: usize = 16;

/// A decoded invocation routed by the engine to a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleCall {
    AllowUser(Address),
    DisallowUser(Address),
    BatchAllowUsers(Vec<Address>),
    BatchDisallowUsers(Vec<Address>),
    MintAction { to: Address, value: Amount },
    BurnAction { from: Address, value: Amount },
    TransferAction { from: Address, to: Address, value: Amount },
}

impl ModuleCall {
    /// Function name as exposed by the module interface.
    pub fn function(&self) -> &'static str {
        match self {
            ModuleCall::AllowUser(_) => "allowUser",
            ModuleCall::DisallowUser(_) => "disallowUser",
            ModuleCall::BatchAllowUsers(_) => "batchAllowUsers",
            ModuleCall::BatchDisallowUsers(_) => "batchDisallowUsers",
            ModuleCall::MintAction { .. } => "moduleMintAction",
            ModuleCall::BurnAction { .. } => "moduleBurnAction",
            ModuleCall::TransferAction { .. } => "moduleTransferAction",
        }
    }

    pub fn selector(&self) -> u8 {
        match self {
            ModuleCall::AllowUser(_) => SEL_ALLOW_USER,
            ModuleCall::DisallowUser(_) => SEL_DISALLOW_USER,
            ModuleCall::BatchAllowUsers(_) => SEL_BATCH_ALLOW_USERS,
            ModuleCall::BatchDisallowUsers(_) => SEL_BATCH_DISALLOW_USERS,
            ModuleCall::MintAction { .. } => SEL_MINT_ACTION,
            ModuleCall::BurnAction { .. } => SEL_BURN_ACTION,
            ModuleCall::TransferAction { .. } => SEL_TRANSFER_ACTION,
        }
    }
}

/// Encode a call. Fails only when a batch exceeds `u16::MAX` entries.
pub fn encode_call(call: &ModuleCall) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(2 + 2 * ADDRESS_LEN + AMOUNT_LEN);
    out.put_u8(CALL_VERSION);
    out.put_u8(call.selector());

    match call {
        ModuleCall::AllowUser(user) | ModuleCall::DisallowUser(user) => {
            out.put_slice(user.as_bytes());
        }
        ModuleCall::BatchAllowUsers(users) | ModuleCall::BatchDisallowUsers(users) => {
            let n = u16::try_from(users.len()).map_err(|_| {
                ModcomplyError::BadRequest(format!("batch too large: {}", users.len()))
            })?;
            out.put_u16_le(n);
            for u in users {
                out.put_slice(u.as_bytes());
            }
        }
        ModuleCall::MintAction { to: who, value } | ModuleCall::BurnAction { from: who, value } => {
            out.put_slice(who.as_bytes());
            out.put_u128_le(*value);
        }
        ModuleCall::TransferAction { from, to, value } => {
            out.put_slice(from.as_bytes());
            out.put_slice(to.as_bytes());
            out.put_u128_le(*value);
        }
    }

    Ok(out.freeze())
}

/// Decode a call from bytes. Trailing bytes are rejected.
pub fn decode_call(mut buf: Bytes) -> Result<ModuleCall> {
    // Minimum header: v, selector
    if buf.remaining() < 2 {
        return Err(ModcomplyError::BadRequest("call too short".into()));
    }

    let v = buf.get_u8();
    if v != CALL_VERSION {
        return Err(ModcomplyError::UnsupportedVersion);
    }

    let selector = buf.get_u8();
    let call = match selector {
        SEL_ALLOW_USER => ModuleCall::AllowUser(take_address(&mut buf)?),
        SEL_DISALLOW_USER => ModuleCall::DisallowUser(take_address(&mut buf)?),
        SEL_BATCH_ALLOW_USERS => ModuleCall::BatchAllowUsers(take_addresses(&mut buf)?),
        SEL_BATCH_DISALLOW_USERS => ModuleCall::BatchDisallowUsers(take_addresses(&mut buf)?),
        SEL_MINT_ACTION => {
            let to = take_address(&mut buf)?;
            let value = take_amount(&mut buf)?;
            ModuleCall::MintAction { to, value }
        }
        SEL_BURN_ACTION => {
            let from = take_address(&mut buf)?;
            let value = take_amount(&mut buf)?;
            ModuleCall::BurnAction { from, value }
        }
        SEL_TRANSFER_ACTION => {
            let from = take_address(&mut buf)?;
            let to = take_address(&mut buf)?;
            let value = take_amount(&mut buf)?;
            ModuleCall::TransferAction { from, to, value }
        }
        other => {
            return Err(ModcomplyError::BadRequest(format!(
                "unknown selector: 0x{other:02x}"
            )))
        }
    };

    if buf.has_remaining() {
        return Err(ModcomplyError::BadRequest(format!(
            "{} trailing bytes after {}",
            buf.remaining(),
            call.function()
        )));
    }

    Ok(call)
}

fn take_address(buf: &mut Bytes) -> Result<Address> {
    if buf.remaining() < ADDRESS_LEN {
        return Err(ModcomplyError::BadRequest("truncated address".into()));
    }
    let raw = buf.copy_to_bytes(ADDRESS_LEN);
    Address::from_slice(&raw)
}

fn take_amount(buf: &mut Bytes) -> Result<Amount> {
    if buf.remaining() < AMOUNT_LEN {
        return Err(ModcomplyError::BadRequest("truncated amount".into()));
    }
    Ok(buf.get_u128_le())
}

fn take_addresses(buf: &mut Bytes) -> Result<Vec<Address>> {
    if buf.remaining() < 2 {
        return Err(ModcomplyError::BadRequest("missing batch length".into()));
    }
    let n = buf.get_u16_le() as usize;
    if buf.remaining() < n * ADDRESS_LEN {
        return Err(ModcomplyError::BadRequest(format!(
            "batch of {n} needs {} bytes, got {}",
            n * ADDRESS_LEN,
            buf.remaining()
        )));
    }
    (0..n).map(|_| take_address(buf)).collect()
}
