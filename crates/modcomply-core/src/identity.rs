//! Participant, engine, and code identities.
//!
//! An [`Address`] is an opaque 20-byte handle. Modules never inspect its
//! structure; they only compare it (owner checks, bound-engine checks,
//! allow-list membership). [`Address::ZERO`] is the null identity used to
//! signal mint (sender) and burn (receiver).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::ModcomplyError;

/// Address width in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Token amount. Accepted by the module interface, never interpreted by the
/// transfer-restrict decision.
pub type Amount = u128;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null identity.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Deterministic identity for the `nonce`-th deployment made by `deployer`.
    ///
    /// SHA-256 over `deployer || nonce (big-endian)`, keeping the last 20 bytes.
    pub fn derive(deployer: Address, nonce: u64) -> Self {
        let mut h = Sha256::new();
        h.update(deployer.0);
        h.update(nonce.to_be_bytes());
        let digest = h.finalize();

        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Self(out)
    }

    /// Build from a slice that must be exactly 20 bytes long.
    pub fn from_slice(raw: &[u8]) -> crate::Result<Self> {
        let bytes: [u8; ADDRESS_LEN] = raw.try_into().map_err(|_| {
            ModcomplyError::BadRequest(format!(
                "address must be {ADDRESS_LEN} bytes, got {}",
                raw.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = ModcomplyError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ModcomplyError::BadRequest(format!("address must start with 0x: {s}")))?;

        let raw = hex::decode(digits)
            .map_err(|e| ModcomplyError::BadRequest(format!("invalid address {s}: {e}")))?;
        Self::from_slice(&raw)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
