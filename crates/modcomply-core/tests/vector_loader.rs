//! Encoded-call vectors: a framed byte string plus the call it must decode
//! to, or the error code it must be rejected with.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::fs;

use base64::Engine as _;
use serde::Deserialize;

use modcomply_core::{Address, Amount};

#[derive(Debug, Deserialize)]
pub struct CallVector {
    pub description: String,
    pub frame: Frame,
    #[serde(default)]
    pub expect: Option<ExpectCall>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectCall {
    #[serde(rename = "fn")]
    pub function: String,
    /// Every address argument, in wire order.
    pub users: Vec<Address>,
    /// Decimal string; amounts do not fit a JSON number.
    #[serde(default)]
    pub value: Option<String>,
}

impl ExpectCall {
    pub fn amount(&self) -> Option<Amount> {
        self.value
            .as_deref()
            .map(|v| v.parse().expect("invalid amount in test vector"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "lowercase")]
pub enum Frame {
    Hex(String),
    Base64(String),
}

impl Frame {
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Frame::Hex(s) => hex::decode(s).expect("invalid hex in test vector"),
            Frame::Base64(s) => base64::engine::general_purpose::STANDARD
                .decode(s)
                .expect("invalid base64 in test vector"),
        }
    }
}

pub fn load(name: &str) -> CallVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}
