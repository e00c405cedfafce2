use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HexError {
    #[error("missing 0x prefix: {0:?}")]
    MissingPrefix(String),

    #[error("invalid hex quantity: {0:?}")]
    InvalidDigits(String),

    #[error("hex quantity does not fit in 64 bits: {0:?}")]
    Overflow(String),
}

/// Parse a `0x`-prefixed hex quantity of arbitrary size.
///
/// A bare `0x` is read as zero; some providers encode zero values that way.
pub fn parse_hex_biguint(value: &str) -> Result<BigUint, HexError> {
    let digits = strip_hex_prefix(value)?;
    if digits.is_empty() {
        return Ok(BigUint::default());
    }
    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| HexError::InvalidDigits(value.to_string()))
}

pub fn parse_hex_u64(value: &str) -> Result<u64, HexError> {
    let digits = strip_hex_prefix(value)?;
    if digits.is_empty() {
        return Ok(0);
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidDigits(value.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| HexError::Overflow(value.to_string()))
}

pub fn to_hex_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

fn strip_hex_prefix(value: &str) -> Result<&str, HexError> {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| HexError::MissingPrefix(value.to_string()))
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: P,
}

impl<'a, P: Serialize> JsonRpcRequest<'a, P> {
    pub fn new(id: u64, method: &'a str, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub id: Value,
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}
