//! Validation of operator input for endpoints, addresses, keys and numbers
//!
//! Each `validate_*` function fits [`crate::prompt::Validator`]; the matching
//! `parse_*` function returns the parsed value.

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use url::Url;

use crate::error::{Error, Result};

/// Endpoint used when nothing else is configured
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

pub fn validate_rpc_url(s: &str) -> Result<()> {
    parse_rpc_url(s).map(|_| ())
}

/// Parses an absolute URL
pub fn parse_rpc_url(s: &str) -> Result<Url> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::Validation("input cannot be empty".to_string()));
    }
    let url = Url::parse(s).map_err(|e| Error::Validation(format!("invalid rpc url: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::Validation(format!("invalid rpc url: {s}")));
    }
    Ok(url)
}

pub fn validate_address(s: &str) -> Result<()> {
    parse_address(s).map(|_| ())
}

/// Parses a 20-byte hex address; `0x` prefix and checksum casing are optional
pub fn parse_address(s: &str) -> Result<Address> {
    let s = s.trim();
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::Validation(format!("invalid address '{s}'")));
    }
    hex.parse::<Address>()
        .map_err(|_| Error::Validation(format!("invalid address '{s}'")))
}

pub fn validate_private_key(s: &str) -> Result<()> {
    parse_private_key(s).map(|_| ())
}

/// Parses a hex secp256k1 private key, with or without `0x`
pub fn parse_private_key(s: &str) -> Result<PrivateKeySigner> {
    let key = s.trim();
    if key.is_empty() {
        return Err(Error::Validation("input cannot be empty".to_string()));
    }
    let key = key.strip_prefix("0x").unwrap_or(key);

    key.parse::<PrivateKeySigner>()
        .map_err(|e| Error::Validation(format!("invalid private key: {e}")))
}

pub fn validate_int(s: &str) -> Result<()> {
    parse_wei(s).map(|_| ())
}

/// Parses a non-negative base-10 integer
pub fn parse_wei(s: &str) -> Result<U256> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!("invalid int '{s}'")));
    }
    U256::from_str_radix(s, 10).map_err(|_| Error::Validation(format!("int out of range '{s}'")))
}

pub fn validate_chain_id(s: &str) -> Result<()> {
    parse_chain_id(s).map(|_| ())
}

/// Parses a chain id; zero is reserved for "unset"
pub fn parse_chain_id(s: &str) -> Result<u64> {
    let s = s.trim();
    match s.parse::<u64>() {
        Ok(0) => Err(Error::Validation("chain id must be greater than 0".to_string())),
        Ok(id) => Ok(id),
        Err(_) => Err(Error::Validation(format!("invalid chain id '{s}'"))),
    }
}
