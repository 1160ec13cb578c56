//! Account address parsing and rendering.
//!
//! Addresses are 20-byte account ids shown either as bech32 with the `one`
//! prefix or as `0x`-prefixed hex.

use alloy::primitives::Address;
use bech32::{Bech32, Hrp};
use thiserror::Error;

/// Human-readable part of bech32 account addresses.
pub const BECH32_HRP: &str = "one";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("cannot decode {0:?} as bech32 address: {1}")]
    Bech32(String, String),

    #[error("{input:?} is not a {expected:?} address")]
    WrongPrefix { input: String, expected: &'static str },

    #[error("decoded address {input:?} has invalid length {len}")]
    InvalidLength { input: String, len: usize },

    #[error("address supplied ({0}) is not valid")]
    Invalid(String),
}

/// Parse a bech32 (`one1…`) or hex (`0x…`) address.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let trimmed = input.trim();
    let bytes = trimmed.as_bytes();
    if bytes
        .get(..BECH32_HRP.len())
        .is_some_and(|hrp| hrp.eq_ignore_ascii_case(BECH32_HRP.as_bytes()))
        && bytes.get(BECH32_HRP.len()) == Some(&b'1')
    {
        return parse_bech32(trimmed);
    }

    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| AddressError::Invalid(input.to_string()))?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AddressError::Invalid(input.to_string()));
    }
    hex.parse::<Address>()
        .map_err(|_| AddressError::Invalid(input.to_string()))
}

fn parse_bech32(input: &str) -> Result<Address, AddressError> {
    let (hrp, data) = bech32::decode(input)
        .map_err(|e| AddressError::Bech32(input.to_string(), e.to_string()))?;
    if hrp.to_lowercase() != BECH32_HRP {
        return Err(AddressError::WrongPrefix {
            input: input.to_string(),
            expected: BECH32_HRP,
        });
    }
    if data.len() != Address::len_bytes() {
        return Err(AddressError::InvalidLength {
            input: input.to_string(),
            len: data.len(),
        });
    }
    Ok(Address::from_slice(&data))
}

/// Render an address in its bech32 form.
pub fn to_bech32(address: &Address) -> String {
    // The prefix is a constant valid HRP and 20 bytes is far below the
    // checksum length limit, so encoding cannot fail.
    bech32::encode::<Bech32>(Hrp::parse_unchecked(BECH32_HRP), address.as_slice())
        .unwrap_or_default()
}
