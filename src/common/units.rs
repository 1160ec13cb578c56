//! Denomination conversion and RPC quantity parsing.
//!
//! Amounts are entered as decimals of whole coins (ONE) and gas prices as
//! decimals of Gwei ("nano"); on the wire both are integers of atto.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places between one coin and its minor unit.
pub const ONE_DECIMALS: u32 = 18;

/// Decimal places between one Gwei and the minor unit.
pub const NANO_DECIMALS: u32 = 9;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("negative value {0} cannot be converted to minor units")]
    Negative(Decimal),

    #[error("value {0} overflows 256 bits in minor units")]
    Overflow(Decimal),

    #[error("invalid decimal {input:?}: {reason}")]
    InvalidDecimal { input: String, reason: String },

    #[error("invalid quantity {0}")]
    InvalidQuantity(String),
}

/// Parse a decimal written either plainly (`"1.5"`, `".5"`) or in scientific
/// notation (`"1e-3"`, `"2.5e6"`).
pub fn parse_decimal(input: &str) -> Result<Decimal, UnitsError> {
    let trimmed = input.trim();
    let invalid = |reason: String| UnitsError::InvalidDecimal {
        input: input.to_string(),
        reason,
    };
    if trimmed.is_empty() {
        return Err(invalid("empty value".to_string()));
    }
    if trimmed.contains(['e', 'E']) {
        return Decimal::from_scientific(trimmed).map_err(|e| invalid(e.to_string()));
    }
    let normalized = match trimmed.strip_prefix('.') {
        Some(rest) => format!("0.{rest}"),
        None => match trimmed.strip_prefix("-.") {
            Some(rest) => format!("-0.{rest}"),
            None => trimmed.to_string(),
        },
    };
    Decimal::from_str(&normalized).map_err(|e| invalid(e.to_string()))
}

/// Whether `value` is strictly below zero (`-0` is not).
pub fn is_negative(value: &Decimal) -> bool {
    value.is_sign_negative() && !value.is_zero()
}

/// Convert a decimal amount to an integer of minor units, truncating any
/// precision beyond `decimals` places.
pub fn decimal_to_minor(value: Decimal, decimals: u32) -> Result<U256, UnitsError> {
    if is_negative(&value) {
        return Err(UnitsError::Negative(value));
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let scale = value.scale();
    let ten = U256::from(10u8);
    if scale <= decimals {
        let factor = ten.pow(U256::from(decimals - scale));
        mantissa
            .checked_mul(factor)
            .ok_or(UnitsError::Overflow(value))
    } else {
        Ok(mantissa / ten.pow(U256::from(scale - decimals)))
    }
}

/// Render an integer of minor units as a decimal string without trailing zeros.
pub fn format_minor(value: U256, decimals: u32) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    let (whole, fraction) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Render atto as whole coins.
pub fn format_one(value: &U256) -> String {
    format_minor(*value, ONE_DECIMALS)
}

/// Parse an RPC quantity: `0x` hex string, decimal string or JSON number.
pub fn parse_quantity(value: &Value) -> Result<U256, UnitsError> {
    let invalid = || UnitsError::InvalidQuantity(value.to_string());
    match value {
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some("") => Ok(U256::ZERO),
                Some(hex) => U256::from_str_radix(hex, 16).map_err(|_| invalid()),
                None if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                    U256::from_str_radix(s, 10).map_err(|_| invalid())
                }
                None => Err(invalid()),
            }
        }
        Value::Number(n) => match n.as_u64() {
            Some(v) => Ok(U256::from(v)),
            // Negative integers and floats; large floats render as `1.5e21`.
            None => {
                let number = parse_decimal(&n.to_string()).map_err(|_| invalid())?;
                if is_negative(&number) || !number.fract().is_zero() {
                    return Err(invalid());
                }
                decimal_to_minor(number, 0).map_err(|_| invalid())
            }
        },
        _ => Err(invalid()),
    }
}

/// Parse an RPC quantity that must fit a `u64` (nonces, counts).
pub fn parse_quantity_u64(value: &Value) -> Result<u64, UnitsError> {
    let quantity = parse_quantity(value)?;
    u64::try_from(quantity).map_err(|_| UnitsError::InvalidQuantity(value.to_string()))
}
