//! Intrinsic gas of a transaction payload.

/// Base cost of any transaction.
pub const TX_GAS: u64 = 21_000;

/// Base cost of a contract-creating transaction.
pub const TX_GAS_CONTRACT_CREATION: u64 = 53_000;

pub const TX_DATA_ZERO_GAS: u64 = 4;

pub const TX_DATA_NON_ZERO_GAS: u64 = 16;

/// Minimum gas limit a transaction carrying `data` must declare.
pub fn intrinsic_gas(data: &[u8], contract_creation: bool) -> u64 {
    let base = if contract_creation {
        TX_GAS_CONTRACT_CREATION
    } else {
        TX_GAS
    };
    let zeros = data.iter().filter(|b| **b == 0).count() as u64;
    let non_zeros = data.len() as u64 - zeros;
    base.saturating_add(zeros.saturating_mul(TX_DATA_ZERO_GAS))
        .saturating_add(non_zeros.saturating_mul(TX_DATA_NON_ZERO_GAS))
}
