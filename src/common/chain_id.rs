//! Chain identifiers for replay-protected signing.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named network with its native and Ethereum-compatible chain ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ChainId {
    /// Human name (`mainnet`, `testnet`, or the number itself).
    #[serde(skip)]
    pub name: String,
    /// Chain id used by cross-shard transactions.
    #[serde(rename = "chain-as-number")]
    pub value: u64,
    /// Chain id used by Ethereum-style transactions.
    #[serde(rename = "eth-chain-as-number")]
    pub eth_value: u64,
}

/// Largest chain id whose replay-protected `v` (`parity + 35 + 2 * id`)
/// still fits in a `u64`.
pub const MAX_CHAIN_ID: u64 = (u64::MAX - 36) / 2;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainIdError {
    #[error("unknown chain-id: {0}")]
    Unknown(String),
    #[error("chain-id {0} exceeds the maximum of {MAX_CHAIN_ID}")]
    TooLarge(u64),
}

impl ChainId {
    fn named(name: &str, value: u64, eth_value: u64) -> Self {
        Self {
            name: name.to_string(),
            value,
            eth_value,
        }
    }

    pub fn mainnet() -> Self {
        Self::named("mainnet", 1, 1_666_600_000)
    }

    pub fn testnet() -> Self {
        Self::named("testnet", 2, 1_666_700_000)
    }

    pub fn pangaea() -> Self {
        Self::named("pangaea", 3, 1_666_800_000)
    }

    pub fn partner() -> Self {
        Self::named("partner", 4, 1_666_900_000)
    }

    pub fn stressnet() -> Self {
        Self::named("stress", 5, 1_667_000_000)
    }

    pub fn localnet() -> Self {
        Self::named("localnet", 2, 1_666_700_000)
    }

    /// Chain id for replay protection on cross-shard transactions; zero
    /// means unprotected signing.
    pub fn signing_value(&self) -> Option<u64> {
        (self.value != 0).then_some(self.value)
    }

    /// Chain id for replay protection on Ethereum-style transactions.
    pub fn eth_signing_value(&self) -> Option<u64> {
        (self.eth_value != 0).then_some(self.eth_value)
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl FromStr for ChainId {
    type Err = ChainIdError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "mainnet" | "dryrun" => Ok(Self::mainnet()),
            "testnet" => Ok(Self::testnet()),
            "pangaea" => Ok(Self::pangaea()),
            "partner" | "devnet" => Ok(Self::partner()),
            "stressnet" | "stress" => Ok(Self::stressnet()),
            "localnet" => Ok(Self::localnet()),
            other => match other.parse::<u64>() {
                Ok(id) if id > MAX_CHAIN_ID => Err(ChainIdError::TooLarge(id)),
                Ok(id) => Ok(Self::named(other, id, id)),
                Err(_) => Err(ChainIdError::Unknown(other.to_string())),
            },
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_chains() {
        assert_eq!("mainnet".parse::<ChainId>().unwrap().value, 1);
        assert_eq!("devnet".parse::<ChainId>().unwrap(), ChainId::partner());
        assert_eq!("dryrun".parse::<ChainId>().unwrap(), ChainId::mainnet());
        assert_eq!(ChainId::testnet().eth_value, 1_666_700_000);
    }

    #[test]
    fn test_numeric_chain() {
        let chain: ChainId = "1337".parse().unwrap();
        assert_eq!(chain.value, 1337);
        assert_eq!(chain.eth_value, 1337);
        assert_eq!(chain.name, "1337");
    }

    #[test]
    fn test_unknown_chain() {
        let err = "moonnet".parse::<ChainId>().unwrap_err();
        assert_eq!(err.to_string(), "unknown chain-id: moonnet");
    }

    #[test]
    fn test_chain_id_upper_bound() {
        let largest: ChainId = MAX_CHAIN_ID.to_string().parse().unwrap();
        assert_eq!(largest.signing_value(), Some(MAX_CHAIN_ID));
        assert!(MAX_CHAIN_ID.checked_mul(2).and_then(|v| v.checked_add(36)).is_some());

        let err = (MAX_CHAIN_ID + 1).to_string().parse::<ChainId>().unwrap_err();
        assert_eq!(err, ChainIdError::TooLarge(MAX_CHAIN_ID + 1));
        assert_eq!(
            u64::MAX.to_string().parse::<ChainId>().unwrap_err(),
            ChainIdError::TooLarge(u64::MAX)
        );
        assert!(matches!(
            "18446744073709551616".parse::<ChainId>(),
            Err(ChainIdError::Unknown(_))
        ));
    }

    #[test]
    fn test_zero_chain_is_unprotected() {
        let chain: ChainId = "0".parse().unwrap();
        assert_eq!(chain.signing_value(), None);
        assert_eq!(ChainId::mainnet().signing_value(), Some(1));
    }
}
