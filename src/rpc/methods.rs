//! RPC method names.
//!
//! Nodes expose the same methods under several prefixes: the legacy `hmy`
//! namespace (hex quantities), `hmyv2` (plain numbers) and the
//! Ethereum-compatible `eth` namespace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Hmy,
    HmyV2,
    Eth,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Hmy => "hmy",
            Self::HmyV2 => "hmyv2",
            Self::Eth => "eth",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hmy" => Ok(Self::Hmy),
            "hmyv2" => Ok(Self::HmyV2),
            "eth" => Ok(Self::Eth),
            other => Err(format!("unknown RPC namespace: {other}")),
        }
    }
}

/// Methods used by the transfer pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetShardingStructure,
    GetBalance,
    GetTransactionCount,
    SendRawTransaction,
    GetTransactionReceipt,
    GetCurrentTransactionErrorSink,
    GetCurrentStakingErrorSink,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetShardingStructure => "getShardingStructure",
            Self::GetBalance => "getBalance",
            Self::GetTransactionCount => "getTransactionCount",
            Self::SendRawTransaction => "sendRawTransaction",
            Self::GetTransactionReceipt => "getTransactionReceipt",
            Self::GetCurrentTransactionErrorSink => "getCurrentTransactionErrorSink",
            Self::GetCurrentStakingErrorSink => "getCurrentStakingErrorSink",
        }
    }

    /// Fully qualified method name, e.g. `hmy_getBalance`.
    pub fn qualified(&self, namespace: Namespace) -> String {
        format!("{}_{}", namespace.prefix(), self.name())
    }
}
