//! Pipeline failure taxonomy.

use alloy::primitives::U256;
use thiserror::Error;

use crate::common::format_one;
use crate::rpc::RpcError;

/// The single terminal failure of one pipeline run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TxError {
    #[error("invalid argument \"{value}\" for \"--{flag}\": must be below shard count {shard_count}")]
    InvalidShard {
        flag: &'static str,
        value: i64,
        shard_count: u32,
    },

    #[error("malformed address {input:?}: {reason}")]
    MalformedAddress { input: String, reason: String },

    #[error("invalid transaction parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "insufficient balance of {} in shard {shard} for the requested transfer of {}",
        format_one(.available),
        format_one(.requested)
    )]
    InsufficientBalance {
        available: U256,
        requested: U256,
        shard: u32,
    },

    #[error("signature verification failed: signer {actual} does not match sender {expected}")]
    SignerMismatch { expected: String, actual: String },

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("could not confirm transaction {tx_hash} after {waited_secs} seconds")]
    ConfirmationTimeout { tx_hash: String, waited_secs: u64 },

    #[error("error found for transaction hash: {tx_hash}: {reason}")]
    TransactionRejected { tx_hash: String, reason: String },

    #[error("shard directory unreachable at {endpoint}: {source}")]
    DirectoryUnreachable { endpoint: String, source: RpcError },

    #[error("signing failed: {0}")]
    Signer(String),

    #[error("confirmation of {tx_hash} cancelled by shutdown")]
    Cancelled { tx_hash: String },
}

impl TxError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidShard { .. } => "invalid_shard",
            Self::MalformedAddress { .. } => "malformed_address",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::SignerMismatch { .. } => "signer_mismatch",
            Self::Rpc(_) => "rpc",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::TransactionRejected { .. } => "rejected",
            Self::DirectoryUnreachable { .. } => "directory_unreachable",
            Self::Signer(_) => "signer",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}
