//! What the caller asks the pipeline to do.

use alloy::primitives::Bytes;
use rust_decimal::Decimal;

/// Where the nonce of a transaction comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoncePolicy {
    /// Use exactly this nonce.
    Explicit(u64),
    /// Next nonce counting transactions still in the pool.
    #[default]
    Pending,
    /// Next nonce counting mined transactions only.
    OnChain,
}

/// One transfer from the controller's sender.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferIntent {
    /// Bech32 or hex receiver, parsed by the receiver stage.
    pub receiver: String,
    /// Amount in ONE.
    pub amount: Decimal,
    /// Gas price in Gwei.
    pub gas_price: Decimal,
    /// Intrinsic gas of `data` when unset.
    pub gas_limit: Option<u64>,
    pub nonce: NoncePolicy,
    pub from_shard: u32,
    /// Ignored by Ethereum-style transactions.
    pub to_shard: u32,
    pub data: Bytes,
}

impl TransferIntent {
    /// A same-shard transfer on shard 0 at 1 Gwei with the pending nonce.
    pub fn new(receiver: impl Into<String>, amount: Decimal) -> Self {
        Self {
            receiver: receiver.into(),
            amount,
            gas_price: Decimal::ONE,
            gas_limit: None,
            nonce: NoncePolicy::Pending,
            from_shard: 0,
            to_shard: 0,
            data: Bytes::new(),
        }
    }

    pub fn with_shards(mut self, from_shard: u32, to_shard: u32) -> Self {
        self.from_shard = from_shard;
        self.to_shard = to_shard;
        self
    }

    pub fn with_gas(mut self, gas_price: Decimal, gas_limit: Option<u64>) -> Self {
        self.gas_price = gas_price;
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_nonce(mut self, nonce: NoncePolicy) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }
}
