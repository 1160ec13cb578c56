//! Per-run controller state.

use alloy::primitives::{Address, U256};
use serde_json::Value;

use crate::transaction::error::TxError;
use crate::transaction::sink::TxErrorRecord;
use crate::transaction::types::{SignedTransaction, UnsignedTransaction};

/// Parameters populated stage by stage; each is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxParams {
    pub from_shard: Option<u32>,
    pub to_shard: Option<u32>,
    pub gas_limit: Option<u64>,
    /// Atto per gas.
    pub gas_price: Option<U256>,
    /// Atto.
    pub amount: Option<U256>,
    pub receiver: Option<Address>,
    pub nonce: Option<u64>,
}

/// Everything one `execute` call produced, including partial results
/// after a failure.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub params: TxParams,
    /// First failure of the run; never overwritten.
    pub failure: Option<TxError>,
    pub unsigned: Option<UnsignedTransaction>,
    pub signed: Option<SignedTransaction>,
    pub signer_address: Option<Address>,
    /// Hash returned by the broadcast.
    pub tx_hash: Option<String>,
    pub receipt: Option<Value>,
    pub errors: Vec<TxErrorRecord>,
}

impl ControllerState {
    pub(crate) fn record_failure(&mut self, failure: TxError) {
        if self.failure.is_none() {
            self.failure = Some(failure);
        }
    }

    pub fn raw_transaction(&self) -> Option<String> {
        self.signed.as_ref().map(SignedTransaction::raw_hex)
    }
}
