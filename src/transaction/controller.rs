//! Staged transaction pipeline.
//!
//! # Data Flow
//! ```text
//! TransferIntent
//!     → shard ids (cross-shard only) → gas limit → gas price
//!     → amount → balance check → receiver → nonce
//!     → unsigned transaction → Signer → broadcast → receipt polling
//! ```
//!
//! Each stage returns its typed output or the run's failure; the first
//! failure stops the chain and is kept in [`ControllerState`] together with
//! whatever the earlier stages produced.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{
    decimal_to_minor, is_negative, parse_address, parse_quantity, parse_quantity_u64, to_bech32,
    ChainId, NANO_DECIMALS, ONE_DECIMALS,
};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::rpc::{reply_result, Messenger, Method, Namespace, RpcError};
use crate::sharding::ShardDirectory;
use crate::signer::Signer;
use crate::transaction::confirmation::{await_receipt, PollPolicy};
use crate::transaction::error::TxError;
use crate::transaction::gas::intrinsic_gas;
use crate::transaction::intent::{NoncePolicy, TransferIntent};
use crate::transaction::sink::TxErrorRecord;
use crate::transaction::state::ControllerState;
use crate::transaction::types::{
    CrossShardTransaction, EthTransaction, SignedTransaction, UnsignedTransaction,
};

/// Transaction shape, fixed for the lifetime of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TxVariant {
    /// Sharded transfer carrying origin and destination shard ids.
    #[default]
    CrossShard,
    /// Legacy Ethereum transaction without shard fields.
    Eth,
}

impl TxVariant {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CrossShard => "cross-shard",
            Self::Eth => "eth",
        }
    }

    pub fn default_namespace(&self) -> Namespace {
        match self {
            Self::CrossShard => Namespace::Hmy,
            Self::Eth => Namespace::Eth,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        match self {
            Self::CrossShard => Duration::from_secs(2),
            Self::Eth => Duration::from_secs(1),
        }
    }

    /// Replay-protection chain id for this shape.
    pub fn signing_chain_id(&self, chain: &ChainId) -> Option<u64> {
        match self {
            Self::CrossShard => chain.signing_value(),
            Self::Eth => chain.eth_signing_value(),
        }
    }
}

impl fmt::Display for TxVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TxVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cross-shard" | "hmy" => Ok(Self::CrossShard),
            "eth" => Ok(Self::Eth),
            other => Err(format!("unknown transaction variant: {other}")),
        }
    }
}

/// Caller-selected behaviour of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Behavior {
    /// Sign but do not broadcast.
    pub dry_run: bool,
    /// Receipt wait budget after broadcast; zero skips polling.
    pub confirmation_wait: Duration,
    /// Overrides the variant's polling interval.
    pub poll_interval: Option<Duration>,
}

/// Amount still to be sign-checked by the balance stage.
enum StagedAmount {
    Converted(U256),
    Negative(Decimal),
}

/// Drives one sender's transfers through the pipeline.
pub struct TransactionController {
    messenger: Arc<dyn Messenger>,
    signer: Signer,
    sender: Address,
    chain: ChainId,
    variant: TxVariant,
    namespace: Namespace,
    behavior: Behavior,
    directory: Option<ShardDirectory>,
    shutdown: Option<Shutdown>,
    state: ControllerState,
}

impl TransactionController {
    /// Bind a controller to the messenger of the sender's shard.
    pub fn new(
        messenger: Arc<dyn Messenger>,
        signer: Signer,
        sender: Address,
        chain: ChainId,
        variant: TxVariant,
    ) -> Self {
        Self {
            messenger,
            signer,
            sender,
            chain,
            variant,
            namespace: variant.default_namespace(),
            behavior: Behavior::default(),
            directory: None,
            shutdown: None,
            state: ControllerState::default(),
        }
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Validate shard ids against `directory` before any RPC call.
    pub fn with_directory(mut self, directory: ShardDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Let `shutdown` interrupt receipt polling.
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn variant(&self) -> TxVariant {
        self.variant
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn failure(&self) -> Option<&TxError> {
        self.state.failure.as_ref()
    }

    pub fn signed_transaction(&self) -> Option<&SignedTransaction> {
        self.state.signed.as_ref()
    }

    pub fn raw_transaction(&self) -> Option<String> {
        self.state.raw_transaction()
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.state.tx_hash.as_deref()
    }

    pub fn receipt(&self) -> Option<&Value> {
        self.state.receipt.as_ref()
    }

    pub fn errors(&self) -> &[TxErrorRecord] {
        &self.state.errors
    }

    /// JSON view of the constructed transaction, signed when available.
    pub fn transaction_json(&self) -> Option<Value> {
        match (&self.state.signed, &self.state.unsigned) {
            (Some(signed), _) => Some(signed.to_json()),
            (None, Some(unsigned)) => Some(unsigned.to_json()),
            _ => None,
        }
    }

    /// Run the whole pipeline for `intent` on fresh state.
    ///
    /// Returns the run's single failure, if any; the same failure and all
    /// partial results stay readable through [`Self::state`].
    pub async fn execute(&mut self, intent: &TransferIntent) -> Result<(), TxError> {
        self.state = ControllerState::default();
        let label = self.variant.label();

        let outcome = match self.variant {
            TxVariant::CrossShard => self.run_cross_shard(intent).await,
            TxVariant::Eth => self.run_eth(intent).await,
        };

        match &outcome {
            Ok(()) => {
                let result = if self.behavior.dry_run { "dry_run" } else { "ok" };
                metrics::record_pipeline_outcome(label, result);
            }
            Err(err) => {
                tracing::warn!(variant = label, kind = err.kind(), error = %err, "Transaction failed");
                if is_local_failure(err) {
                    let record = TxErrorRecord::local(err.to_string(), self.state.tx_hash.clone());
                    self.state.errors.push(record);
                }
                self.state.record_failure(err.clone());
                metrics::record_pipeline_outcome(label, err.kind());
            }
        }
        outcome
    }

    async fn run_cross_shard(&mut self, intent: &TransferIntent) -> Result<(), TxError> {
        let (from_shard, to_shard) = self.set_shard_ids(intent)?;
        let gas_limit = self.set_gas_limit(intent)?;
        let gas_price = self.set_gas_price(intent.gas_price)?;
        let staged = self.set_amount(intent.amount, false)?;
        let amount = self
            .verify_balance(staged, gas_price, gas_limit, from_shard)
            .await?;
        let receiver = self.set_receiver(&intent.receiver)?;
        let nonce = self.assign_nonce(intent.nonce).await?;

        let unsigned = UnsignedTransaction::CrossShard(CrossShardTransaction {
            nonce,
            gas_price,
            gas_limit,
            shard_id: from_shard,
            to_shard_id: to_shard,
            to: receiver,
            value: amount,
            data: intent.data.clone(),
        });
        self.sign_and_send(unsigned).await
    }

    async fn run_eth(&mut self, intent: &TransferIntent) -> Result<(), TxError> {
        let gas_limit = self.set_gas_limit(intent)?;
        let gas_price = self.set_gas_price(intent.gas_price)?;
        let staged = self.set_amount(intent.amount, true)?;
        let amount = self
            .verify_balance(staged, gas_price, gas_limit, intent.from_shard)
            .await?;
        let receiver = self.set_receiver(&intent.receiver)?;
        let nonce = self.assign_nonce(intent.nonce).await?;

        let unsigned = UnsignedTransaction::Eth(EthTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: receiver,
            value: amount,
            data: intent.data.clone(),
        });
        self.sign_and_send(unsigned).await
    }

    async fn sign_and_send(&mut self, unsigned: UnsignedTransaction) -> Result<(), TxError> {
        self.state.unsigned = Some(unsigned.clone());
        let signed = self.sign(unsigned).await?;
        if let Some(tx_hash) = self.broadcast(&signed).await? {
            self.confirm(&tx_hash).await?;
        }
        Ok(())
    }

    fn set_shard_ids(&mut self, intent: &TransferIntent) -> Result<(u32, u32), TxError> {
        if let Some(directory) = &self.directory {
            directory.validate(intent.from_shard, intent.to_shard)?;
        }
        self.state.params.from_shard = Some(intent.from_shard);
        self.state.params.to_shard = Some(intent.to_shard);
        Ok((intent.from_shard, intent.to_shard))
    }

    fn set_gas_limit(&mut self, intent: &TransferIntent) -> Result<u64, TxError> {
        let gas_limit = intent
            .gas_limit
            .unwrap_or_else(|| intrinsic_gas(&intent.data, false));
        self.state.params.gas_limit = Some(gas_limit);
        Ok(gas_limit)
    }

    fn set_gas_price(&mut self, gas_price: Decimal) -> Result<U256, TxError> {
        if is_negative(&gas_price) {
            return Err(TxError::InvalidParameter(format!(
                "can't set negative gas price: {}",
                gas_price
            )));
        }
        let atto = decimal_to_minor(gas_price, NANO_DECIMALS)
            .map_err(|e| TxError::InvalidParameter(e.to_string()))?;
        self.state.params.gas_price = Some(atto);
        Ok(atto)
    }

    /// Convert the amount to atto. With `reject_negative` unset a negative
    /// amount is left for the balance stage to refuse.
    fn set_amount(&mut self, amount: Decimal, reject_negative: bool) -> Result<StagedAmount, TxError> {
        if is_negative(&amount) {
            if reject_negative {
                return Err(negative_amount(amount));
            }
            return Ok(StagedAmount::Negative(amount));
        }
        let atto = decimal_to_minor(amount, ONE_DECIMALS)
            .map_err(|e| TxError::InvalidParameter(e.to_string()))?;
        self.state.params.amount = Some(atto);
        Ok(StagedAmount::Converted(atto))
    }

    async fn verify_balance(
        &mut self,
        amount: StagedAmount,
        gas_price: U256,
        gas_limit: u64,
        shard: u32,
    ) -> Result<U256, TxError> {
        let amount = match amount {
            StagedAmount::Converted(atto) => atto,
            StagedAmount::Negative(value) => return Err(negative_amount(value)),
        };

        let method = Method::GetBalance.qualified(self.namespace);
        let reply = self
            .messenger
            .send_rpc(&method, vec![json!(self.sender_param()), json!("latest")])
            .await?;
        let balance = parse_quantity(reply_result(&reply, &method)?)
            .map_err(|e| RpcError::malformed(&method, e.to_string()))?;

        let fee = gas_price.saturating_mul(U256::from(gas_limit));
        let total = amount.saturating_add(fee);
        if total > balance {
            return Err(TxError::InsufficientBalance {
                available: balance,
                requested: total,
                shard,
            });
        }
        Ok(amount)
    }

    fn set_receiver(&mut self, receiver: &str) -> Result<Address, TxError> {
        let address = parse_address(receiver).map_err(|e| TxError::MalformedAddress {
            input: receiver.to_string(),
            reason: e.to_string(),
        })?;
        self.state.params.receiver = Some(address);
        Ok(address)
    }

    async fn assign_nonce(&mut self, policy: NoncePolicy) -> Result<u64, TxError> {
        let block = match policy {
            NoncePolicy::Explicit(nonce) => {
                self.state.params.nonce = Some(nonce);
                return Ok(nonce);
            }
            NoncePolicy::Pending => "pending",
            NoncePolicy::OnChain => "latest",
        };

        let method = Method::GetTransactionCount.qualified(self.namespace);
        let reply = self
            .messenger
            .send_rpc(&method, vec![json!(self.sender_param()), json!(block)])
            .await?;
        let nonce = parse_quantity_u64(reply_result(&reply, &method)?)
            .map_err(|e| RpcError::malformed(&method, e.to_string()))?;
        self.state.params.nonce = Some(nonce);
        Ok(nonce)
    }

    async fn sign(&mut self, unsigned: UnsignedTransaction) -> Result<SignedTransaction, TxError> {
        let chain_id = self.variant.signing_chain_id(&self.chain);
        let (signed, signer_address) = self.signer.sign(unsigned, chain_id, self.sender).await?;

        tracing::debug!(
            signer = self.signer.kind(),
            chain_id = ?chain_id,
            tx_hash = %signed.hash(),
            "Transaction signed"
        );
        self.state.signer_address = Some(signer_address);
        self.state.signed = Some(signed.clone());
        Ok(signed)
    }

    /// Submit `signed` unless in dry-run mode; never retried.
    async fn broadcast(&mut self, signed: &SignedTransaction) -> Result<Option<String>, TxError> {
        if self.behavior.dry_run {
            tracing::info!(tx_hash = %signed.hash(), "Dry run, transaction not sent");
            return Ok(None);
        }

        let method = Method::SendRawTransaction.qualified(self.namespace);
        let reply = self
            .messenger
            .send_rpc(&method, vec![json!(signed.raw_hex())])
            .await?;
        let tx_hash = reply_result(&reply, &method)?
            .as_str()
            .ok_or_else(|| RpcError::malformed(&method, "result is not a transaction hash"))?
            .to_string();

        metrics::record_broadcast(self.variant.label());
        tracing::info!(
            endpoint = self.messenger.endpoint(),
            tx_hash = %tx_hash,
            "Transaction broadcast"
        );
        self.state.tx_hash = Some(tx_hash.clone());
        Ok(Some(tx_hash))
    }

    async fn confirm(&mut self, tx_hash: &str) -> Result<(), TxError> {
        if self.behavior.confirmation_wait.is_zero() {
            return Ok(());
        }
        let policy = PollPolicy {
            wait: self.behavior.confirmation_wait,
            interval: self
                .behavior
                .poll_interval
                .unwrap_or_else(|| self.variant.poll_interval()),
        };

        let receipt = await_receipt(
            self.messenger.as_ref(),
            self.namespace,
            tx_hash,
            policy,
            self.shutdown.as_ref(),
            &mut self.state.errors,
            self.variant.label(),
        )
        .await?;
        self.state.receipt = Some(receipt);
        Ok(())
    }

    /// Sender as an RPC parameter: hex for the `eth` namespace, bech32 otherwise.
    fn sender_param(&self) -> String {
        match self.namespace {
            Namespace::Eth => self.sender.to_checksum(None),
            Namespace::Hmy | Namespace::HmyV2 => to_bech32(&self.sender),
        }
    }
}

impl fmt::Debug for TransactionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionController")
            .field("endpoint", &self.messenger.endpoint())
            .field("sender", &self.sender)
            .field("chain", &self.chain)
            .field("variant", &self.variant)
            .field("namespace", &self.namespace)
            .field("behavior", &self.behavior)
            .field("signer", &self.signer)
            .finish()
    }
}

fn negative_amount(amount: Decimal) -> TxError {
    TxError::InvalidParameter(format!("can't set negative amount: {}", amount))
}

/// Failures found before anything reached the network's mempool.
fn is_local_failure(err: &TxError) -> bool {
    matches!(
        err,
        TxError::InvalidShard { .. }
            | TxError::MalformedAddress { .. }
            | TxError::InvalidParameter(_)
            | TxError::InsufficientBalance { .. }
            | TxError::SignerMismatch { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_defaults() {
        assert_eq!(TxVariant::CrossShard.default_namespace(), Namespace::Hmy);
        assert_eq!(TxVariant::Eth.poll_interval(), Duration::from_secs(1));
        assert_eq!(TxVariant::CrossShard.poll_interval(), Duration::from_secs(2));
        assert_eq!("eth".parse::<TxVariant>().unwrap(), TxVariant::Eth);
        assert!("evm".parse::<TxVariant>().is_err());
    }

    #[test]
    fn test_variant_chain_ids() {
        let chain = ChainId::testnet();
        assert_eq!(TxVariant::CrossShard.signing_chain_id(&chain), Some(2));
        assert_eq!(TxVariant::Eth.signing_chain_id(&chain), Some(1_666_700_000));
    }

    #[test]
    fn test_variant_serde_names() {
        assert_eq!(
            serde_json::to_value(TxVariant::CrossShard).unwrap(),
            json!("cross-shard")
        );
    }

    #[test]
    fn test_local_failures() {
        assert!(is_local_failure(&TxError::InvalidParameter("x".into())));
        assert!(!is_local_failure(&TxError::Cancelled {
            tx_hash: "0x1".into()
        }));
    }
}
