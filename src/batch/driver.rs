//! Batch driver: one controller run per entry, in order.

use alloy::primitives::Address;
use serde::Serialize;
use std::fs;
use std::sync::Arc;

use crate::common::{parse_address, parse_decimal, ChainId};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::rpc::{Connector, Namespace};
use crate::sharding::ShardDirectory;
use crate::signer::{HardwareDevice, HardwareSigner, Keystore, LocalSigner, Signer};
use crate::batch::entry::{TransactionLog, TransferEntry};
use crate::transaction::{
    Behavior, NoncePolicy, TransactionController, TransferIntent, TxError, TxVariant,
};

/// Passphrase used when an entry names none.
pub const DEFAULT_PASSPHRASE: &str = "";

/// Gas price in Gwei used when an entry names none.
pub const DEFAULT_GAS_PRICE: &str = "1";

/// Where each entry's signer comes from.
#[derive(Clone)]
pub enum SignerProvider {
    /// Unlock the entry's sender from a keystore with the entry's passphrase.
    Keystore(Arc<dyn Keystore>),
    /// One already-unlocked key for every entry.
    Unlocked(LocalSigner),
    Hardware(Arc<dyn HardwareDevice>),
}

impl SignerProvider {
    fn signer_for(&self, sender: Address, passphrase: String) -> Signer {
        match self {
            Self::Keystore(keystore) => {
                LocalSigner::from_keystore(keystore.clone(), sender, passphrase).into()
            }
            Self::Unlocked(signer) => signer.clone().into(),
            Self::Hardware(device) => HardwareSigner::new(device.clone()).into(),
        }
    }
}

/// Logs of every processed entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub logs: Vec<TransactionLog>,
    /// True when any processed entry failed.
    #[serde(skip)]
    pub has_error: bool,
}

/// Entry fields after defaults and parsing.
struct EntryRequest {
    sender: Address,
    passphrase: String,
    from_shard: i64,
    to_shard: i64,
    intent: TransferIntent,
}

pub struct BatchDriver {
    connector: Arc<dyn Connector>,
    node: String,
    chain: ChainId,
    variant: TxVariant,
    namespace: Namespace,
    signers: SignerProvider,
    behavior: Behavior,
    shutdown: Option<Shutdown>,
    directory: Option<ShardDirectory>,
}

impl BatchDriver {
    /// `node` is any endpoint of the network; it only serves the shard directory.
    pub fn new(
        connector: Arc<dyn Connector>,
        node: impl Into<String>,
        chain: ChainId,
        variant: TxVariant,
        signers: SignerProvider,
    ) -> Self {
        Self {
            connector,
            node: node.into(),
            chain,
            variant,
            namespace: variant.default_namespace(),
            signers,
            behavior: Behavior::default(),
            shutdown: None,
            directory: None,
        }
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Use a known directory instead of fetching one.
    pub fn with_directory(mut self, directory: ShardDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Process `entries` in order, stopping early only after a failed entry
    /// that asked for it.
    pub async fn run(&mut self, entries: &[TransferEntry]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, entry) in entries.iter().enumerate() {
            let log = self.execute_entry(entry).await;
            let failed = log.is_failed();
            metrics::record_batch_entry(if failed { "failed" } else { "ok" });
            report.logs.push(log);

            if failed {
                report.has_error = true;
                if entry.stop_on_error {
                    tracing::warn!(index, remaining = entries.len() - index - 1, "Stopping batch on error");
                    break;
                }
            }
        }
        report
    }

    /// Run one entry and describe what happened.
    pub async fn execute_entry(&mut self, entry: &TransferEntry) -> TransactionLog {
        let mut log = TransactionLog::default();
        if let Err(err) = self.try_execute(entry, &mut log).await {
            log.fail(err);
        }
        log
    }

    async fn try_execute(
        &mut self,
        entry: &TransferEntry,
        log: &mut TransactionLog,
    ) -> Result<(), TxError> {
        let request = parse_entry(entry, self.variant)?;
        let directory = self.directory().await?;
        let from_shard = directory.check_shard("from-shard", request.from_shard)?;
        let to_shard = directory.check_shard("to-shard", request.to_shard)?;
        let endpoint = directory.origin_endpoint(from_shard, to_shard)?;
        let messenger = self.connector.connect(endpoint)?;

        let signer = self.signers.signer_for(request.sender, request.passphrase);
        let mut controller = TransactionController::new(
            messenger,
            signer,
            request.sender,
            self.chain.clone(),
            self.variant,
        )
        .with_behavior(self.behavior)
        .with_namespace(self.namespace)
        .with_directory(directory.clone());
        if let Some(shutdown) = &self.shutdown {
            controller = controller.with_shutdown(shutdown.clone());
        }

        let intent = request.intent.with_shards(from_shard, to_shard);
        log.mark_signed();
        let outcome = controller.execute(&intent).await;

        if self.behavior.dry_run {
            log.raw_transaction = controller.raw_transaction();
            log.transaction = controller.transaction_json();
        } else {
            log.tx_hash = controller.transaction_hash().map(str::to_string);
        }
        log.receipt = controller.receipt().cloned();

        if let Err(err) = &outcome {
            let failure = err.to_string();
            for record in controller.errors().iter().filter(|r| r.message != failure) {
                log.push_error(record);
            }
        }
        outcome
    }

    async fn directory(&mut self) -> Result<ShardDirectory, TxError> {
        if let Some(directory) = &self.directory {
            return Ok(directory.clone());
        }
        let messenger = self.connector.connect(&self.node)?;
        let directory = ShardDirectory::resolve(messenger.as_ref(), self.namespace).await?;
        self.directory = Some(directory.clone());
        Ok(directory)
    }
}

fn invalid(message: impl Into<String>) -> TxError {
    TxError::InvalidParameter(message.into())
}

fn parse_entry(entry: &TransferEntry, variant: TxVariant) -> Result<EntryRequest, TxError> {
    let (Some(from), Some(to), Some(amount)) = (&entry.from, &entry.to, &entry.amount) else {
        return Err(invalid("FromAddress/ToAddress/Amount are required fields"));
    };

    let (from_shard, to_shard) = match (&entry.from_shard, &entry.to_shard, variant) {
        (Some(from), Some(to), _) => (parse_shard(from)?, parse_shard(to)?),
        (from, _, TxVariant::Eth) => {
            let shard = from.as_deref().map(parse_shard).transpose()?.unwrap_or(0);
            (shard, shard)
        }
        _ => return Err(invalid("FromShardID/ToShardID are required fields")),
    };

    let sender = parse_address(from).map_err(|e| TxError::MalformedAddress {
        input: from.clone(),
        reason: e.to_string(),
    })?;
    let amount = parse_decimal(amount).map_err(|e| invalid(format!("amount {}", e)))?;
    let gas_price = parse_decimal(entry.gas_price.as_deref().unwrap_or(DEFAULT_GAS_PRICE))
        .map_err(|e| invalid(format!("gas-price {}", e)))?;
    let gas_limit = entry.gas_limit.as_deref().map(parse_gas_limit).transpose()?;
    let nonce = nonce_policy(entry)?;
    let passphrase = passphrase(entry)?;

    let intent = TransferIntent::new(to.clone(), amount)
        .with_gas(gas_price, gas_limit)
        .with_nonce(nonce);

    Ok(EntryRequest {
        sender,
        passphrase,
        from_shard,
        to_shard,
        intent,
    })
}

fn parse_shard(value: &str) -> Result<i64, TxError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| invalid(format!("shard id must be an integer: {}", value)))
}

fn parse_gas_limit(value: &str) -> Result<u64, TxError> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(invalid(format!("gas-limit can not be negative: {}", value)));
    }
    value
        .parse::<u64>()
        .map_err(|e| invalid(format!("gas-limit {}: {}", value, e)))
}

fn nonce_policy(entry: &TransferEntry) -> Result<NoncePolicy, TxError> {
    match (&entry.nonce, entry.true_nonce) {
        (Some(_), true) => Err(invalid("cannot define nonce when using true nonce")),
        (None, true) => Ok(NoncePolicy::OnChain),
        (None, false) => Ok(NoncePolicy::Pending),
        (Some(value), false) => {
            let value = value.trim();
            if value.starts_with('-') {
                return Err(invalid(format!("nonce can not be negative: {}", value)));
            }
            value
                .parse::<u64>()
                .map(NoncePolicy::Explicit)
                .map_err(|e| invalid(format!("nonce {}: {}", value, e)))
        }
    }
}

fn passphrase(entry: &TransferEntry) -> Result<String, TxError> {
    if let Some(path) = &entry.passphrase_file {
        let content = fs::read_to_string(path)
            .map_err(|e| TxError::Signer(format!("cannot read passphrase file {}: {}", path, e)))?;
        return Ok(content.trim_end_matches(['\r', '\n']).to_string());
    }
    Ok(entry
        .passphrase_string
        .clone()
        .unwrap_or_else(|| DEFAULT_PASSPHRASE.to_string()))
}
