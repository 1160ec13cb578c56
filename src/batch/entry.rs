//! Batch input entries and per-entry logs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::transaction::TxError;

/// Timestamp layout used in logs, UTC with microseconds.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One transfer as written in a batch file. Every value is a string so
/// missing fields can be told apart from zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransferEntry {
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<String>,
    pub from_shard: Option<String>,
    pub to_shard: Option<String>,
    pub passphrase_string: Option<String>,
    pub passphrase_file: Option<String>,
    pub nonce: Option<String>,
    pub gas_price: Option<String>,
    pub gas_limit: Option<String>,
    /// Halt the batch if this entry fails.
    pub stop_on_error: bool,
    /// Use the mined nonce instead of the pending one.
    pub true_nonce: bool,
}

/// Outcome of one processed entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionLog {
    #[serde(rename = "transaction-hash", skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,

    #[serde(rename = "transaction", skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Value>,

    #[serde(rename = "blockchain-receipt", skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Value>,

    #[serde(rename = "raw-transaction", skip_serializing_if = "Option::is_none")]
    pub raw_transaction: Option<String>,

    /// `[timestamp] message` lines, oldest first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    #[serde(rename = "time-signed-utc", skip_serializing_if = "Option::is_none")]
    pub time_signed: Option<String>,

    #[serde(skip)]
    pub failure: Option<TxError>,
}

impl TransactionLog {
    pub fn push_error(&mut self, message: impl fmt::Display) {
        self.errors
            .push(format!("[{}] {}", Utc::now().format(LOG_TIME_FORMAT), message));
    }

    /// Record the entry's terminal failure.
    pub fn fail(&mut self, failure: TxError) {
        self.push_error(&failure);
        self.failure = Some(failure);
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn mark_signed(&mut self) {
        self.time_signed = Some(Utc::now().format(LOG_TIME_FORMAT).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_kebab_case_keys() {
        let entry: TransferEntry = serde_json::from_value(json!({
            "from": "one1a",
            "to": "one1b",
            "amount": "1.5",
            "from-shard": "0",
            "to-shard": "1",
            "passphrase-string": "",
            "gas-price": "2",
            "stop-on-error": true,
            "true-nonce": true
        }))
        .unwrap();
        assert_eq!(entry.from_shard.as_deref(), Some("0"));
        assert_eq!(entry.to_shard.as_deref(), Some("1"));
        assert_eq!(entry.gas_price.as_deref(), Some("2"));
        assert!(entry.stop_on_error);
        assert!(entry.true_nonce);
        assert_eq!(entry.nonce, None);
    }

    #[test]
    fn test_log_omits_empty_fields() {
        let mut log = TransactionLog::default();
        assert_eq!(serde_json::to_value(&log).unwrap(), json!({}));

        log.tx_hash = Some("0xabc".into());
        log.fail(TxError::InvalidParameter("bad".into()));
        let encoded = serde_json::to_value(&log).unwrap();
        assert_eq!(encoded["transaction-hash"], "0xabc");
        assert_eq!(encoded["errors"].as_array().unwrap().len(), 1);
        assert!(encoded["errors"][0]
            .as_str()
            .unwrap()
            .ends_with("] invalid transaction parameter: bad"));
        assert!(encoded.get("failure").is_none());
    }
}
