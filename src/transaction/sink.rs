//! Node error-sink records and lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::rpc::{reply_result, Messenger, Method, Namespace, RpcError};

const SINK_METHODS: [Method; 2] = [
    Method::GetCurrentTransactionErrorSink,
    Method::GetCurrentStakingErrorSink,
];

/// One rejected-transaction record, either reported by a node sink or
/// detected locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxErrorRecord {
    #[serde(rename = "tx-hash-id", default)]
    pub tx_hash: Option<String>,

    /// Set for staking transaction errors only.
    #[serde(
        rename = "directive-kind",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub staking_directive: Option<String>,

    #[serde(rename = "error-message", default)]
    pub message: String,

    /// Unix seconds.
    #[serde(rename = "time-at-rejection", default)]
    pub rejected_at: i64,
}

impl TxErrorRecord {
    /// A record for a failure detected on this side, stamped now.
    pub fn local(message: impl Into<String>, tx_hash: Option<String>) -> Self {
        Self {
            tx_hash,
            staking_directive: None,
            message: message.into(),
            rejected_at: Utc::now().timestamp(),
        }
    }
}

impl fmt::Display for TxErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let directive = self
            .staking_directive
            .as_deref()
            .unwrap_or("Plain transaction");
        let at = DateTime::<Utc>::from_timestamp(self.rejected_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| self.rejected_at.to_string());
        write!(f, "[{}] {} -- {}", directive, self.message, at)
    }
}

/// Records naming `tx_hash`, from the first sink that has any.
///
/// The plain-transaction sink is consulted before the staking sink.
pub async fn lookup_errors(
    messenger: &dyn Messenger,
    namespace: Namespace,
    tx_hash: &str,
) -> Result<Vec<TxErrorRecord>, RpcError> {
    for method in SINK_METHODS {
        let name = method.qualified(namespace);
        let reply = messenger.send_rpc(&name, vec![]).await?;
        let matching: Vec<TxErrorRecord> = match reply_result(&reply, &name)? {
            Value::Null => Vec::new(),
            result => serde_json::from_value::<Vec<TxErrorRecord>>(result.clone())
                .map_err(|e| RpcError::malformed(&name, e.to_string()))?
                .into_iter()
                .filter(|record| record.tx_hash.as_deref() == Some(tx_hash))
                .collect(),
        };
        if !matching.is_empty() {
            return Ok(matching);
        }
    }
    Ok(Vec::new())
}
