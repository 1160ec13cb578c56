//! Receipt polling with a bounded, cancellable wait.

use serde_json::{json, Value};
use std::time::Duration;

use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::rpc::{Messenger, Method, Namespace};
use crate::transaction::error::TxError;
use crate::transaction::sink::{lookup_errors, TxErrorRecord};

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// How long and how often to poll for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total budget; decremented by each sleep, not measured against a clock.
    pub wait: Duration,
    pub interval: Duration,
}

/// Poll until a receipt appears, a sink reports the transaction, the
/// budget runs out or `shutdown` fires.
///
/// Sink records and sink lookup failures are appended to `errors`.
pub async fn await_receipt(
    messenger: &dyn Messenger,
    namespace: Namespace,
    tx_hash: &str,
    policy: PollPolicy,
    shutdown: Option<&Shutdown>,
    errors: &mut Vec<TxErrorRecord>,
    variant: &'static str,
) -> Result<Value, TxError> {
    let receipt_method = Method::GetTransactionReceipt.qualified(namespace);
    let mut remaining = policy.wait;

    loop {
        metrics::record_confirmation_poll(variant);
        match messenger
            .send_rpc(&receipt_method, vec![json!(tx_hash)])
            .await
        {
            Ok(reply) => {
                if let Some(receipt) = reply.get("result").filter(|r| !r.is_null()) {
                    tracing::info!(tx_hash, "Transaction confirmed");
                    return Ok(receipt.clone());
                }
            }
            Err(e) => tracing::warn!(tx_hash, error = %e, "Receipt query failed, retrying"),
        }

        match lookup_errors(messenger, namespace, tx_hash).await {
            Ok(found) if !found.is_empty() => {
                let reason = found[0].message.clone();
                tracing::warn!(tx_hash, %reason, "Node rejected transaction");
                errors.extend(found);
                return Err(TxError::TransactionRejected {
                    tx_hash: tx_hash.to_string(),
                    reason,
                });
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(tx_hash, error = %e, "Error sink lookup failed");
                errors.push(TxErrorRecord::local(e.to_string(), Some(tx_hash.to_string())));
            }
        }

        if remaining.is_zero() {
            return Err(TxError::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: policy.wait.as_secs(),
            });
        }

        let step = remaining.min(policy.interval.max(MIN_INTERVAL));
        match shutdown {
            Some(shutdown) => {
                tokio::select! {
                    _ = tokio::time::sleep(step) => {}
                    _ = shutdown.cancelled() => {
                        return Err(TxError::Cancelled {
                            tx_hash: tx_hash.to_string(),
                        });
                    }
                }
            }
            None => tokio::time::sleep(step).await,
        }
        remaining -= step;
    }
}
