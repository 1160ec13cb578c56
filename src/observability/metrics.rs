//! Metrics emitted by the transfer pipeline.
//!
//! # Metrics
//! - `hmy_rpc_calls_total` (counter): RPC calls by method, outcome
//! - `hmy_transactions_total` (counter): pipeline runs by variant, outcome
//! - `hmy_broadcasts_total` (counter): raw transactions handed to a node
//! - `hmy_confirmation_polls_total` (counter): receipt polls by variant
//! - `hmy_batch_entries_total` (counter): batch entries by outcome

/// Count one RPC call. Outcomes: `ok`, `node_error`, `transport_error`, `malformed`.
pub fn record_rpc_call(method: &str, outcome: &'static str) {
    metrics::counter!(
        "hmy_rpc_calls_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Count one finished pipeline run.
pub fn record_pipeline_outcome(variant: &'static str, outcome: &'static str) {
    metrics::counter!(
        "hmy_transactions_total",
        "variant" => variant,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_broadcast(variant: &'static str) {
    metrics::counter!("hmy_broadcasts_total", "variant" => variant).increment(1);
}

pub fn record_confirmation_poll(variant: &'static str) {
    metrics::counter!("hmy_confirmation_polls_total", "variant" => variant).increment(1);
}

pub fn record_batch_entry(outcome: &'static str) {
    metrics::counter!("hmy_batch_entries_total", "outcome" => outcome).increment(1);
}
