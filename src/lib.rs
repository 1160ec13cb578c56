//! Client-side transfer pipeline for sharded, Harmony-style ledgers.
//!
//! # Architecture Overview
//!
//! ```text
//!   TransferEntry / TransferIntent
//!        │
//!        ▼
//!   ┌──────────┐   directory    ┌──────────┐
//!   │  batch   │───────────────▶│ sharding │
//!   │  driver  │                └──────────┘
//!   └────┬─────┘   origin shard endpoint
//!        ▼
//!   ┌─────────────┐  sign   ┌────────┐
//!   │ transaction │────────▶│ signer │  local key / keystore / device
//!   │ controller  │         └────────┘
//!   └────┬────────┘
//!        │ balance, nonce, broadcast, receipt, error sinks
//!        ▼
//!   ┌─────────┐
//!   │   rpc   │  JSON-RPC over HTTP
//!   └─────────┘
//!
//!   cross-cutting: common, config, observability, lifecycle
//! ```

pub mod batch;
pub mod common;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod rpc;
pub mod sharding;
pub mod signer;
pub mod transaction;

pub use batch::{BatchDriver, BatchReport, TransferEntry};
pub use config::ClientConfig;
pub use lifecycle::Shutdown;
pub use transaction::{TransactionController, TransferIntent, TxError, TxVariant};
