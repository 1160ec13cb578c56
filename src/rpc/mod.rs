//! JSON-RPC messaging subsystem.
//!
//! # Data Flow
//! ```text
//! caller (controller, shard directory, batch driver)
//!     → methods.rs (namespaced method names)
//!     → messenger.rs (Messenger trait, HTTP transport, query ids, debug hook)
//!     → error.rs (node error codes → closed taxonomy)
//! ```
//!
//! # Design Decisions
//! - The transport is a trait so the pipeline can run against scripted nodes
//! - Query-id counters and debug output live on the messenger instance
//! - Replies are returned as raw JSON objects; callers pick the fields they need

pub mod error;
pub mod messenger;
pub mod methods;

pub use error::{RpcError, RpcErrorCode};
pub use messenger::{
    reply_result, Connector, DebugHook, HttpConnector, HttpMessenger, Messenger, Reply, RpcTrace,
};
pub use methods::{Method, Namespace};
