//! Shard discovery and routing.
//!
//! A network is split into shards, each served by its own RPC endpoint. The
//! directory is fetched from any node and decides which endpoint receives a
//! transaction: always the origin shard's, since only it holds the sender's
//! balance and nonce.

pub mod directory;

pub use directory::{ShardDirectory, ShardRoute};
