//! Sequential execution of a list of transfers.
//!
//! # Data Flow
//! ```text
//! JSON array of TransferEntry
//!     → driver.rs (defaults, shard routing, one controller per entry)
//!     → entry.rs TransactionLog per processed entry
//!     → BatchReport { logs, has_error }
//! ```
//!
//! # Design Decisions
//! - Entries run one at a time so each sees the effect of the previous
//!   broadcast on balance and nonce
//! - The shard directory is fetched once and reused for the whole batch

pub mod driver;
pub mod entry;

pub use driver::{BatchDriver, BatchReport, SignerProvider};
pub use entry::{TransactionLog, TransferEntry};
