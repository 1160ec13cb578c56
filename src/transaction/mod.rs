//! Transaction pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! TransferIntent
//!     → controller.rs (stages, first failure wins)
//!     → types.rs / encoding.rs (transaction shapes, RLP)
//!     → crate::signer (signature, sender check)
//!     → confirmation.rs + sink.rs (receipt polling, node error sinks)
//!     → state.rs (everything the run produced)
//! ```
//!
//! # Design Decisions
//! - The transaction shape is chosen once per controller
//! - Broadcast is never retried; only the receipt read is
//! - Negative values are refused before conversion to `U256`

pub mod confirmation;
pub mod controller;
pub mod encoding;
pub mod error;
pub mod gas;
pub mod intent;
pub mod sink;
pub mod state;
pub mod types;

pub use confirmation::{await_receipt, PollPolicy};
pub use controller::{Behavior, TransactionController, TxVariant};
pub use error::TxError;
pub use gas::intrinsic_gas;
pub use intent::{NoncePolicy, TransferIntent};
pub use sink::{lookup_errors, TxErrorRecord};
pub use state::{ControllerState, TxParams};
pub use types::{
    CrossShardTransaction, EthTransaction, SignatureValues, SignedTransaction, UnsignedTransaction,
};
