//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → confirmation waits wake up → pipeline stops with Cancelled
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative: only waits observe it, a broadcast in
//!   flight is never interrupted
//! - A second signal exits immediately

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
