//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters through the metrics facade)
//!
//! Consumers:
//!     → stderr (tracing-subscriber fmt layer)
//!     → whatever recorder the embedding binary installs
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the binary decides where events go
//! - No recorder installed means metric calls are no-ops

pub mod logging;
pub mod metrics;
