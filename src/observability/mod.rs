//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields: tx_hash, kettle, attempt)
//!     → metrics facade (kettle_* counters and histograms)
//!
//! Consumers:
//!     → logging.rs (stderr or JSON subscriber)
//!     → Any metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Addresses are logged, private keys never are
//! - No recorder is installed here; recording is a no-op until one is

pub mod logging;

pub use logging::init_logging;
