//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed ReceiptPoller returns Cancelled
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
