//! Kettle integration subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint (eth_kettleAddress, nonce, gas price)
//!     → resolver.rs (kettle + signing key, once per session)
//!     → request.rs (ComputeRecord + confidential inputs)
//!     → signer.rs (0x42-typed digest, signed envelope)
//!     → transaction.rs (submit, session flow)
//!     → poller.rs (bounded receipt wait)
//! ```
//!
//! # Security Constraints
//! - Private keys only from flags or environment variables, never logged
//! - The development key is used for the development kettle and nothing else
//! - Confidential inputs are never part of the signed envelope
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod poller;
pub mod request;
pub mod resolver;
pub mod signer;
pub mod transaction;
pub mod types;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use client::{KettleClient, KettleRpc};
pub use poller::ReceiptPoller;
pub use request::{ComputeRecord, ComputeRequest, RequestBuilder};
pub use resolver::{resolve_key, resolve_kettle, DevModeKey};
pub use signer::{sign_request, SignedEnvelope};
pub use transaction::{submit, ConfidentialSession, ExecutionReport, SessionOptions};
pub use types::{KettleError, KettleResult, LogEntry, Receipt};
pub use wallet::Wallet;
