//! Kettle wire types and error definitions.

use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, B256, U64};
use alloy::transports::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export the RPC settings from the config module to avoid duplication
pub use crate::config::schema::RpcConfig;

/// Errors that can occur while talking to a kettle.
#[derive(Debug, Error)]
pub enum KettleError {
    /// No kettle address was configured and the endpoint advertised none.
    #[error("No kettle address configured and none advertised by the endpoint")]
    NoKettleFound,

    /// No signing key was supplied and no development key applies.
    #[error("No signing key configured for kettle {0}")]
    NoKeyConfigured(Address),

    /// Private key could not be parsed.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Record fields rejected before signing.
    #[error("Invalid compute request: {0}")]
    InvalidRequest(String),

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] TransportError),

    /// A single RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    RpcTimeout(u64),

    /// No receipt showed up before the polling deadline.
    #[error("Transaction {tx_hash} not mined after {waited:?}")]
    ReceiptTimeout { tx_hash: TxHash, waited: Duration },

    /// Receipt polling was cancelled by the caller.
    #[error("Waiting for transaction {0} was cancelled")]
    Cancelled(TxHash),

    /// The receipt reports a failed execution.
    #[error("Transaction {tx_hash} failed in block {block_number:?}")]
    ExecutionFailed {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },

    /// Signer rejected the digest.
    #[error("Signing failed: {0}")]
    Signing(#[from] alloy::signers::Error),

    /// ABI parsing or encoding failed.
    #[error("ABI error: {0}")]
    Abi(String),

    /// An artifact file or directory could not be read.
    #[error("Artifact error at {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },
}

impl From<alloy::dyn_abi::Error> for KettleError {
    fn from(e: alloy::dyn_abi::Error) -> Self {
        KettleError::Abi(e.to_string())
    }
}

/// Result type for kettle operations.
pub type KettleResult<T> = Result<T, KettleError>;

/// A log entry emitted by a confidential compute request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics; the first one is the event signature hash.
    #[serde(default)]
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed fields.
    #[serde(default)]
    pub data: Bytes,
}

impl LogEntry {
    /// First topic, if any.
    pub fn signature_hash(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// Receipt reported by the kettle's chain for a confidential compute request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: TxHash,
    /// `0x1` for success, `0x0` for failure.
    pub status: U64,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl Receipt {
    /// Whether execution succeeded.
    pub fn succeeded(&self) -> bool {
        self.status == U64::from(1)
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number.map(|n| n.to::<u64>())
    }
}
