//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a kettle client session.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// JSON-RPC endpoint settings.
    pub rpc: RpcConfig,

    /// Kettle selection and development fallback.
    pub kettle: KettleConfig,

    /// Receipt polling settings.
    pub receipts: ReceiptConfig,

    /// Where to load ABI artifacts from.
    pub artifacts: ArtifactConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Chain ID to sign for. Queried from the endpoint when unset.
    pub chain_id: Option<u64>,

    /// RPC request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            chain_id: None,
            timeout_secs: 10,
        }
    }
}

/// Kettle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KettleConfig {
    /// Explicit kettle address. Discovered via `eth_kettleAddress` when unset.
    pub address: Option<String>,

    /// Allow the well-known development key when the resolved kettle is the
    /// well-known development kettle.
    pub dev_mode: bool,
}

impl Default for KettleConfig {
    fn default() -> Self {
        Self {
            address: None,
            dev_mode: true,
        }
    }
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReceiptConfig {
    /// Give up waiting for a receipt after this many seconds.
    pub timeout_secs: u64,

    /// Interval between receipt queries in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            poll_interval_ms: 100,
        }
    }
}

/// Artifact directories.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directories scanned recursively for `*.json` artifacts, in order.
    pub dirs: Vec<String>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dirs: vec!["out".to_string()],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
