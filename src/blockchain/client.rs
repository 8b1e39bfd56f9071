//! Kettle RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint
//! - Query kettle addresses, chain ID, pending nonce and gas price
//! - Submit confidential compute requests together with their confidential inputs
//! - Fetch receipts, reporting "not mined yet" as `Ok(None)` rather than an error
//!
//! No call is retried here; transport failures surface to the caller unchanged.

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::TransportResult;
use async_trait::async_trait;
use std::future::{Future, IntoFuture};
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{KettleError, KettleResult, Receipt, RpcConfig};

/// JSON-RPC methods a kettle endpoint must answer.
#[async_trait]
pub trait KettleRpc: Send + Sync {
    /// Addresses of the kettles served by this endpoint (`eth_kettleAddress`).
    async fn kettle_addresses(&self) -> KettleResult<Vec<Address>>;

    /// Chain ID of the endpoint.
    async fn chain_id(&self) -> KettleResult<u64>;

    /// Nonce including pending transactions.
    async fn pending_nonce(&self, address: Address) -> KettleResult<u64>;

    /// Suggested gas price in wei.
    async fn gas_price(&self) -> KettleResult<u128>;

    /// Submit an encoded signed envelope with its confidential inputs.
    async fn send_compute_request(
        &self,
        envelope: Bytes,
        confidential_inputs: Bytes,
    ) -> KettleResult<TxHash>;

    /// Receipt for a transaction, or `None` while it is not yet mined.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> KettleResult<Option<Receipt>>;
}

/// Kettle RPC client over an alloy HTTP provider.
#[derive(Clone)]
pub struct KettleClient {
    provider: DynProvider,
    /// Configuration.
    config: RpcConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl KettleClient {
    /// Create a new kettle client.
    ///
    /// No request is made; an unreachable endpoint only shows up on first use.
    pub fn new(config: RpcConfig) -> KettleResult<Self> {
        let timeout_duration = Duration::from_secs(config.timeout_secs);

        let url: url::Url = config.url.parse().map_err(|e| {
            KettleError::Rpc(alloy::transports::TransportErrorKind::custom_str(&format!(
                "Invalid RPC URL '{}': {}",
                config.url, e
            )))
        })?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        tracing::debug!(rpc_url = %config.url, timeout_secs = config.timeout_secs, "Kettle client created");

        Ok(Self {
            provider,
            config,
            timeout_duration,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    async fn call<T, F>(&self, method: &'static str, fut: F) -> KettleResult<T>
    where
        F: Future<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(method, error = %e, "RPC error");
                Err(KettleError::Rpc(e))
            }
            Err(_) => {
                tracing::warn!(method, "RPC timeout");
                Err(KettleError::RpcTimeout(self.config.timeout_secs))
            }
        }
    }
}

#[async_trait]
impl KettleRpc for KettleClient {
    async fn kettle_addresses(&self) -> KettleResult<Vec<Address>> {
        self.call(
            "eth_kettleAddress",
            self.provider
                .raw_request::<_, Vec<Address>>("eth_kettleAddress".into(), ()),
        )
        .await
    }

    async fn chain_id(&self) -> KettleResult<u64> {
        self.call("eth_chainId", self.provider.get_chain_id()).await
    }

    async fn pending_nonce(&self, address: Address) -> KettleResult<u64> {
        self.call(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending().into_future(),
        )
        .await
    }

    async fn gas_price(&self) -> KettleResult<u128> {
        self.call("eth_gasPrice", self.provider.get_gas_price()).await
    }

    async fn send_compute_request(
        &self,
        envelope: Bytes,
        confidential_inputs: Bytes,
    ) -> KettleResult<TxHash> {
        self.call(
            "eth_sendRawTransaction",
            self.provider.raw_request::<_, TxHash>(
                "eth_sendRawTransaction".into(),
                (envelope, confidential_inputs),
            ),
        )
        .await
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> KettleResult<Option<Receipt>> {
        self.call(
            "eth_getTransactionReceipt",
            self.provider
                .raw_request::<_, Option<Receipt>>("eth_getTransactionReceipt".into(), (tx_hash,)),
        )
        .await
    }
}

impl std::fmt::Debug for KettleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KettleClient")
            .field("rpc_url", &self.config.url)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
