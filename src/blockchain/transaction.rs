//! Submission and the end-to-end request flow.
//!
//! # Responsibilities
//! - Send a signed envelope and its confidential inputs in one RPC call
//! - Drive resolve → build → sign → submit → wait → decode for a session
//! - Surface failed executions distinctly from transport errors

use alloy::primitives::{Address, Bytes, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::abi::events::{render_outcome, DecodeOutcome, EventRegistry};
use crate::blockchain::client::KettleRpc;
use crate::blockchain::poller::{ReceiptPoller, DEFAULT_POLL_INTERVAL, DEFAULT_RECEIPT_TIMEOUT};
use crate::blockchain::request::RequestBuilder;
use crate::blockchain::resolver::{resolve_key, resolve_kettle, DevModeKey};
use crate::blockchain::signer::{sign_request, SignedEnvelope};
use crate::blockchain::types::{KettleError, KettleResult, Receipt};
use crate::blockchain::wallet::Wallet;

/// Submit a signed envelope with its confidential inputs.
///
/// Exactly one RPC call; nothing is retried.
pub async fn submit<R>(
    rpc: &R,
    envelope: &SignedEnvelope,
    confidential_inputs: &Bytes,
) -> KettleResult<TxHash>
where
    R: KettleRpc + ?Sized,
{
    let expected = envelope.hash();
    let tx_hash = rpc
        .send_compute_request(envelope.encoded(), confidential_inputs.clone())
        .await?;

    if tx_hash != expected {
        tracing::warn!(
            tx_hash = %tx_hash,
            expected = %expected,
            "Kettle returned a hash different from the envelope hash"
        );
    }

    metrics::counter!("kettle_requests_submitted_total").increment(1);
    tracing::info!(
        tx_hash = %tx_hash,
        kettle = %envelope.record().kettle_address,
        confidential_bytes = confidential_inputs.len(),
        "Confidential compute request submitted"
    );

    Ok(tx_hash)
}

/// Inputs for [`ConfidentialSession::connect`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Explicit kettle; discovered from the endpoint when `None`.
    pub kettle: Option<Address>,
    /// Hex private key; falls back to `dev_key` for the development kettle.
    pub private_key: Option<String>,
    pub dev_key: Option<DevModeKey>,
    /// Chain to sign for; queried from the endpoint when `None`.
    pub chain_id: Option<u64>,
    pub receipt_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            kettle: None,
            private_key: None,
            dev_key: None,
            chain_id: None,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A mined confidential compute request and its rendered events.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub tx_hash: TxHash,
    pub receipt: Receipt,
    /// Decode outcome per receipt log, in log order.
    pub events: Vec<DecodeOutcome>,
    /// Rendered form of each log, decoded or raw.
    pub rendered: Vec<String>,
}

impl ExecutionReport {
    /// Number of logs that decoded against a known event.
    pub fn decoded_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DecodeOutcome::Decoded(_)))
            .count()
    }
}

/// A configured client: kettle and key resolved, events loaded.
pub struct ConfidentialSession<R> {
    rpc: R,
    kettle: Address,
    chain_id: u64,
    wallet: Wallet,
    events: Arc<EventRegistry>,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl<R: KettleRpc> ConfidentialSession<R> {
    /// Resolve kettle, key and chain ID once for the session.
    pub async fn connect(
        rpc: R,
        options: SessionOptions,
        events: Arc<EventRegistry>,
    ) -> KettleResult<Self> {
        let kettle = resolve_kettle(&rpc, options.kettle).await?;
        let wallet = resolve_key(options.private_key.as_deref(), kettle, options.dev_key.as_ref())?;
        let chain_id = match options.chain_id {
            Some(id) => id,
            None => rpc.chain_id().await?,
        };

        tracing::info!(
            kettle = %kettle,
            signer = %wallet.address(),
            chain_id,
            known_events = events.len(),
            "Session ready"
        );

        Ok(Self {
            rpc,
            kettle,
            chain_id,
            wallet,
            events,
            receipt_timeout: options.receipt_timeout,
            poll_interval: options.poll_interval,
        })
    }

    pub fn kettle(&self) -> Address {
        self.kettle
    }

    pub fn signer(&self) -> Address {
        self.wallet.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Build and sign a request against fresh nonce and gas price.
    pub async fn prepare(
        &self,
        to: Address,
        call_data: Bytes,
        confidential_inputs: Bytes,
    ) -> KettleResult<(SignedEnvelope, Bytes)> {
        let nonce = self.rpc.pending_nonce(self.wallet.address()).await?;
        let gas_price = self.rpc.gas_price().await?;

        let request = RequestBuilder::new(self.kettle, self.chain_id)
            .to(to)
            .input(call_data)
            .confidential_inputs(confidential_inputs)
            .nonce(nonce)
            .gas_price(gas_price)
            .build()?;
        let envelope = sign_request(&request, &self.wallet)?;

        Ok((envelope, request.confidential_inputs))
    }

    /// Send a confidential call and wait for it to be mined.
    pub async fn send(
        &self,
        to: Address,
        call_data: Bytes,
        confidential_inputs: Bytes,
        cancel: Option<broadcast::Receiver<()>>,
    ) -> KettleResult<ExecutionReport> {
        let (envelope, confidential_inputs) = self.prepare(to, call_data, confidential_inputs).await?;
        let tx_hash = submit(&self.rpc, &envelope, &confidential_inputs).await?;
        self.watch(tx_hash, cancel).await
    }

    /// Wait for an already submitted transaction and decode its logs.
    pub async fn watch(
        &self,
        tx_hash: TxHash,
        cancel: Option<broadcast::Receiver<()>>,
    ) -> KettleResult<ExecutionReport> {
        let mut poller = ReceiptPoller::new(&self.rpc)
            .timeout(self.receipt_timeout)
            .interval(self.poll_interval);
        if let Some(cancel) = cancel {
            poller = poller.cancel_on(cancel);
        }
        let receipt = poller.wait(tx_hash).await?;

        if !receipt.succeeded() {
            return Err(KettleError::ExecutionFailed {
                tx_hash,
                block_number: receipt.block_number(),
            });
        }

        let events: Vec<DecodeOutcome> =
            receipt.logs.iter().map(|log| self.events.decode(log)).collect();
        let rendered = receipt
            .logs
            .iter()
            .zip(&events)
            .map(|(log, outcome)| render_outcome(log, outcome))
            .collect();

        Ok(ExecutionReport {
            tx_hash,
            receipt,
            events,
            rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::resolver::{DEV_KETTLE_ADDRESS, DEV_PRIVATE_KEY};
    use crate::blockchain::testing::ScriptedRpc;
    use crate::blockchain::types::LogEntry;
    use alloy::dyn_abi::DynSolValue;
    use alloy::json_abi::Event;
    use alloy::primitives::{keccak256, B256, U256, U64};

    fn bid_event() -> Event {
        Event::parse("event BidEvent(bytes16 id, uint64 decryptionCondition, address[] allowedPeekers)")
            .unwrap()
    }

    fn bid_log(contract: Address) -> LogEntry {
        let data = DynSolValue::Tuple(vec![
            DynSolValue::FixedBytes(B256::right_padding_from(&[0x01; 16]), 16),
            DynSolValue::Uint(U256::from(7), 64),
            DynSolValue::Array(vec![DynSolValue::Address(contract)]),
        ])
        .abi_encode_params();
        LogEntry {
            address: contract,
            topics: vec![bid_event().selector()],
            data: data.into(),
        }
    }

    fn registry() -> Arc<EventRegistry> {
        let mut registry = EventRegistry::new();
        registry.push(bid_event());
        Arc::new(registry)
    }

    fn dev_options() -> SessionOptions {
        SessionOptions {
            dev_key: Some(DevModeKey::well_known().unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_sends_envelope_and_inputs() {
        let rpc = ScriptedRpc::new();
        let wallet = Wallet::from_private_key(DEV_PRIVATE_KEY).unwrap();
        let request = RequestBuilder::new(DEV_KETTLE_ADDRESS, 1)
            .to(Address::repeat_byte(0xaa))
            .confidential_inputs(Bytes::from_static(b"secret"))
            .build()
            .unwrap();
        let envelope = sign_request(&request, &wallet).unwrap();

        let tx_hash = submit(&rpc, &envelope, &request.confidential_inputs).await.unwrap();

        assert_eq!(tx_hash, envelope.hash());
        let submitted = rpc.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, envelope.encoded());
        assert_eq!(submitted[0].1, Bytes::from_static(b"secret"));
        assert_eq!(keccak256(&submitted[0].0), tx_hash);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_success() {
        let contract = Address::repeat_byte(0xaa);
        let rpc = ScriptedRpc::new().with_kettles(vec![DEV_KETTLE_ADDRESS]);
        rpc.push_receipt(Ok(None));
        rpc.push_receipt(Ok(None));
        rpc.push_receipt(Ok(Some(Receipt {
            transaction_hash: B256::ZERO,
            status: U64::from(1),
            block_number: Some(U64::from(12)),
            contract_address: None,
            logs: vec![bid_log(contract)],
        })));

        let session = ConfidentialSession::connect(rpc, dev_options(), registry()).await.unwrap();
        assert_eq!(session.kettle(), DEV_KETTLE_ADDRESS);
        assert_eq!(session.chain_id(), 16813125);

        let report = session
            .send(contract, Bytes::from_static(&[0x12, 0x34]), Bytes::new(), None)
            .await
            .unwrap();

        assert!(report.receipt.succeeded());
        assert_eq!(report.decoded_count(), 1);
        assert!(report.rendered[0].starts_with("BidEvent(id: 0x01010101010101010101010101010101"));
        assert!(report.rendered[0].contains("decryptionCondition: 7"));
        assert_eq!(report.rendered.len(), report.events.len());
        assert_eq!(
            report.rendered[0],
            render_outcome(&report.receipt.logs[0], &report.events[0])
        );
        assert_eq!(session.rpc.polls(), 3);

        let submitted = session.rpc.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].1.is_empty());
        assert_eq!(report.tx_hash, keccak256(&submitted[0].0));
    }

    #[tokio::test]
    async fn test_record_carries_fresh_nonce_and_gas_price() {
        let rpc = ScriptedRpc::new();
        let options = SessionOptions {
            kettle: Some(DEV_KETTLE_ADDRESS),
            chain_id: Some(1),
            ..dev_options()
        };
        let session = ConfidentialSession::connect(rpc, options, registry()).await.unwrap();

        let (envelope, _) = session
            .prepare(Address::repeat_byte(0xaa), Bytes::new(), Bytes::new())
            .await
            .unwrap();
        let record = envelope.record();
        assert_eq!(record.nonce, 5);
        assert_eq!(record.gas_price, 10);
        assert_eq!(record.gas_limit, 10_000_000);
        assert_eq!(record.chain_id, 1);
        assert_eq!(envelope.recover_signer().unwrap(), session.signer());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_execution_is_distinct() {
        let rpc = ScriptedRpc::new().with_kettles(vec![DEV_KETTLE_ADDRESS]);
        rpc.push_receipt(Ok(Some(Receipt {
            transaction_hash: B256::ZERO,
            status: U64::from(0),
            block_number: Some(U64::from(3)),
            contract_address: None,
            logs: Vec::new(),
        })));

        let session = ConfidentialSession::connect(rpc, dev_options(), registry()).await.unwrap();
        let result = session
            .send(Address::repeat_byte(0xaa), Bytes::new(), Bytes::new(), None)
            .await;

        assert!(matches!(
            result,
            Err(KettleError::ExecutionFailed { block_number: Some(3), .. })
        ));
    }

    #[tokio::test]
    async fn test_non_dev_kettle_without_key_fails_closed() {
        let rpc = ScriptedRpc::new().with_kettles(vec![Address::repeat_byte(0x77)]);
        let result = ConfidentialSession::connect(rpc, dev_options(), registry()).await;
        assert!(matches!(result, Err(KettleError::NoKeyConfigured(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_logs_render_raw() {
        let rpc = ScriptedRpc::new().with_kettles(vec![DEV_KETTLE_ADDRESS]);
        rpc.push_receipt(Ok(Some(Receipt {
            transaction_hash: B256::ZERO,
            status: U64::from(1),
            block_number: Some(U64::from(3)),
            contract_address: None,
            logs: vec![LogEntry {
                address: Address::repeat_byte(0xaa),
                topics: Vec::new(),
                data: Bytes::new(),
            }],
        })));

        let session = ConfidentialSession::connect(rpc, dev_options(), registry()).await.unwrap();
        let report = session.watch(B256::ZERO, None).await.unwrap();
        assert_eq!(report.decoded_count(), 0);
        assert!(report.rendered[0].contains("0 topics"));
    }
}
