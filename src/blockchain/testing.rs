//! Scripted in-memory kettle endpoint for unit tests.

use alloy::primitives::{keccak256, Address, Bytes, TxHash};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::blockchain::client::KettleRpc;
use crate::blockchain::types::{KettleResult, Receipt};

/// Answers fixed values and replays scripted receipt responses in order.
///
/// Once the script runs dry every receipt query reports "not found".
pub(crate) struct ScriptedRpc {
    pub kettles: Vec<Address>,
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    /// How long each receipt query takes.
    pub receipt_delay: Duration,
    receipts: Mutex<VecDeque<KettleResult<Option<Receipt>>>>,
    pub submitted: Mutex<Vec<(Bytes, Bytes)>>,
    pub kettle_queries: AtomicU32,
    pub receipt_polls: AtomicU32,
}

impl ScriptedRpc {
    pub fn new() -> Self {
        Self {
            kettles: Vec::new(),
            chain_id: 16813125,
            nonce: 5,
            gas_price: 10,
            receipt_delay: Duration::ZERO,
            receipts: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            kettle_queries: AtomicU32::new(0),
            receipt_polls: AtomicU32::new(0),
        }
    }

    pub fn with_kettles(mut self, kettles: Vec<Address>) -> Self {
        self.kettles = kettles;
        self
    }

    pub fn with_receipt_delay(mut self, delay: Duration) -> Self {
        self.receipt_delay = delay;
        self
    }

    pub fn push_receipt(&self, response: KettleResult<Option<Receipt>>) {
        self.receipts.lock().unwrap().push_back(response);
    }

    pub fn polls(&self) -> u32 {
        self.receipt_polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KettleRpc for ScriptedRpc {
    async fn kettle_addresses(&self) -> KettleResult<Vec<Address>> {
        self.kettle_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.kettles.clone())
    }

    async fn chain_id(&self) -> KettleResult<u64> {
        Ok(self.chain_id)
    }

    async fn pending_nonce(&self, _address: Address) -> KettleResult<u64> {
        Ok(self.nonce)
    }

    async fn gas_price(&self) -> KettleResult<u128> {
        Ok(self.gas_price)
    }

    async fn send_compute_request(
        &self,
        envelope: Bytes,
        confidential_inputs: Bytes,
    ) -> KettleResult<TxHash> {
        let hash = keccak256(&envelope);
        self.submitted.lock().unwrap().push((envelope, confidential_inputs));
        Ok(hash)
    }

    async fn transaction_receipt(&self, _tx_hash: TxHash) -> KettleResult<Option<Receipt>> {
        self.receipt_polls.fetch_add(1, Ordering::SeqCst);
        if !self.receipt_delay.is_zero() {
            tokio::time::sleep(self.receipt_delay).await;
        }
        self.receipts.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}
