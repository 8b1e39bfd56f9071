//! Receipt polling with a hard deadline.
//!
//! ```text
//! Waiting ──receipt──▶ Found
//!    │ ├──rpc error──▶ Failed
//!    │ └──cancel────▶ Cancelled
//!    └────deadline──▶ TimedOut
//! ```
//!
//! The first query goes out immediately, then one per interval. "Not found"
//! keeps the poller waiting; any other error ends it. When the deadline and a
//! poll tick are both due, the deadline wins. A slow query never pushes the
//! outcome past the deadline.

use alloy::primitives::TxHash;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

use crate::blockchain::client::KettleRpc;
use crate::blockchain::types::{KettleError, KettleResult, Receipt};

/// Default deadline for a receipt to show up.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default delay between receipt queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Waits for a transaction receipt.
pub struct ReceiptPoller<'a, R: ?Sized> {
    rpc: &'a R,
    timeout: Duration,
    interval: Duration,
    cancel: Option<broadcast::Receiver<()>>,
}

impl<'a, R> ReceiptPoller<'a, R>
where
    R: KettleRpc + ?Sized,
{
    pub fn new(rpc: &'a R) -> Self {
        Self {
            rpc,
            timeout: DEFAULT_RECEIPT_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
            cancel: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop waiting when a message arrives (or the sender is dropped).
    pub fn cancel_on(mut self, cancel: broadcast::Receiver<()>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Poll until the receipt is found, the deadline passes or polling is cancelled.
    ///
    /// The deadline and the cancel signal also interrupt a query in flight.
    pub async fn wait(mut self, tx_hash: TxHash) -> KettleResult<Receipt> {
        let started = Instant::now();
        let timeout = self.timeout;
        let deadline = sleep(timeout);
        tokio::pin!(deadline);

        let rpc = self.rpc;
        let mut cancel = self.cancel.take();
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let attempts = AtomicU32::new(0);
        let polling = async {
            loop {
                ticker.tick().await;
                let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
                metrics::counter!("kettle_receipt_polls_total").increment(1);

                match rpc.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) => {
                        tracing::trace!(tx_hash = %tx_hash, attempt, "Transaction pending");
                    }
                    Err(e) => {
                        tracing::error!(tx_hash = %tx_hash, attempt, error = %e, "Receipt query failed");
                        return Err(e);
                    }
                }
            }
        };
        tokio::pin!(polling);

        let result = tokio::select! {
            biased;
            _ = &mut deadline => {
                tracing::warn!(
                    tx_hash = %tx_hash,
                    attempts = attempts.load(Ordering::Relaxed),
                    "Gave up waiting for receipt"
                );
                Err(KettleError::ReceiptTimeout {
                    tx_hash,
                    waited: timeout,
                })
            }
            _ = cancelled(&mut cancel) => {
                tracing::info!(
                    tx_hash = %tx_hash,
                    attempts = attempts.load(Ordering::Relaxed),
                    "Receipt wait cancelled"
                );
                Err(KettleError::Cancelled(tx_hash))
            }
            result = &mut polling => result,
        };

        if let Ok(receipt) = &result {
            let waited = started.elapsed();
            metrics::histogram!("kettle_receipt_wait_seconds").record(waited.as_secs_f64());
            tracing::info!(
                tx_hash = %tx_hash,
                attempts = attempts.load(Ordering::Relaxed),
                block_number = ?receipt.block_number(),
                success = receipt.succeeded(),
                "Receipt found"
            );
        }
        result
    }
}

async fn cancelled(cancel: &mut Option<broadcast::Receiver<()>>) {
    match cancel {
        // Lagged or closed both count as a signal
        Some(rx) => {
            let _ = rx.recv().await;
        }
        None => std::future::pending().await,
    }
}
