//! Cancellation coordination.

use tokio::sync::broadcast;

/// Broadcasts a single stop signal to every in-flight wait.
///
/// Each [`crate::blockchain::ReceiptPoller`] holds its own receiver, so one
/// trigger stops all of them.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. A no-op when nothing is waiting.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of waits still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
