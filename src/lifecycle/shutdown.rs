//! Shutdown coordination for a startup run.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::lifecycle::signals::TermSignal;

/// Coordinator for termination.
///
/// Provides a broadcast channel that the waiting probe, the running setup
/// step and a supervised server can all subscribe to.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<TermSignal>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> SignalReceiver {
        SignalReceiver {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self, signal: TermSignal) {
        let _ = self.tx.send(signal);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`Shutdown`].
#[derive(Debug)]
pub struct SignalReceiver {
    rx: broadcast::Receiver<TermSignal>,
}

impl SignalReceiver {
    /// Wait for the next termination signal.
    ///
    /// Signals sent faster than they are received collapse into the most
    /// recent one. Returns `None` once every `Shutdown` handle is dropped.
    /// Cancel safe.
    pub async fn recv(&mut self) -> Option<TermSignal> {
        loop {
            match self.rx.recv().await {
                Ok(signal) => return Some(signal),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Coalescing queued termination signals");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
