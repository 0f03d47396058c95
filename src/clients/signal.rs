//! Process-wide server status notifications.
//!
//! Any number of observers may subscribe. Subscribers only see events sent after they
//! subscribed, and sending with nobody listening is fine.

use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// A request is slow or being retried; the backend is probably cold starting
    WakingUp,
    /// A request succeeded
    Ready,
}

#[derive(Debug, Clone)]
pub struct StatusSignals {
    tx: broadcast::Sender<ServerStatus>,
}

impl Default for StatusSignals {
    fn default() -> Self {
        Self::new(16)
    }
}

impl StatusSignals {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerStatus> {
        self.tx.subscribe()
    }

    pub fn emit(&self, status: ServerStatus) {
        // Err only means there are no subscribers
        let delivered = self.tx.send(status).unwrap_or(0);
        debug!("server status {:?} sent to {} subscribers", status, delivered);
    }
}
