//! Shutdown coordination for background servers.

use tokio::sync::broadcast;

/// One-shot stop signal fanned out to background servers.
#[derive(Debug)]
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

    /// Ask subscribers to stop.
    ///
    /// The simulated endpoint stops accepting connections on this signal and
    /// lets in-flight responses finish; `RunningEndpoint::shutdown` aborts it
    /// if they outlast the grace period. A no-op when nobody is subscribed.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
