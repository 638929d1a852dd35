//! Shared shutdown signal for the actors.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

/// Fires once to stop every actor.
///
/// Cloning shares the signal. Triggering more than once is harmless.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fires the signal. Returns `true` only for the call that fired it.
    pub fn trigger(&self) -> bool {
        let fired = self.tx.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        });
        if fired {
            info!("Shutdown triggered");
        }
        fired
    }

    /// Whether the signal has fired.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Returns a listener that can await the signal.
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }
}

/// Awaits a [`ShutdownSignal`].
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolves once the signal has fired, immediately if it already has.
    pub async fn wait(&mut self) {
        if self.rx.wait_for(|done| *done).await.is_err() {
            debug!("Shutdown signal dropped");
        }
    }
}
