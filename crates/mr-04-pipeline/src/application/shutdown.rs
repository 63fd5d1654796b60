//! # Shutdown Signal
//!
//! One-shot, broadcast cancellation for every stage of a run, built on a
//! `watch` channel holding `false` until triggered.

use tokio::sync::watch;

/// Trigger side of the run's cancellation signal.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

/// Observer side of the run's cancellation signal.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// A fresh, untriggered signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Trigger cancellation. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// A new listener.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }
}

impl ShutdownListener {
    /// Whether cancellation has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is triggered (immediately if it already was).
    pub async fn wait(&mut self) {
        // A dropped sender means the run is over.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
