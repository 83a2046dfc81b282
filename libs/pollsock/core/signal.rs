use std::sync::Arc;
use tokio::sync::watch;

/// One-shot, idempotent disconnect request shared with the receive loop
///
/// Awaiting `cancelled()` lets the loop race a pending handshake or
/// receive against the request instead of waiting for it to resolve.
#[derive(Debug, Clone)]
pub struct DisconnectSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl DisconnectSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request disconnection; later calls are no-ops
    pub fn cancel(&self) {
        self.tx.send_if_modified(|requested| {
            let changed = !*requested;
            *requested = true;
            changed
        });
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once `cancel` has been called
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            // The sender lives as long as `self`, so this cannot fail
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for DisconnectSignal {
    fn default() -> Self {
        Self::new()
    }
}
