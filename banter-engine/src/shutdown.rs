use tokio::sync::watch;

/// Create a linked shutdown handle/signal pair.
///
/// The binary triggers the handle from a Ctrl-C task; the engine polls the
/// signal at loop boundaries and selects on it during waits, so a shutdown
/// aborts the current sleep promptly and falls through to persistence.
pub fn channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, ShutdownSignal { rx })
}

#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        // Receivers may already be gone during teardown.
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is triggered. Never resolves if the handle is
    /// dropped without triggering, which makes it safe to `select!` against.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_resolves_waiters() {
        let (handle, signal) = channel();
        assert!(!signal.is_triggered());

        handle.trigger();
        assert!(signal.is_triggered());
        // Must resolve immediately once triggered.
        tokio::time::timeout(Duration::from_secs(1), signal.triggered())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_untriggered_signal_pends() {
        let (handle, signal) = channel();
        drop(handle);
        let result =
            tokio::time::timeout(Duration::from_secs(60), signal.triggered()).await;
        assert!(result.is_err());
        assert!(!signal.is_triggered());
    }
}
