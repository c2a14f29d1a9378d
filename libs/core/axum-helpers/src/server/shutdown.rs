use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Fan-out of a single shutdown event to the server and its cleanup task.
///
/// Clones share the same channel; the first call to [`trigger`](Self::trigger)
/// (or a received OS signal) wakes every waiter.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.tx.borrow()
    }

    /// Begin shutdown; later calls are no-ops.
    pub fn trigger(&self) {
        let changed = self.tx.send_if_modified(|initiated| {
            let first = !*initiated;
            *initiated = true;
            first
        });
        if changed {
            info!("Initiating graceful shutdown");
        }
    }

    /// Resolve once shutdown has been triggered.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|initiated| *initiated).await;
    }

    /// Wait for SIGINT/SIGTERM, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        tokio::select! {
            _ = shutdown_signal() => self.trigger(),
            _ = self.triggered() => {}
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on Ctrl+C or SIGTERM.
///
/// A handler that fails to install is logged and never fires; the other one
/// still does.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C)"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
