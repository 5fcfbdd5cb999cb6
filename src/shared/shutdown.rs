//! Graceful shutdown handling
//!
//! Provides shutdown signal coordination for the server tasks.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

/// Shutdown signal that can be cloned and shared across tasks
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn trigger(&self) {
        if !self.sender.send_replace(true) {
            info!("Shutdown signal triggered");
        }
    }

    /// Resolves once triggered, immediately if that already happened.
    pub async fn wait(&self) {
        let mut rx = self.sender.subscribe();
        // Only fails when the sender is gone, which `self` prevents
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listen for OS shutdown signals (SIGTERM, SIGINT)
pub async fn listen_for_shutdown_signals(shutdown: ShutdownSignal) {
    #[cfg(unix)]
    let received = {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM signal");
                        true
                    }
                    result = tokio::signal::ctrl_c() => ctrl_c_received(result),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler, listening for Ctrl+C only");
                ctrl_c_received(tokio::signal::ctrl_c().await)
            }
        }
    };

    #[cfg(not(unix))]
    let received = ctrl_c_received(tokio::signal::ctrl_c().await);

    if received {
        shutdown.trigger();
    }
}

fn ctrl_c_received(result: std::io::Result<()>) -> bool {
    match result {
        Ok(()) => {
            info!("Received SIGINT signal (Ctrl+C)");
            true
        }
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            false
        }
    }
}
