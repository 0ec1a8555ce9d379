// src/revive/reviver.rs
use crate::config::ReviveConfig;
use crate::dialer::Dialer;
use crate::pool::EndpointPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Periodically re-dials dead endpoints and revives the ones that answer.
///
/// The pool itself never resurrects an endpoint; this component is the
/// opt-in path back to life. Run it with `start` for a background loop, or
/// drive individual passes with `sweep`.
pub struct Reviver<D: Dialer> {
    config: ReviveConfig,
    pool: Arc<EndpointPool<D::Conn>>,
    dialer: D,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl<D: Dialer> Reviver<D> {
    pub fn new(config: ReviveConfig, pool: Arc<EndpointPool<D::Conn>>, dialer: D) -> Self {
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Self {
            config,
            pool,
            dialer,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub async fn start(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_rx.clone();

        info!(
            "starting endpoint reviver with interval {:?}",
            self.config.interval()
        );

        loop {
            tokio::select! {
                _ = sleep(self.jittered_interval()) => {
                    self.sweep().await;
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("endpoint reviver shutting down");
                        break;
                    }
                }
            }
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// One revival pass: re-dial every dead endpoint concurrently and
    /// revive those that answer.
    pub async fn sweep(&self) {
        let dead = self.pool.dead_addresses();
        if dead.is_empty() {
            debug!("no dead endpoints to revive");
            return;
        }

        let attempts = dead.iter().map(|address| async move {
            match self.dialer.dial(address).await {
                Ok(connection) => {
                    self.pool.revive(address, connection);
                    true
                }
                Err(err) => {
                    debug!("re-dial of {} failed: {}", address, err);
                    false
                }
            }
        });

        let results = futures::future::join_all(attempts).await;
        let revived = results.iter().filter(|ok| **ok).count();

        if revived > 0 {
            info!("revived {}/{} dead endpoints", revived, results.len());
        } else {
            warn!("revival sweep failed for all {} dead endpoints", results.len());
        }
    }

    // Add jitter (0-25% of the base interval) to each pause.
    fn jittered_interval(&self) -> Duration {
        let base = self.config.interval().as_millis() as u64;
        let jitter = (base as f64 * rand::random::<f64>() * 0.25) as u64;
        Duration::from_millis(base + jitter)
    }
}
