// src/pool/pool.rs
use super::endpoint::{Endpoint, EndpointHandle, EndpointStatus};
use crate::dialer::Dialer;
use crate::metrics::PoolMetrics;
use chrono::Utc;
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("no endpoint addresses configured")]
    NoAddresses,

    #[error("none of the {attempted} configured endpoints could be dialed")]
    AllDialsFailed { attempted: usize },
}

struct PoolState<C> {
    endpoints: Vec<Endpoint<C>>,
    primary_idx: usize,
    read_idx: usize,
}

impl<C> PoolState<C> {
    fn alive_count(&self) -> usize {
        self.endpoints.iter().filter(|e| e.usable()).count()
    }
}

/// Pool of interchangeable upstream endpoints with per-endpoint liveness.
///
/// Reads are spread round-robin over healthy endpoints; writes stick to a
/// primary that only moves when it dies. The pool never probes health on
/// its own: callers report failures through `mark_dead`, and an optional
/// external component may bring endpoints back through `revive`.
///
/// All steady-state operations are synchronous and in-memory. A single lock
/// covers the whole aggregate so that cursor advancement and primary
/// failover are atomic with the scans that produced them.
pub struct EndpointPool<C> {
    inner: Mutex<PoolState<C>>,
    metrics: Option<Arc<PoolMetrics>>,
}

impl<C: Clone> EndpointPool<C> {
    /// Dial every configured address once and build the pool.
    ///
    /// Addresses are trimmed and blank entries are skipped. A failed dial
    /// leaves that endpoint dead but is not fatal; construction only fails
    /// when no usable address remains or every dial fails.
    pub async fn connect<D>(
        dialer: &D,
        addresses: &[String],
        metrics: Option<Arc<PoolMetrics>>,
    ) -> Result<Self, PoolError>
    where
        D: Dialer<Conn = C> + ?Sized,
    {
        let usable: Vec<&str> = addresses
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();

        if usable.is_empty() {
            return Err(PoolError::NoAddresses);
        }

        let mut endpoints = Vec::with_capacity(usable.len());
        for address in usable {
            match dialer.dial(address).await {
                Ok(connection) => {
                    debug!("dialed endpoint {}", address);
                    endpoints.push(Endpoint::connected(address.to_string(), connection));
                }
                Err(err) => {
                    warn!("failed to dial endpoint {}: {}", address, err);
                    endpoints.push(Endpoint::unreachable(address.to_string(), err.to_string()));
                }
            }
        }

        let alive = endpoints.iter().filter(|e| e.usable()).count();
        if alive == 0 {
            return Err(PoolError::AllDialsFailed {
                attempted: endpoints.len(),
            });
        }

        info!(
            "endpoint pool ready: {}/{} endpoints alive",
            alive,
            endpoints.len()
        );

        if let Some(metrics) = &metrics {
            metrics.update_endpoint_counts(alive, endpoints.len());
            for endpoint in &endpoints {
                metrics.update_endpoint_health(&endpoint.address, endpoint.alive);
            }
        }

        Ok(Self {
            inner: Mutex::new(PoolState {
                endpoints,
                primary_idx: 0,
                read_idx: 0,
            }),
            metrics,
        })
    }

    /// Next healthy endpoint for read traffic, round-robin.
    ///
    /// Scans at most one full rotation starting where the previous call
    /// left off and advances the cursor past the returned endpoint. `None`
    /// means no endpoint in the pool is currently alive; whether that is
    /// fatal is the caller's decision.
    pub fn pick_read(&self) -> Option<EndpointHandle<C>> {
        let mut state = self.state();
        let n = state.endpoints.len();

        for i in 0..n {
            let idx = (state.read_idx + i) % n;
            let endpoint = &state.endpoints[idx];
            if !endpoint.alive {
                continue;
            }
            if let Some(connection) = endpoint.connection.clone() {
                let handle = EndpointHandle::new(endpoint.address.clone(), connection);
                state.read_idx = (idx + 1) % n;
                self.record_pick("read", true);
                return Some(handle);
            }
        }

        debug!("no healthy endpoint available for read");
        self.record_pick("read", false);
        None
    }

    /// Current primary endpoint for write-sensitive traffic.
    ///
    /// Sticky: as long as the current primary is alive it is returned
    /// unchanged. Only when it is dead does the pool scan from the front,
    /// promote the first healthy endpoint, and log the failover. `None`
    /// means no endpoint in the pool is currently alive.
    pub fn pick_primary(&self) -> Option<EndpointHandle<C>> {
        let mut state = self.state();
        let n = state.endpoints.len();

        if state.primary_idx < n {
            let endpoint = &state.endpoints[state.primary_idx];
            if endpoint.alive {
                if let Some(connection) = endpoint.connection.clone() {
                    let handle = EndpointHandle::new(endpoint.address.clone(), connection);
                    self.record_pick("primary", true);
                    return Some(handle);
                }
            }
        }

        let demoted = state
            .endpoints
            .get(state.primary_idx)
            .map(|e| e.address.clone());

        for idx in 0..n {
            let endpoint = &state.endpoints[idx];
            if !endpoint.alive {
                continue;
            }
            if let Some(connection) = endpoint.connection.clone() {
                warn!(
                    "switching primary endpoint from {} to {}",
                    demoted.as_deref().unwrap_or("<none>"),
                    endpoint.address
                );
                let handle = EndpointHandle::new(endpoint.address.clone(), connection);
                state.primary_idx = idx;
                if let Some(metrics) = &self.metrics {
                    metrics.record_failover();
                }
                self.record_pick("primary", true);
                return Some(handle);
            }
        }

        debug!("no healthy endpoint available for primary");
        self.record_pick("primary", false);
        None
    }

    /// Report an endpoint as failed.
    ///
    /// Idempotent: repeated calls re-record the cause but only the first
    /// transition is logged. The stale connection handle is kept (it is
    /// never handed out again while the endpoint is dead). Unknown
    /// addresses are ignored, so callers racing a reconfigured caller-side
    /// list cannot poison the pool.
    pub fn mark_dead(&self, address: &str, cause: impl Display) {
        let mut state = self.state();

        let Some(endpoint) = state.endpoints.iter_mut().find(|e| e.address == address) else {
            return;
        };

        let transitioned = endpoint.alive;
        if transitioned {
            error!("marking endpoint {} dead: {}", address, cause);
            endpoint.alive = false;
            endpoint.last_transition = Some(Utc::now());
        }
        endpoint.last_error = Some(cause.to_string());

        if transitioned {
            if let Some(metrics) = &self.metrics {
                metrics.update_endpoint_health(address, false);
                metrics.record_mark_dead(address);
                metrics.update_endpoint_counts(state.alive_count(), state.endpoints.len());
            }
        }
    }

    /// Install a freshly dialed connection and bring the endpoint back.
    ///
    /// The pool never re-dials on its own; this is the seam an external
    /// revival component (see `crate::revive`) uses after a successful
    /// re-dial. Unknown addresses are ignored.
    pub fn revive(&self, address: &str, connection: C) {
        let mut state = self.state();

        let Some(endpoint) = state.endpoints.iter_mut().find(|e| e.address == address) else {
            return;
        };

        info!("endpoint {} revived", address);
        endpoint.connection = Some(connection);
        endpoint.alive = true;
        endpoint.last_error = None;
        endpoint.last_transition = Some(Utc::now());

        if let Some(metrics) = &self.metrics {
            metrics.update_endpoint_health(address, true);
            metrics.record_revival(address);
            metrics.update_endpoint_counts(state.alive_count(), state.endpoints.len());
        }
    }

    /// Number of endpoints in the pool, dead or alive.
    pub fn len(&self) -> usize {
        self.state().endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn alive_count(&self) -> usize {
        self.state().alive_count()
    }

    /// Addresses of every endpoint currently marked dead.
    pub fn dead_addresses(&self) -> Vec<String> {
        self.state()
            .endpoints
            .iter()
            .filter(|e| !e.alive)
            .map(|e| e.address.clone())
            .collect()
    }

    /// Snapshot of every endpoint's state, in configuration order.
    pub fn status(&self) -> Vec<EndpointStatus> {
        self.state().endpoints.iter().map(|e| e.status()).collect()
    }

    fn state(&self) -> MutexGuard<'_, PoolState<C>> {
        self.inner.lock().expect("endpoint pool lock poisoned")
    }

    fn record_pick(&self, mode: &str, hit: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_pick(mode, hit);
        }
    }
}
