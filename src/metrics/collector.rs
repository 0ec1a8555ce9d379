// src/metrics/collector.rs
use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};
use anyhow::Result;
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<PoolMetrics>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(PoolMetrics::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<PoolMetrics> {
        self.collector.clone()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        buffer
    }
}

pub struct PoolMetrics {
    // Selection metrics
    pub picks_total: IntCounterVec,
    pub failovers_total: IntCounter,

    // Endpoint health metrics
    pub marks_dead_total: IntCounterVec,
    pub revivals_total: IntCounterVec,
    pub endpoint_alive: IntGaugeVec,
    pub alive_endpoints: IntGauge,
    pub total_endpoints: IntGauge,
}

impl PoolMetrics {
    pub fn new(registry: &Registry) -> Result<Self> {
        let picks_total = IntCounterVec::new(
            Opts::new(
                "pool_picks_total",
                "Endpoint selections by mode and outcome",
            ),
            &["mode", "outcome"],
        )?;
        registry.register(Box::new(picks_total.clone()))?;

        let failovers_total = IntCounter::new(
            "pool_failovers_total",
            "Number of primary endpoint failovers",
        )?;
        registry.register(Box::new(failovers_total.clone()))?;

        let marks_dead_total = IntCounterVec::new(
            Opts::new(
                "pool_marks_dead_total",
                "Alive-to-dead transitions per endpoint",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(marks_dead_total.clone()))?;

        let revivals_total = IntCounterVec::new(
            Opts::new("pool_revivals_total", "Endpoint revivals"),
            &["endpoint"],
        )?;
        registry.register(Box::new(revivals_total.clone()))?;

        let endpoint_alive = IntGaugeVec::new(
            Opts::new(
                "pool_endpoint_alive",
                "Endpoint liveness (1=alive, 0=dead)",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(endpoint_alive.clone()))?;

        let alive_endpoints =
            IntGauge::new("pool_alive_endpoints", "Number of alive endpoints")?;
        registry.register(Box::new(alive_endpoints.clone()))?;

        let total_endpoints =
            IntGauge::new("pool_total_endpoints", "Total number of endpoints")?;
        registry.register(Box::new(total_endpoints.clone()))?;

        Ok(Self {
            picks_total,
            failovers_total,
            marks_dead_total,
            revivals_total,
            endpoint_alive,
            alive_endpoints,
            total_endpoints,
        })
    }

    pub fn record_pick(&self, mode: &str, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        self.picks_total.with_label_values(&[mode, outcome]).inc();
    }

    pub fn record_failover(&self) {
        self.failovers_total.inc();
    }

    pub fn record_mark_dead(&self, endpoint: &str) {
        self.marks_dead_total.with_label_values(&[endpoint]).inc();
    }

    pub fn record_revival(&self, endpoint: &str) {
        self.revivals_total.with_label_values(&[endpoint]).inc();
    }

    pub fn update_endpoint_health(&self, endpoint: &str, alive: bool) {
        let value = if alive { 1 } else { 0 };
        self.endpoint_alive.with_label_values(&[endpoint]).set(value);
    }

    pub fn update_endpoint_counts(&self, alive: usize, total: usize) {
        self.alive_endpoints.set(alive as i64);
        self.total_endpoints.set(total as i64);
    }
}
