// src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use rpc_endpoint_pool::{
    config, dialer::HttpDialer, metrics::MetricsRegistry, pool::EndpointPool, revive::Reviver,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rpc_endpoint_pool=debug".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "pool.yaml".to_string());

    info!("loading configuration from {}", config_path);
    let config = config::load_config(&config_path).await?;

    let mut dialer = HttpDialer::new(config.dial_timeout());
    if let Some(path) = &config.probe_path {
        dialer = dialer.with_probe_path(path.clone());
    }

    // Dial the pool and report per-endpoint state
    let registry = MetricsRegistry::new()?;
    let pool = Arc::new(
        EndpointPool::connect(&dialer, &config.endpoints, Some(registry.collector())).await?,
    );

    for status in pool.status() {
        let state = if status.alive { "alive" } else { "dead" };
        println!("{:5}  {}", state, status.address);
        if let Some(err) = &status.last_error {
            println!("       last error: {}", err);
        }
    }

    // One revival pass over whatever failed to dial, when enabled
    if config.revive.enabled && pool.alive_count() < pool.len() {
        info!(
            "attempting revival of {} dead endpoints",
            pool.len() - pool.alive_count()
        );
        let reviver = Reviver::new(config.revive.clone(), pool.clone(), dialer);
        reviver.sweep().await;
    }

    println!("{}", String::from_utf8_lossy(&registry.gather()));

    Ok(())
}
