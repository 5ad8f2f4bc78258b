//! Ring Cache workload runner
//!
//! Drives a shared cache with a random fetch workload and prints a JSON report.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ring_cache::workload::run_workload;
use ring_cache::{CacheConfig, SharedRingCache, WorkloadConfig};

/// Main entry point for the workload runner.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load cache and workload configuration from environment variables
/// 3. Create the shared cache
/// 4. Run the workload and print the report to stdout
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ring_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cache_config = CacheConfig::from_env();
    let workload_config = WorkloadConfig::from_env();
    info!(
        "Configuration loaded: capacity={:?}, target_hit_rate={:?}, elements={}, operations={}, workers={}",
        cache_config.capacity,
        cache_config.target_hit_rate,
        workload_config.elements,
        workload_config.operations,
        workload_config.workers
    );

    let cache = SharedRingCache::from_config(cache_config).context("invalid cache configuration")?;

    let report = run_workload(&cache, &workload_config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
