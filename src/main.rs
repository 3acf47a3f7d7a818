//! TTL LRU Cache - demo driver
//!
//! Fills a cache with entries carrying distinct TTLs and reports how size,
//! memory and statistics evolve as pruning and expiry kick in.

use std::env;
use std::time::Duration;

use anyhow::Context;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_lru_cache::{Cache, CacheConfig};

/// Demo parameters.
///
/// # Environment Variables
/// - `DEMO_ITEMS` - Entries to write (default: 10000)
/// - `DEMO_TTL_MS` - Base TTL in milliseconds (default: 200)
/// - `DEMO_MAX_ITEMS` - Item ceiling (default: 5000)
/// - `DEMO_MAX_MEMORY_MB` - Memory ceiling in megabytes (default: unbounded)
#[derive(Debug, Clone)]
struct DemoOptions {
    items: u64,
    ttl_ms: u64,
    max_items: usize,
    max_memory_mb: Option<f64>,
}

impl DemoOptions {
    fn from_env() -> Self {
        Self {
            items: env::var("DEMO_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            ttl_ms: env::var("DEMO_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
            max_items: env::var("DEMO_MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            max_memory_mb: env::var("DEMO_MAX_MEMORY_MB")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    fn config(&self) -> CacheConfig {
        let config = CacheConfig::new().max_items(self.max_items);
        match self.max_memory_mb {
            Some(mb) => config.max_memory_in_mb(mb),
            None => config,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_lru_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = DemoOptions::from_env();
    info!("Demo options: {:?}", options);

    LocalSet::new().run_until(run(options)).await
}

async fn run(options: DemoOptions) -> anyhow::Result<()> {
    let cache: Cache<String, String> =
        Cache::new(options.config()).context("invalid demo configuration")?;

    for i in 0..options.items {
        let ttl = Duration::from_millis(options.ttl_ms + i % 1_000);
        cache.set_with_ttl(format!("key:{}", i), format!("value-{}", i), ttl)?;
    }
    report("after writes", &cache);

    // Let deferred registration and pruning run
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    report("after pruning", &cache);

    tokio::time::sleep(Duration::from_millis(options.ttl_ms + 1_000)).await;
    report("after expiry", &cache);

    Ok(())
}

fn report(stage: &str, cache: &Cache<String, String>) {
    let memory = cache.memory();
    let stats = cache.stats();
    info!(
        "{}: size={}, memory={:.3}MB (max {:?}), evictions={}, expirations={}",
        stage,
        cache.size(),
        memory.current,
        memory.max,
        stats.evictions,
        stats.expirations
    );
}
