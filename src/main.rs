use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use ifinance_backend::app;
use ifinance_backend::config::AppConfig;
use ifinance_backend::external::alphavantage::AlphaVantageProvider;
use ifinance_backend::logging::{init_logging, LoggingConfig};
use ifinance_backend::services::series_cache::SeriesCache;
use ifinance_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let provider = AlphaVantageProvider::new(&config).context("failed to build Alpha Vantage client")?;
    tracing::info!(
        "Using Alpha Vantage at {} ({} requests/min, {} retries)",
        config.base_url,
        config.requests_per_minute,
        config.max_retries
    );

    let series_cache = config.cache_enabled.then(|| {
        tracing::info!("Series cache enabled (ttl {:?})", config.cache_ttl);
        SeriesCache::new(config.cache_ttl)
    });
    if let Some(cache) = &series_cache {
        // Zero TTL is valid config; do not sweep in a tight loop
        let _sweeper = cache.spawn_cleanup(config.cache_ttl.max(Duration::from_secs(1)));
    }

    let state = AppState::new(Arc::new(provider), series_cache, config.processor.clone());
    let app = app::create_app(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("iFinance backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
