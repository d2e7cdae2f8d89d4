use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::{AppError, DataValidationError};
use crate::external::provider::{MarketDataProvider, OutputSize, ProviderError};
use crate::models::{
    AnnotatedMatch, DisplayRecord, MarketInfo, MarketSessionStatus, RawDailySeries,
    SeriesMetadata, SummaryStats,
};
use crate::services::market_config::{all_markets, market_for_region};
use crate::services::market_session;
use crate::services::search_service::process_search_results;
use crate::services::series_cache::SeriesCache;
use crate::services::time_series_processor::{
    filter_by_date_range, format_for_display, ingest, summarize, ProcessorConfig,
};
use crate::services::validation::{validate_date_range, validate_search_keywords, validate_symbol};

/// Parameters of a daily-series request, as received.
#[derive(Debug, Clone, Default)]
pub struct DailyRequest {
    pub symbol: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub days: Option<usize>,
    pub output_size: OutputSize,
}

/// Everything the dashboard renders for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SeriesMetadata>,
    pub summary: SummaryStats,
    pub records: Vec<DisplayRecord>,
    /// Bars dropped during ingest because their fields could not be read.
    pub dropped: usize,
}

pub async fn search(
    provider: &dyn MarketDataProvider,
    keywords: &str,
    now: DateTime<Utc>,
) -> Result<Vec<AnnotatedMatch>, AppError> {
    let keywords = validate_search_keywords(keywords)?;

    let raw = provider.search_symbols(&keywords).await.map_err(|e| {
        log_provider_error("search", &keywords, &e);
        e
    })?;

    Ok(process_search_results(raw, now))
}

/// Raw payload for `symbol`, from the cache when one is configured and fresh.
pub async fn load_daily_series(
    provider: &dyn MarketDataProvider,
    cache: Option<&SeriesCache>,
    symbol: &str,
    output_size: OutputSize,
) -> Result<Arc<RawDailySeries>, AppError> {
    if let Some(cached) = cache.and_then(|c| c.get(symbol, output_size)) {
        return Ok(cached);
    }

    let payload = provider
        .fetch_daily_series(symbol, output_size)
        .await
        .map_err(|e| {
            log_provider_error("daily series", symbol, &e);
            e
        })?;

    Ok(match cache {
        Some(cache) => cache.insert(symbol, output_size, payload),
        None => Arc::new(payload),
    })
}

/// Fetch, ingest and render the daily series for one symbol.
///
/// The date range is applied first, then `days` keeps the most recent bars of
/// what remains. Derived fields always come from the full series.
pub async fn daily_report(
    provider: &dyn MarketDataProvider,
    cache: Option<&SeriesCache>,
    config: &ProcessorConfig,
    request: &DailyRequest,
) -> Result<DailyReport, AppError> {
    let symbol = validate_symbol(&request.symbol)?;
    let (start, end) = validate_date_range(request.start.as_deref(), request.end.as_deref())?;
    if request.days == Some(0) {
        return Err(DataValidationError::BelowMinimum {
            field: "days",
            value: 0.0,
            min: 1.0,
        }
        .into());
    }

    let raw = load_daily_series(provider, cache, &symbol, request.output_size).await?;

    let report = ingest(&raw, config).map_err(|e| {
        error!("Failed to process daily data for {}: {}", symbol, e);
        e
    })?;

    let mut view = filter_by_date_range(&report.series, start, end);
    if let Some(days) = request.days {
        view = view.latest(days);
    }

    info!(
        "Daily report for {}: {} of {} records",
        symbol,
        view.len(),
        report.series.len()
    );

    Ok(DailyReport {
        symbol,
        meta: report.meta,
        summary: summarize(&view),
        records: format_for_display(&view),
        dropped: report.rejected.len(),
    })
}

pub fn list_markets() -> Vec<MarketInfo> {
    all_markets().iter().map(MarketInfo::from).collect()
}

/// Session status of a configured market. Unknown regions are an error here,
/// unlike search annotations which fall back to the API's own hours.
pub fn market_status(region: &str, now: DateTime<Utc>) -> Result<MarketSessionStatus, AppError> {
    let market = market_for_region(region)
        .ok_or_else(|| AppError::NotFound(format!("no market configured for region '{region}'")))?;
    Ok(market_session::resolve("", "", "", Some(market.code), now))
}

fn log_provider_error(operation: &str, subject: &str, e: &ProviderError) {
    match e {
        ProviderError::RateLimited(_) => warn!("Rate limited during {} for {}", operation, subject),
        _ => error!("Provider {} failed for {}: {}", operation, subject, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lists_every_configured_market() {
        let markets = list_markets();
        assert_eq!(markets.len(), all_markets().len());
        assert!(markets.iter().any(|m| m.code == "US" && m.market_open == "09:30"));
    }

    #[test]
    fn market_status_for_known_and_unknown_regions() {
        // Saturday
        let now = Utc.with_ymd_and_hms(2024, 1, 13, 15, 0, 0).unwrap();
        let status = market_status("Japan", now).unwrap();
        assert_eq!(status.status, crate::models::SessionState::Closed);

        assert!(matches!(market_status("Atlantis", now), Err(AppError::NotFound(_))));
    }
}
