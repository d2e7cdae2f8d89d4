use std::sync::Arc;

use crate::external::provider::MarketDataProvider;
use crate::services::series_cache::SeriesCache;
use crate::services::time_series_processor::ProcessorConfig;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MarketDataProvider>,
    /// `None` when `CACHE_ENABLED` is off.
    pub series_cache: Option<SeriesCache>,
    pub processor: Arc<ProcessorConfig>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        series_cache: Option<SeriesCache>,
        processor: ProcessorConfig,
    ) -> Self {
        Self {
            provider,
            series_cache,
            processor: Arc::new(processor),
        }
    }
}
