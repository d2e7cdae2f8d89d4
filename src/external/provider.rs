use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{RawDailySeries, RawSymbolMatch};

/// How much history `TIME_SERIES_DAILY` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest ~100 trading days.
    #[default]
    Compact,
    /// Full history.
    Full,
}

impl OutputSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Whether the request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout | Self::RateLimited(_))
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn search_symbols(&self, keywords: &str) -> Result<Vec<RawSymbolMatch>, ProviderError>;

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        output_size: OutputSize,
    ) -> Result<RawDailySeries, ProviderError>;
}
