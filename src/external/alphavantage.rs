use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::AppConfig;
use crate::external::provider::{MarketDataProvider, OutputSize, ProviderError};
use crate::models::{RawDailySeries, RawSymbolMatch};
use crate::services::rate_limiter::RateLimiter;

pub struct AlphaVantageProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
    limiter: RateLimiter,
}

impl AlphaVantageProvider {
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            limiter: RateLimiter::new(1, config.requests_per_minute),
        })
    }

    /// Run a query, retrying throttled and transient failures with linear
    /// backoff (`retry_delay * attempt`).
    async fn query(&self, params: &[(&str, &str)]) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.query_once(params).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_delay * attempt;
                    warn!(
                        "Alpha Vantage request failed ({}), retrying in {:?} (attempt {}/{})",
                        e, delay, attempt, self.max_retries
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    error!("Alpha Vantage request failed: {}", e);
                    return Err(e);
                }
            }
        }
    }

    async fn query_once(&self, params: &[(&str, &str)]) -> Result<String, ProviderError> {
        let _guard = self.limiter.acquire().await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;

        check_status(status)?;
        check_api_messages(&body)?;
        Ok(body)
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(e.to_string())
    }
}

pub(crate) fn check_status(status: StatusCode) -> Result<(), ProviderError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited(format!("HTTP {status}"))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ProviderError::Authentication(format!("HTTP {status}")))
        }
        s if s.is_server_error() => Err(ProviderError::Network(format!("HTTP {s}"))),
        s => Err(ProviderError::BadResponse(format!("HTTP {s}"))),
    }
}

// Alpha Vantage reports most failures with HTTP 200 and one of these keys.
#[derive(Debug, Default, Deserialize)]
struct ApiMessages {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,

    // { "Note": "Thank you for using Alpha Vantage! ... 5 calls per minute ..." }
    #[serde(rename = "Note")]
    note: Option<String>,

    #[serde(rename = "Information")]
    information: Option<String>,
}

pub(crate) fn check_api_messages(body: &str) -> Result<(), ProviderError> {
    let messages: ApiMessages =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    if let Some(msg) = messages.error_message {
        let lower = msg.to_lowercase();
        return Err(if lower.contains("apikey") || lower.contains("api key") {
            ProviderError::Authentication(msg)
        } else if lower.contains("invalid api call") {
            ProviderError::NotFound(msg)
        } else {
            ProviderError::BadResponse(msg)
        });
    }

    if let Some(note) = messages.note {
        return Err(ProviderError::RateLimited(note));
    }

    if let Some(info) = messages.information {
        let lower = info.to_lowercase();
        return Err(if lower.contains("rate limit") || lower.contains("call frequency") {
            ProviderError::RateLimited(info)
        } else if lower.contains("apikey") || lower.contains("api key") {
            ProviderError::Authentication(info)
        } else {
            ProviderError::BadResponse(info)
        });
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<RawSymbolMatch>,
}

pub(crate) fn parse_search(body: &str) -> Result<Vec<RawSymbolMatch>, ProviderError> {
    let resp: SearchResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(resp.best_matches)
}

pub(crate) fn parse_daily(body: &str, symbol: &str) -> Result<RawDailySeries, ProviderError> {
    let series: RawDailySeries =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    match (&series.time_series, &series.meta_data) {
        (Some(_), _) => Ok(series),
        (None, Some(_)) => Err(ProviderError::NotFound(format!("no daily data for {symbol}"))),
        (None, None) => Err(ProviderError::BadResponse(
            "missing \"Time Series (Daily)\" in response".to_string(),
        )),
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    async fn search_symbols(&self, keywords: &str) -> Result<Vec<RawSymbolMatch>, ProviderError> {
        debug!("Alpha Vantage SYMBOL_SEARCH '{}'", keywords);
        let body = self
            .query(&[("function", "SYMBOL_SEARCH"), ("keywords", keywords)])
            .await?;
        parse_search(&body)
    }

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        output_size: OutputSize,
    ) -> Result<RawDailySeries, ProviderError> {
        debug!("Alpha Vantage TIME_SERIES_DAILY {} ({})", symbol, output_size.as_str());
        let body = self
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", output_size.as_str()),
            ])
            .await?;
        parse_daily(&body, symbol)
    }
}
