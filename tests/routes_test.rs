/// HTTP surface tests: the assembled router driven in-process with
/// `tower::ServiceExt::oneshot`, backed by a canned provider.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ifinance_backend::app::create_app;
use ifinance_backend::external::provider::{MarketDataProvider, OutputSize, ProviderError};
use ifinance_backend::models::{RawDailySeries, RawSymbolMatch};
use ifinance_backend::services::time_series_processor::ProcessorConfig;
use ifinance_backend::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

struct CannedProvider;

#[async_trait]
impl MarketDataProvider for CannedProvider {
    async fn search_symbols(&self, keywords: &str) -> Result<Vec<RawSymbolMatch>, ProviderError> {
        if keywords == "throttle" {
            return Err(ProviderError::RateLimited("5 calls per minute".to_string()));
        }
        Ok(vec![RawSymbolMatch {
            symbol: "IBM".to_string(),
            name: "International Business Machines".to_string(),
            region: "United States".to_string(),
            currency: "USD".to_string(),
            match_score: "1.0000".to_string(),
            ..RawSymbolMatch::default()
        }])
    }

    async fn fetch_daily_series(
        &self,
        _symbol: &str,
        _output_size: OutputSize,
    ) -> Result<RawDailySeries, ProviderError> {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-03": {"1. open": "10", "2. high": "11", "3. low": "9", "4. close": "10.5", "5. volume": "1500"},
            "2024-01-02": {"1. open": "9", "2. high": "10", "3. low": "8", "4. close": "9.5", "5. volume": "2500"},
            "2024-01-01": {"1. open": "9", "2. high": "9.5", "3. low": "8.5", "4. close": "9", "5. volume": "1000"}
        }}"#;
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

fn app() -> Router {
    let state = AppState::new(Arc::new(CannedProvider), None, ProcessorConfig::default());
    create_app(state)
}

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn health_check() {
    let (status, body) = get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "ifinance-backend");
    assert_eq!(body["cache_enabled"], false);
}

#[tokio::test]
async fn daily_series_endpoint() {
    let (status, body) = get_json("/api/daily/ibm?days=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "IBM");
    assert_eq!(body["records"].as_array().unwrap().len(), 2);
    assert_eq!(body["records"][0]["date"], "2024-01-03");
    assert_eq!(body["records"][0]["change"], "+1.00");
    assert_eq!(body["summary"]["total_records"], 2);
}

#[tokio::test]
async fn daily_series_rejects_bad_dates() {
    let (status, body) = get_json("/api/daily/IBM?start=2024-1-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "start_date");
    assert_eq!(body["value"], "2024-1-01");
}

#[tokio::test]
async fn search_endpoint() {
    let (status, body) = get_json("/api/search?keywords=ibm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["symbol"], "IBM");
    assert_eq!(body[0]["display_label"], "IBM - International Business Machines");
    assert!(body[0]["market_status"]["status"].is_string());

    let (status, _) = get_json("/api/search?keywords=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json("/api/search?keywords=throttle").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn markets_endpoints() {
    let (status, body) = get_json("/api/markets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (status, body) = get_json("/api/markets/Hong%20Kong/status").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["status_text"].as_str().unwrap().starts_with("Hong Kong Market"));

    let (status, _) = get_json("/api/markets/Atlantis/status").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
