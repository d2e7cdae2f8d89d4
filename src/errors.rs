use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::external::provider::ProviderError;

/// Malformed or out-of-contract input. Always names the field and, where one
/// was received, the offending value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("invalid {field}: expected YYYY-MM-DD, got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("start date ({start}) cannot be after end date ({end})")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid stock symbol '{value}': only letters, numbers, and dots are allowed")]
    InvalidSymbol { value: String },

    #[error("stock symbol too long (max {max} characters): '{value}'")]
    SymbolTooLong { value: String, max: usize },

    #[error("{field} must be a valid number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} cannot be zero")]
    Zero { field: &'static str },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum { field: &'static str, value: f64, min: f64 },

    #[error("{field} must be at most {max}, got {value}")]
    AboveMaximum { field: &'static str, value: f64, max: f64 },

    #[error("high price ({high}) must be the highest of open/high/low/close")]
    HighNotHighest { high: f64 },

    #[error("low price ({low}) must be the lowest of open/high/low/close")]
    LowNotLowest { low: f64 },

    #[error("search keywords too long (max {max} characters), got {len}")]
    KeywordsTooLong { value: String, len: usize, max: usize },

    #[error("search keywords must contain at least one alphanumeric character, got '{value}'")]
    KeywordsNotAlphanumeric { value: String },
}

impl DataValidationError {
    /// Name of the input field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::InvalidDate { field, .. }
            | Self::NotANumber { field, .. }
            | Self::Zero { field }
            | Self::BelowMinimum { field, .. }
            | Self::AboveMaximum { field, .. } => field,
            Self::InvertedDateRange { .. } => "date_range",
            Self::InvalidSymbol { .. } | Self::SymbolTooLong { .. } => "symbol",
            Self::HighNotHighest { .. } => "high",
            Self::LowNotLowest { .. } => "low",
            Self::KeywordsTooLong { .. } | Self::KeywordsNotAlphanumeric { .. } => "keywords",
        }
    }

    /// The received value, rendered as text, when one exists.
    pub fn value(&self) -> Option<String> {
        match self {
            Self::Empty { .. } | Self::Zero { .. } => None,
            Self::InvalidDate { value, .. }
            | Self::InvalidSymbol { value }
            | Self::SymbolTooLong { value, .. }
            | Self::NotANumber { value, .. }
            | Self::KeywordsTooLong { value, .. }
            | Self::KeywordsNotAlphanumeric { value } => Some(value.clone()),
            Self::InvertedDateRange { start, end } => Some(format!("{start}..{end}")),
            Self::BelowMinimum { value, .. } | Self::AboveMaximum { value, .. } => {
                Some(value.to_string())
            }
            Self::HighNotHighest { high } => Some(high.to_string()),
            Self::LowNotLowest { low } => Some(low.to_string()),
        }
    }
}

/// Ingestion-time failures that make further processing meaningless.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataProcessingError {
    #[error("payload has no time series")]
    MissingTimeSeries,

    #[error("time series is empty")]
    EmptyTimeSeries,

    #[error("no valid bars in time series ({rejected} rejected)")]
    NoValidBars { rejected: usize },

    #[error("duplicate entry for date {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("invalid bar for {date}: {source}")]
    InvalidBar {
        date: NaiveDate,
        #[source]
        source: DataValidationError,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] DataValidationError),
    #[error("Processing error: {0}")]
    Processing(#[from] DataProcessingError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::RateLimited(_) => AppError::RateLimited,
            ProviderError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::External(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": err.to_string(),
                    "field": err.field(),
                    "value": err.value(),
                })),
            )
                .into_response(),
            AppError::Processing(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response(),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    headers,
                    Json(json!({ "error": "Rate limited" })),
                )
                    .into_response()
            }
            AppError::External(msg) => {
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_exposes_field_and_value() {
        let err = DataValidationError::NotANumber {
            field: "close",
            value: "abc".to_string(),
        };
        assert_eq!(err.field(), "close");
        assert_eq!(err.value().as_deref(), Some("abc"));
        assert_eq!(err.to_string(), "close must be a valid number, got 'abc'");
    }

    #[test]
    fn ohlc_errors_name_the_price_field() {
        let err = DataValidationError::HighNotHighest { high: 9.5 };
        assert_eq!(err.field(), "high");
        assert_eq!(err.value().as_deref(), Some("9.5"));
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let response = AppError::from(DataValidationError::Empty { field: "symbol" }).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limit_sets_retry_after() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
    }
}
