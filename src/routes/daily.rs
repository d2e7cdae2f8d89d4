use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::external::provider::OutputSize;
use crate::services::quote_service::{self, DailyReport, DailyRequest};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DailyParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub days: Option<usize>,
    pub output_size: Option<OutputSize>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_daily))
}

pub async fn get_daily(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<DailyParams>,
) -> Result<Json<DailyReport>, AppError> {
    info!("GET /api/daily/{} - Loading daily series", symbol);
    let request = DailyRequest {
        symbol,
        start: params.start,
        end: params.end,
        days: params.days,
        output_size: params.output_size.unwrap_or_default(),
    };
    let report = quote_service::daily_report(
        state.provider.as_ref(),
        state.series_cache.as_ref(),
        &state.processor,
        &request,
    )
    .await?;
    Ok(Json(report))
}
