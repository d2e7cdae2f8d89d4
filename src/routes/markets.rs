use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::models::{MarketInfo, MarketSessionStatus};
use crate::services::quote_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_markets))
        .route("/:region/status", get(get_market_status))
}

pub async fn list_markets() -> Json<Vec<MarketInfo>> {
    info!("GET /api/markets - Listing configured markets");
    Json(quote_service::list_markets())
}

pub async fn get_market_status(
    Path(region): Path<String>,
) -> Result<Json<MarketSessionStatus>, AppError> {
    info!("GET /api/markets/{}/status - Resolving session status", region);
    let status = quote_service::market_status(&region, Utc::now())?;
    Ok(Json(status))
}
