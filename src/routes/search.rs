use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::AnnotatedMatch;
use crate::services::quote_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keywords: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_symbols))
}

pub async fn search_symbols(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<AnnotatedMatch>>, AppError> {
    info!("GET /api/search?keywords={} - Searching symbols", params.keywords);
    let matches = quote_service::search(state.provider.as_ref(), &params.keywords, Utc::now()).await?;
    Ok(Json(matches))
}
