use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::predict::{check_window_hours, predict_passes, Pass};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::api::parse_time;
use crate::web::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PassesQuery {
    /// Window start (RFC 3339); defaults to now.
    pub time: Option<String>,
    /// Window length in hours; defaults to the configured window.
    pub hours: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/passes",
    tag = "predict",
    params(PassesQuery),
    responses(
        (status = 200, description = "Passes sorted by start time", body = Vec<Pass>),
        (status = 400, description = "Invalid parameters", body = ErrorResponse)
    )
)]
pub async fn list_passes(
    State(state): State<AppState>,
    Query(query): Query<PassesQuery>,
) -> ApiResult<Json<Vec<Pass>>> {
    let start = match query.time.as_deref() {
        Some(t) => parse_time(t).map_err(ApiError::Validation)?,
        None => Utc::now(),
    };

    let hours = check_window_hours(query.hours.unwrap_or(state.config.predict.window_hours))
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let observer = state.observer().await;
    let satellites = state.tracked().await;

    let passes = tokio::task::spawn_blocking(move || {
        predict_passes(satellites.as_slice(), &observer, start, hours)
    })
    .await?;

    log::info!(
        "Predicted {} passes from {} over {} hours",
        passes.len(),
        start.to_rfc3339(),
        hours
    );

    Ok(Json(passes))
}
