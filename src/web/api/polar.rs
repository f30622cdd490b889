use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::predict::{sky_track, SkyPoint};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

/// Longest sky track a single request may sample.
const MAX_SPAN_HOURS: i64 = 24;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PolarQuery {
    pub sat_id: Option<u32>,
    /// Unix milliseconds.
    pub start: Option<f64>,
    /// Unix milliseconds.
    pub end: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PolarResponse {
    pub sat_name: String,
    pub points: Vec<SkyPoint>,
}

#[utoipa::path(
    get,
    path = "/api/polar",
    tag = "predict",
    params(PolarQuery),
    responses(
        (status = 200, description = "Azimuth/elevation above the horizon every 10 s", body = PolarResponse),
        (status = 400, description = "Missing or invalid parameters", body = ErrorResponse),
        (status = 404, description = "Satellite not tracked", body = ErrorResponse)
    )
)]
pub async fn get_polar(
    State(state): State<AppState>,
    Query(query): Query<PolarQuery>,
) -> ApiResult<Json<PolarResponse>> {
    let (Some(sat_id), Some(start_ms), Some(end_ms)) = (query.sat_id, query.start, query.end) else {
        return Err(ApiError::Validation("Missing parameters".into()));
    };

    let start = from_unix_ms(start_ms)?;
    let end = from_unix_ms(end_ms)?;
    if end - start > chrono::Duration::hours(MAX_SPAN_HOURS) {
        return Err(ApiError::Validation(format!(
            "window longer than {} hours",
            MAX_SPAN_HOURS
        )));
    }

    let observer = state.observer().await;
    let satellites = state.tracked().await;
    if !satellites.iter().any(|s| s.norad_id == sat_id) {
        return Err(ApiError::NotFound("satellite_not_found"));
    }

    let response = tokio::task::spawn_blocking(move || {
        satellites
            .iter()
            .find(|s| s.norad_id == sat_id)
            .map(|sat| PolarResponse {
                sat_name: sat.name.clone(),
                points: sky_track(sat, &observer, start, end),
            })
    })
    .await?
    .ok_or(ApiError::NotFound("satellite_not_found"))?;

    Ok(Json(response))
}

fn from_unix_ms(ms: f64) -> ApiResult<DateTime<Utc>> {
    if !ms.is_finite() {
        return Err(ApiError::Validation("invalid timestamp".into()));
    }
    DateTime::from_timestamp_millis(ms as i64)
        .ok_or_else(|| ApiError::Validation("timestamp out of range".into()))
}
