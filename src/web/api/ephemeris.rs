use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::predict::{generate_ephemeris, Ephemeris, SatelliteConfig};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::api::parse_time;
use crate::web::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct EphemerisQuery {
    /// Window center (RFC 3339); the cached ephemeris is returned when absent.
    pub center_time: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EphemerisResponse {
    pub center_time: DateTime<Utc>,
    /// Catalog id → `[[unix_ts, lat, lon, alt_km], ...]`
    #[schema(value_type = Object)]
    pub ephemeris: Arc<Ephemeris>,
    #[schema(value_type = Object)]
    pub satellites: SatelliteConfig,
    pub min_elevation: f64,
}

#[utoipa::path(
    get,
    path = "/api/ephemeris",
    tag = "predict",
    params(EphemerisQuery),
    responses(
        (status = 200, description = "Ground tracks for client-side interpolation", body = EphemerisResponse),
        (status = 400, description = "Invalid center time", body = ErrorResponse)
    )
)]
pub async fn get_ephemeris(
    State(state): State<AppState>,
    Query(query): Query<EphemerisQuery>,
) -> ApiResult<Json<EphemerisResponse>> {
    let (center_time, ephemeris) = match query.center_time.as_deref() {
        Some(t) => {
            let center = parse_time(t).map_err(ApiError::Validation)?;
            let satellites = state.tracked().await;
            let hours_radius = state.config.ephemeris.hours_radius;
            let step_seconds = state.config.ephemeris.step_seconds;
            let ephemeris = tokio::task::spawn_blocking(move || {
                generate_ephemeris(satellites.as_slice(), center, hours_radius, step_seconds)
            })
            .await?;
            (center, Arc::new(ephemeris))
        }
        None => {
            if state.ephemeris.read().await.is_none() {
                state.refresh_ephemeris().await;
            }
            let cached = state.ephemeris.read().await.clone().ok_or_else(|| {
                ApiError::Internal("ephemeris cache unavailable".to_string())
            })?;
            (cached.center_time, cached.ephemeris)
        }
    };

    let satellites = state.satellite_config.read().await.clone();
    let min_elevation = state.station.read().await.min_elevation;

    Ok(Json(EphemerisResponse {
        center_time,
        ephemeris,
        satellites,
        min_elevation,
    }))
}
