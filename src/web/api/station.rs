use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::predict::{Observer, SatelliteConfig};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::config::Permission;
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub server_time: DateTime<Utc>,
    pub location: Location,
    pub tracking_count: usize,
    pub min_elevation: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StationConfigResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub name: String,
    pub min_elevation: f64,
    #[schema(value_type = Object)]
    pub satellites: SatelliteConfig,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Metres above the ellipsoid.
    pub altitude: Option<f64>,
    pub min_elevation: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessage {
    pub status: String,
}

impl StatusMessage {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/status",
    tag = "station",
    responses(
        (status = 200, description = "Server and station status", body = StatusResponse)
    )
)]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let tracking_count = state.tracked().await.len();
    let station = state.station.read().await;

    Json(StatusResponse {
        server_time: Utc::now(),
        location: Location {
            lat: station.observer.latitude_deg,
            lon: station.observer.longitude_deg,
            name: station.name.clone(),
        },
        tracking_count,
        min_elevation: station.min_elevation,
    })
}

#[utoipa::path(
    get,
    path = "/api/config",
    tag = "station",
    responses(
        (status = 200, description = "Station settings and tracked satellites", body = StationConfigResponse)
    )
)]
pub async fn get_config(State(state): State<AppState>) -> Json<StationConfigResponse> {
    let satellites = state.satellite_config.read().await.clone();
    let station = state.station.read().await;

    Json(StationConfigResponse {
        latitude: station.observer.latitude_deg,
        longitude: station.observer.longitude_deg,
        altitude: station.observer.elevation_m,
        name: station.name.clone(),
        min_elevation: station.min_elevation,
        satellites,
    })
}

#[utoipa::path(
    post,
    path = "/api/config",
    tag = "station",
    request_body = UpdateStationRequest,
    responses(
        (status = 200, description = "Station updated", body = StatusMessage),
        (status = 400, description = "Value out of range", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("api_key" = []))
)]
pub async fn update_config(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateStationRequest>,
) -> ApiResult<Json<StatusMessage>> {
    require_permission(&user, Permission::UpdateConfig)?;

    let mut station = state.station.write().await;
    let (observer, min_elevation) = apply_update(&station.observer, station.min_elevation, &request)
        .map_err(ApiError::Validation)?;
    station.observer = observer;
    station.min_elevation = min_elevation;

    log::info!(
        "Station updated by {}: {:.4}, {:.4}, min elevation {}",
        user.name,
        observer.latitude_deg,
        observer.longitude_deg,
        min_elevation
    );

    Ok(Json(StatusMessage::new("updated")))
}

/// Validates the whole request before anything is replaced.
fn apply_update(
    current: &Observer,
    min_elevation: f64,
    request: &UpdateStationRequest,
) -> Result<(Observer, f64), String> {
    let latitude = request.latitude.unwrap_or(current.latitude_deg);
    let longitude = request.longitude.unwrap_or(current.longitude_deg);
    let altitude = request.altitude.unwrap_or(current.elevation_m);
    let min_elevation = request.min_elevation.unwrap_or(min_elevation);

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {} out of range", latitude));
    }
    if !(-180.0..=360.0).contains(&longitude) {
        return Err(format!("longitude {} out of range", longitude));
    }
    if !altitude.is_finite() {
        return Err("altitude must be finite".to_string());
    }
    if !(0.0..=90.0).contains(&min_elevation) {
        return Err(format!("min_elevation {} out of range", min_elevation));
    }

    Ok((Observer::new(latitude, longitude, altitude), min_elevation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_keeps_other_fields() {
        let current = Observer::new(48.4, 8.75, 445.0);
        let request = UpdateStationRequest {
            min_elevation: Some(5.0),
            ..Default::default()
        };
        let (observer, min_el) = apply_update(&current, 10.0, &request).unwrap();
        assert_eq!(observer, current);
        assert_eq!(min_el, 5.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let current = Observer::default();
        let request = UpdateStationRequest {
            latitude: Some(91.0),
            ..Default::default()
        };
        assert!(apply_update(&current, 10.0, &request).is_err());

        let request = UpdateStationRequest {
            min_elevation: Some(-1.0),
            ..Default::default()
        };
        assert!(apply_update(&current, 10.0, &request).is_err());
    }
}
