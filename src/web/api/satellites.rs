use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::predict::{SatelliteConfig, SearchResult};
use crate::web::api::error::ApiResult;
use crate::web::api::station::StatusMessage;
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::config::Permission;
use crate::web::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Name or catalog id fragment, at least two characters.
    #[serde(default)]
    pub q: String,
}

#[utoipa::path(
    post,
    path = "/api/satellites",
    tag = "satellites",
    request_body(content = Object, description = "Catalog id → display name or settings object; non-numeric keys are kept but not tracked"),
    responses(
        (status = 200, description = "Configuration saved", body = StatusMessage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("api_key" = []))
)]
pub async fn save_satellites(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(satellites): Json<SatelliteConfig>,
) -> ApiResult<Json<StatusMessage>> {
    require_permission(&user, Permission::UpdateSatellites)?;

    // Stored as-is, but never tracked.
    for key in satellites.ignored_keys() {
        log::warn!("Ignoring non-numeric satellite key {:?}", key);
    }

    satellites.save(&state.config.satellites_file)?;
    log::info!(
        "{} saved {} tracked satellites",
        user.name,
        satellites.tracked_ids().len()
    );

    *state.satellite_config.write().await = satellites;
    state.retrack().await;
    state.refresh_ephemeris().await;

    Ok(Json(StatusMessage::new("saved")))
}

#[utoipa::path(
    get,
    path = "/api/search",
    tag = "satellites",
    params(SearchQuery),
    responses(
        (status = 200, description = "Up to 20 catalog matches", body = Vec<SearchResult>)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let tracked = state.satellite_config.read().await.tracked_ids();
    let catalog = state.catalog.read().await;
    Json(catalog.search(&query.q, &tracked))
}
