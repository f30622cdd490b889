use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use super::api::ephemeris::EphemerisResponse;
use super::api::error::ErrorResponse;
use super::api::polar::PolarResponse;
use super::api::station::{
    Location, StationConfigResponse, StatusMessage, StatusResponse, UpdateStationRequest,
};
use crate::predict::{CompassPoint, Pass, SearchResult, SkyPoint};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::station::status,
        super::api::station::get_config,
        super::api::station::update_config,
        super::api::satellites::save_satellites,
        super::api::satellites::search,
        super::api::passes::list_passes,
        super::api::ephemeris::get_ephemeris,
        super::api::polar::get_polar,
    ),
    components(
        schemas(
            StatusResponse,
            Location,
            StationConfigResponse,
            UpdateStationRequest,
            StatusMessage,
            ErrorResponse,
            Pass,
            CompassPoint,
            EphemerisResponse,
            PolarResponse,
            SkyPoint,
            SearchResult,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Sattrack API",
        description = "Satellite pass prediction and ground-track ephemeris",
        version = "0.1.0"
    ),
    tags(
        (name = "station", description = "Ground station settings"),
        (name = "satellites", description = "Tracked satellite selection"),
        (name = "predict", description = "Passes, ground tracks and sky tracks")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
