use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::predict::Observer;

use super::api::ephemeris as ephemeris_handlers;
use super::api::passes as pass_handlers;
use super::api::polar as polar_handlers;
use super::api::satellites as satellite_handlers;
use super::api::station as station_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::{spawn_refresh_task, AppState};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Station endpoints
        .route("/api/status", get(station_handlers::status))
        .route(
            "/api/config",
            get(station_handlers::get_config).post(station_handlers::update_config),
        )
        // Satellite selection
        .route("/api/satellites", post(satellite_handlers::save_satellites))
        .route("/api/search", get(satellite_handlers::search))
        // Predict endpoints
        .route("/api/passes", get(pass_handlers::list_passes))
        .route("/api/ephemeris", get(ephemeris_handlers::get_ephemeris))
        .route("/api/polar", get(polar_handlers::get_polar))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config, observer: Observer) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();

    let state = AppState::initialize(config, observer).await;
    log::info!(
        "Tracking {} satellites from {}",
        state.tracked().await.len(),
        state.catalog.read().await.source().display()
    );

    let refresh = spawn_refresh_task(state.clone());
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let result = axum::serve(listener, app).await;
    refresh.abort();
    result
}
