use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::hub::BroadcastHub;
use crate::tracker::{spawn_liveness_monitor, StateStore, TrackerRecord};

use super::api::{health as health_handlers, location as location_handlers};
use super::api_doc::ApiDoc;
use super::config::{AllowedOrigin, Config};
use super::ws;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StateStore>,
    pub hub: BroadcastHub,
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.server.bind.clone();
    let allowed_origin = config
        .server
        .parse_allowed_origin()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let initial = TrackerRecord::initial(
        config.tracker.device_id.clone(),
        config.tracker.latitude,
        config.tracker.longitude,
    );
    let store = Arc::new(StateStore::new(initial));
    let hub = BroadcastHub::new();

    spawn_liveness_monitor(store.clone(), hub.clone());

    let state = AppState { store, hub };

    let app = Router::new()
        .route("/", get(health_handlers::service_info))
        .route(
            "/api/location",
            post(location_handlers::submit_location).get(location_handlers::current_location),
        )
        .route("/api/health", get(health_handlers::health))
        .route("/ws", get(ws::ws_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    log::info!("starting server on {bind_addr}");
    log::info!("waiting for tracker data...");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}

fn cors_layer(allowed_origin: AllowedOrigin) -> CorsLayer {
    match allowed_origin {
        AllowedOrigin::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any),
        AllowedOrigin::Exact(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    }
}
