use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub connected_clients: usize,
    pub last_update: Option<DateTime<Utc>>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Process health and push-channel stats", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connected_clients: state.hub.connected_clients(),
        last_update: state.store.last_update(),
    })
}

/// Service banner on `/`, mainly so a curl against the bare host shows
/// where the actual endpoints live.
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "Real-Time Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "location": "/api/location",
            "post_location": "POST /api/location",
            "push": "/ws"
        }
    }))
}
