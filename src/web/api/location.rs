use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::tracker::{LocationReport, TrackerRecord};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
}

#[utoipa::path(
    post,
    path = "/api/location",
    request_body = LocationReport,
    responses(
        (status = 200, description = "Report applied and broadcast", body = SubmitResponse),
        (status = 400, description = "Missing or malformed latitude/longitude", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn submit_location(
    State(state): State<AppState>,
    Json(report): Json<LocationReport>,
) -> ApiResult<Json<SubmitResponse>> {
    // Store first, then broadcast; a publish must never precede the update
    // it announces.
    let record = state.store.apply_report(report)?;
    log::info!(
        "location update: {}, {} | speed: {} km/h",
        record.latitude,
        record.longitude,
        record.speed
    );
    state.hub.publish(record);

    Ok(Json(SubmitResponse {
        success: true,
        message: "Location updated",
    }))
}

#[utoipa::path(
    get,
    path = "/api/location",
    responses(
        (status = 200, description = "Current tracker record", body = TrackerRecord)
    ),
    tag = "tracker"
)]
pub async fn current_location(State(state): State<AppState>) -> Json<TrackerRecord> {
    Json(state.store.read())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::BroadcastHub;
    use crate::tracker::{FlexValue, StateStore, TrackerStatus};
    use crate::web::api::error::ApiError;
    use std::sync::Arc;
    use tokio::sync::broadcast::error::TryRecvError;

    fn app_state() -> AppState {
        AppState {
            store: Arc::new(StateStore::new(TrackerRecord::initial(
                "Train-102".into(),
                23.8103,
                90.4125,
            ))),
            hub: BroadcastHub::new(),
        }
    }

    #[tokio::test]
    async fn valid_report_is_applied_and_broadcast() {
        let state = app_state();
        let mut sub = state.hub.join();

        let response = submit_location(
            State(state.clone()),
            Json(LocationReport {
                latitude: Some(FlexValue::Number(23.81)),
                longitude: Some(FlexValue::Text("90.41".into())),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert!(response.0.success);
        let broadcast = sub.try_recv().unwrap();
        assert_eq!(broadcast.status, TrackerStatus::Live);
        assert_eq!(broadcast.latitude, 23.81);
        assert_eq!(broadcast.longitude, 90.41);
        assert_eq!(state.store.read(), broadcast);
    }

    #[tokio::test]
    async fn rejected_report_neither_mutates_nor_broadcasts() {
        let state = app_state();
        let mut sub = state.hub.join();
        let before = state.store.read();

        let result = submit_location(
            State(state.clone()),
            Json(LocationReport {
                latitude: Some(FlexValue::Number(23.81)),
                ..Default::default()
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert_eq!(state.store.read(), before);
        assert_eq!(sub.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn current_location_reflects_the_store() {
        let state = app_state();
        let record = current_location(State(state.clone())).await;
        assert_eq!(record.0, state.store.read());
    }
}
