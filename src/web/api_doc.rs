use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::health::HealthResponse;
use super::api::location::SubmitResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::location::submit_location,
        super::api::location::current_location,
        super::api::health::health,
    ),
    components(
        schemas(
            crate::tracker::TrackerRecord,
            crate::tracker::LocationReport,
            crate::tracker::Signal,
            crate::tracker::TrackerStatus,
            SubmitResponse,
            HealthResponse,
            ErrorResponse,
        )
    ),
    info(
        title = "Track Relay API",
        description = "Real-time GPS tracker relay: device reports in, dashboards watch live",
        version = "0.1.0"
    ),
    tags(
        (name = "tracker", description = "Location ingest and current state"),
        (name = "health", description = "Process health")
    )
)]
pub struct ApiDoc;
