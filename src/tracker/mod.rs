mod error;
mod monitor;
mod record;
mod store;

pub use error::ValidationError;
pub use monitor::{spawn_liveness_monitor, CHECK_INTERVAL, STALENESS_SECS};
pub use record::{FlexValue, LocationReport, Signal, TrackerRecord, TrackerStatus};
pub use store::StateStore;
