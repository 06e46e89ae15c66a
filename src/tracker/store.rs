use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::error::ValidationError;
use super::record::{optional_number, required_number, LocationReport, Signal, TrackerRecord, TrackerStatus};

/// Owner of the singleton `TrackerRecord`. All reads and writes go through
/// here; the mutex serializes mutations so a reader never sees a
/// half-applied report and concurrent writers resolve last-writer-wins.
pub struct StateStore {
    inner: Mutex<TrackerRecord>,
}

impl StateStore {
    pub fn new(initial: TrackerRecord) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    /// Snapshot of the current record.
    pub fn read(&self) -> TrackerRecord {
        self.inner.lock().unwrap().clone()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().unwrap().last_update
    }

    /// The single write path for "device reported in". Validates and coerces
    /// the payload before touching the record, so a rejected report leaves
    /// state untouched. A valid report always revives an offline tracker.
    pub fn apply_report(&self, report: LocationReport) -> Result<TrackerRecord, ValidationError> {
        let latitude = required_number(report.latitude.as_ref(), "latitude")?;
        let longitude = required_number(report.longitude.as_ref(), "longitude")?;
        let speed = optional_number(report.speed.as_ref(), "speed")?;
        if let Some(speed) = speed {
            if speed < 0.0 {
                return Err(ValidationError::Negative("speed"));
            }
        }

        let mut record = self.inner.lock().unwrap();
        if let Some(device_id) = report.device_id {
            record.device_id = device_id;
        }
        record.latitude = latitude;
        record.longitude = longitude;
        if let Some(speed) = speed {
            record.speed = speed;
        }
        record.signal = Signal::Strong;
        record.status = TrackerStatus::Live;
        record.last_update = Some(Utc::now());
        Ok(record.clone())
    }

    /// Transition Live -> Offline. Returns `None` when the tracker is
    /// already offline; callers must not broadcast in that case. Position,
    /// speed and `last_update` are left as the device last reported them.
    pub fn mark_offline(&self) -> Option<TrackerRecord> {
        let mut record = self.inner.lock().unwrap();
        if record.status != TrackerStatus::Live {
            return None;
        }
        record.status = TrackerStatus::Offline;
        record.signal = Signal::Weak;
        Some(record.clone())
    }
}
