use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Signal {
    Strong,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrackerStatus {
    Live,
    Offline,
}

/// The single live snapshot of the tracked device. One instance exists per
/// process, owned by `StateStore`; everything else sees clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackerRecord {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub signal: Signal,
    pub status: TrackerStatus,
    pub last_update: Option<DateTime<Utc>>,
}

impl TrackerRecord {
    /// Seed record at process start: offline, never reported.
    pub fn initial(device_id: String, latitude: f64, longitude: f64) -> Self {
        Self {
            device_id,
            latitude,
            longitude,
            speed: 0.0,
            signal: Signal::Strong,
            status: TrackerStatus::Offline,
            last_update: None,
        }
    }
}

/// A numeric payload field as devices actually send it: either a JSON number
/// or a numeric string. Anything else fails deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlexValue {
    Number(f64),
    Text(String),
}

impl FlexValue {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FlexValue::Number(n) => *n,
            FlexValue::Text(s) => s.trim().parse().ok()?,
        };
        // "NaN" and "inf" parse as f64 but are not positions or speeds.
        value.is_finite().then_some(value)
    }
}

/// One ingest payload from the device. `latitude` and `longitude` are
/// required but modeled as options so the store can reject their absence
/// with a proper validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub device_id: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub latitude: Option<FlexValue>,
    #[schema(value_type = Option<f64>)]
    pub longitude: Option<FlexValue>,
    #[schema(value_type = Option<f64>)]
    pub speed: Option<FlexValue>,
}

pub(super) fn required_number(
    value: Option<&FlexValue>,
    field: &'static str,
) -> Result<f64, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    value.as_f64().ok_or(ValidationError::NotNumeric(field))
}

pub(super) fn optional_number(
    value: Option<&FlexValue>,
    field: &'static str,
) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) => v
            .as_f64()
            .ok_or(ValidationError::NotNumeric(field))
            .map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn flex_value_accepts_numbers_and_numeric_strings() {
        let report: LocationReport =
            serde_json::from_str(r#"{"latitude": 23.81, "longitude": "90.41", "speed": "12.5"}"#)
                .unwrap();
        assert_eq!(report.latitude.unwrap().as_f64(), Some(23.81));
        assert_eq!(report.longitude.unwrap().as_f64(), Some(90.41));
        assert_eq!(report.speed.unwrap().as_f64(), Some(12.5));
    }

    #[test]
    fn flex_value_rejects_garbage_text() {
        let report: LocationReport =
            serde_json::from_str(r#"{"latitude": "north-ish", "longitude": 90.41}"#).unwrap();
        assert_eq!(report.latitude.unwrap().as_f64(), None);
    }

    #[test]
    fn flex_value_rejects_non_finite_numbers() {
        for text in ["NaN", "nan", "inf", "-inf", "infinity"] {
            assert_eq!(FlexValue::Text(text.into()).as_f64(), None, "{text}");
        }
        assert_eq!(FlexValue::Number(f64::NAN).as_f64(), None);
        assert_eq!(FlexValue::Number(f64::INFINITY).as_f64(), None);
    }

    #[test]
    fn record_serializes_with_wire_casing() {
        let mut record = TrackerRecord::initial("Train-102".into(), 23.8103, 90.4125);
        record.status = TrackerStatus::Live;
        record.last_update = Some(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["deviceId"], "Train-102");
        assert_eq!(json["status"], "live");
        assert_eq!(json["signal"], "Strong");
        assert!(json["lastUpdate"].is_string());
    }

    #[test]
    fn initial_record_is_offline_and_unreported() {
        let record = TrackerRecord::initial("Train-102".into(), 0.0, 0.0);
        assert_eq!(record.status, TrackerStatus::Offline);
        assert_eq!(record.signal, Signal::Strong);
        assert_eq!(record.last_update, None);
        assert_eq!(record.speed, 0.0);
    }
}
