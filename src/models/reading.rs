//! Sensor reading data model.
//!
//! One row of the `sensor_data` collection. Readings are plain values: the
//! signal model builds them, a gateway persists them, nothing mutates them in
//! between.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A single synthetic environmental measurement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    #[serde(serialize_with = "serialize_iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Barometric pressure, hPa.
    pub pressure: f64,
    /// Illuminance, lux. Never negative.
    pub light: f64,
}

impl Reading {
    /// Wire form of the timestamp, e.g. `2026-10-18T09:00:00.000Z`.
    pub fn timestamp_iso(&self) -> String {
        to_iso_millis(&self.timestamp)
    }
}

pub fn to_iso_millis(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_iso_millis(value))
}
