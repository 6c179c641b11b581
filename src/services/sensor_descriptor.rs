//! Sensor metadata derived from readings
//!
//! Maps each reading's unit to a sensor class, the unit to present it in and
//! an optional conversion factor. Hosts that register one entity per key use
//! this instead of guessing from the raw text.

use serde::Serialize;

use super::key_builder::display_name;
use super::value_parsers::{Reading, ReadingValue, Unit};
use crate::client::Snapshot;

/// Physical quantity a reading measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorClass {
    Temperature,
    Voltage,
    Duration,
    Frequency,
    VolumeFlowRate,
    Pressure,
    Power,
    Energy,
}

/// Presentation metadata for one snapshot key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorDescriptor {
    pub key: String,
    /// Last key segment
    pub name: String,
    pub class: Option<SensorClass>,
    pub native_unit: Option<&'static str>,
    /// Factor applied to the raw value before presenting it
    pub conversion: Option<f64>,
}

impl SensorDescriptor {
    pub fn for_reading(key: &str, reading: &Reading) -> Self {
        let (class, native_unit, conversion) = match reading.unit {
            Unit::Celsius => (Some(SensorClass::Temperature), Some("°C"), None),
            Unit::Kelvin => (Some(SensorClass::Temperature), Some("K"), None),
            Unit::Volt => (Some(SensorClass::Voltage), Some("V"), None),
            Unit::Hours => (Some(SensorClass::Duration), Some("h"), None),
            Unit::Minutes => (Some(SensorClass::Duration), Some("min"), None),
            Unit::Hertz => (Some(SensorClass::Frequency), Some("Hz"), None),
            Unit::LitersPerHour => (Some(SensorClass::VolumeFlowRate), Some("L/min"), Some(1.0 / 60.0)),
            Unit::Bar => (Some(SensorClass::Pressure), Some("bar"), None),
            Unit::Percent => (None, Some("%"), None),
            Unit::Kilowatt => (Some(SensorClass::Power), Some("kW"), None),
            Unit::KilowattHours => (Some(SensorClass::Energy), Some("kWh"), None),
            Unit::Seconds => (Some(SensorClass::Duration), Some("s"), None),
            Unit::Number | Unit::Text => (None, None, None),
        };

        Self {
            key: key.to_string(),
            name: display_name(key).to_string(),
            class,
            native_unit,
            conversion,
        }
    }

    /// Value to present for `reading`, with the conversion applied.
    ///
    /// Text readings are passed through unconverted; absent values yield `None`.
    pub fn native_value(&self, reading: &Reading) -> Option<ReadingValue> {
        match (&reading.value, self.conversion) {
            (ReadingValue::Absent, _) => None,
            (ReadingValue::Text(_), _) | (_, None) => Some(reading.value.clone()),
            (_, Some(factor)) => reading.as_f64().map(|v| ReadingValue::Float(v * factor)),
        }
    }
}

/// Keys whose last segment contains a colon are timestamps ("Zeitstempel
/// 12:30") rather than sensors.
pub fn is_timestamp_key(key: &str) -> bool {
    display_name(key).contains(':')
}

/// Descriptors for every sensor-like key of a snapshot
pub fn describe_snapshot(snapshot: &Snapshot) -> Vec<SensorDescriptor> {
    let mut descriptors: Vec<SensorDescriptor> = snapshot
        .iter()
        .filter(|(key, _)| !is_timestamp_key(key))
        .map(|(key, reading)| SensorDescriptor::for_reading(key, reading))
        .collect();
    descriptors.sort_by(|a, b| a.key.cmp(&b.key));
    descriptors
}
