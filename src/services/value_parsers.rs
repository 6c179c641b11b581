//! Value parsing for raw Luxtronik readings
//!
//! The device reports every value as display text ("21.5°C", "3 h",
//! "1:02:03", "Automatik"). [`parse_value`] classifies that text into a
//! typed [`Reading`] using an ordered set of rules; the first rule that
//! matches wins. Parsing is total: every input yields a reading.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Unit attached to a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "K")]
    Kelvin,
    #[serde(rename = "V")]
    Volt,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "min")]
    Minutes,
    #[serde(rename = "Hz")]
    Hertz,
    #[serde(rename = "l/h")]
    LitersPerHour,
    #[serde(rename = "bar")]
    Bar,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "kW")]
    Kilowatt,
    #[serde(rename = "kWh")]
    KilowattHours,
    #[serde(rename = "s")]
    Seconds,
    /// Unit-less number
    #[serde(rename = "number")]
    Number,
    /// Text that could not be interpreted
    #[serde(rename = "string")]
    Text,
}

impl Unit {
    /// Unit symbol as reported by the device, or the `number`/`string` sentinel
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Kelvin => "K",
            Unit::Volt => "V",
            Unit::Hours => "h",
            Unit::Minutes => "min",
            Unit::Hertz => "Hz",
            Unit::LitersPerHour => "l/h",
            Unit::Bar => "bar",
            Unit::Percent => "%",
            Unit::Kilowatt => "kW",
            Unit::KilowattHours => "kWh",
            Unit::Seconds => "s",
            Unit::Number => "number",
            Unit::Text => "string",
        }
    }

    /// True for physical units, false for the `number`/`string` sentinels
    pub fn is_physical(&self) -> bool {
        !matches!(self, Unit::Number | Unit::Text)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suffixes recognised on raw values, in the order they are tried.
///
/// Most suffixes carry a leading space so that they don't match inside a
/// number. The order is significant: it is not a longest-match table.
pub const UNIT_SUFFIXES: [(&str, Unit); 11] = [
    ("°C", Unit::Celsius),
    (" K", Unit::Kelvin),
    (" V", Unit::Volt),
    (" h", Unit::Hours),
    (" min", Unit::Minutes),
    (" Hz", Unit::Hertz),
    (" l/h", Unit::LitersPerHour),
    (" bar", Unit::Bar),
    (" %", Unit::Percent),
    (" kW", Unit::Kilowatt),
    (" kWh", Unit::KilowattHours),
];

/// Decoded value of a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    // Before `Float` so integral JSON numbers come back as `Int`
    Int(i64),
    Float(f64),
    Text(String),
    /// The unit was recognised but the number was not (e.g. "--- °C")
    Absent,
}

impl fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingValue::Float(v) => write!(f, "{v}"),
            ReadingValue::Int(v) => write!(f, "{v}"),
            ReadingValue::Text(s) => f.write_str(s),
            ReadingValue::Absent => f.write_str("-"),
        }
    }
}

/// A decoded value paired with its unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: ReadingValue,
    pub unit: Unit,
}

impl Reading {
    pub fn new(value: ReadingValue, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn float(value: f64, unit: Unit) -> Self {
        Self::new(ReadingValue::Float(value), unit)
    }

    pub fn int(value: i64, unit: Unit) -> Self {
        Self::new(ReadingValue::Int(value), unit)
    }

    pub fn text<S: Into<String>>(value: S) -> Self {
        Self::new(ReadingValue::Text(value.into()), Unit::Text)
    }

    pub fn absent(unit: Unit) -> Self {
        Self::new(ReadingValue::Absent, unit)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            ReadingValue::Float(v) => Some(v),
            ReadingValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self.value, ReadingValue::Absent)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

fn clock_pattern() -> &'static Regex {
    static CLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
    CLOCK_REGEX.get_or_init(|| Regex::new(r"^([0-9]+):([0-9]{2})(?::([0-9]{2}))?$").unwrap())
}

/// Parse a raw device string into a [`Reading`].
///
/// Rules, first match wins:
/// 1. a known unit suffix (table order) followed by a float, or an absent
///    value carrying that unit when the number does not parse,
/// 2. `H:MM` / `H:MM:SS` as total seconds,
/// 3. a bare trailing `h` on an integer (operating-hour counters),
/// 4. a plain float (`number`),
/// 5. the raw text (`string`).
pub fn parse_value(raw: &str) -> Reading {
    if let Some(reading) = parse_unit_suffix(raw) {
        return reading;
    }

    if let Some(seconds) = parse_clock_time(raw) {
        return Reading::int(seconds, Unit::Seconds);
    }

    if let Some(hours) = raw
        .strip_suffix('h')
        .and_then(|number| number.trim().parse::<i64>().ok())
    {
        return Reading::int(hours, Unit::Hours);
    }

    if let Ok(number) = raw.trim().parse::<f64>() {
        return Reading::float(number, Unit::Number);
    }

    Reading::text(raw)
}

fn parse_unit_suffix(raw: &str) -> Option<Reading> {
    let (number, unit) = UNIT_SUFFIXES
        .iter()
        .find_map(|(suffix, unit)| raw.strip_suffix(suffix).map(|number| (number, *unit)))?;

    Some(match number.trim().parse::<f64>() {
        Ok(value) => Reading::float(value, unit),
        Err(_) => Reading::absent(unit),
    })
}

/// Total seconds of an `H:MM` or `H:MM:SS` string
fn parse_clock_time(raw: &str) -> Option<i64> {
    let captures = clock_pattern().captures(raw)?;

    let hours: i64 = captures.get(1)?.as_str().parse().ok()?;
    let minutes: i64 = captures.get(2)?.as_str().parse().ok()?;
    let seconds: i64 = match captures.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60)?
        .checked_add(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("21.5°C", Reading::float(21.5, Unit::Celsius))]
    #[case("3 h", Reading::float(3.0, Unit::Hours))]
    #[case("12h", Reading::int(12, Unit::Hours))]
    #[case("130 l/h", Reading::float(130.0, Unit::LitersPerHour))]
    #[case("1:30", Reading::int(5400, Unit::Seconds))]
    #[case("1:02:03", Reading::int(3723, Unit::Seconds))]
    #[case("42", Reading::float(42.0, Unit::Number))]
    #[case("Automatic", Reading::text("Automatic"))]
    fn test_documented_examples(#[case] raw: &str, #[case] expected: Reading) {
        assert_eq!(parse_value(raw), expected);
    }

    #[rstest]
    #[case("2.5 K", Reading::float(2.5, Unit::Kelvin))]
    #[case("230 V", Reading::float(230.0, Unit::Volt))]
    #[case("15 min", Reading::float(15.0, Unit::Minutes))]
    #[case("50 Hz", Reading::float(50.0, Unit::Hertz))]
    #[case("1.8 bar", Reading::float(1.8, Unit::Bar))]
    #[case("75 %", Reading::float(75.0, Unit::Percent))]
    #[case("4.2 kW", Reading::float(4.2, Unit::Kilowatt))]
    #[case("1234.5 kWh", Reading::float(1234.5, Unit::KilowattHours))]
    #[case("-3.1°C", Reading::float(-3.1, Unit::Celsius))]
    fn test_every_unit_suffix(#[case] raw: &str, #[case] expected: Reading) {
        assert_eq!(parse_value(raw), expected);
    }

    #[rstest]
    #[case("---°C", Unit::Celsius)]
    #[case("n/a %", Unit::Percent)]
    #[case(" h", Unit::Hours)]
    fn test_unparseable_number_keeps_unit(#[case] raw: &str, #[case] unit: Unit) {
        let reading = parse_value(raw);
        assert!(reading.is_absent());
        assert_eq!(reading.unit, unit);
    }

    #[test]
    fn test_clock_time_requires_two_digit_minutes() {
        assert_eq!(parse_value("123:45"), Reading::int(123 * 3600 + 45 * 60, Unit::Seconds));
        assert_eq!(parse_value("1:5"), Reading::text("1:5"));
        assert_eq!(parse_value("1:05:7"), Reading::text("1:05:7"));
    }

    #[test]
    fn test_bare_hour_falls_through_when_not_integer() {
        // "1.5h" is no integer and no float either
        assert_eq!(parse_value("1.5h"), Reading::text("1.5h"));
        assert_eq!(parse_value("Aush"), Reading::text("Aush"));
    }

    #[rstest]
    #[case("", Reading::text(""))]
    #[case(" ", Reading::text(" "))]
    #[case("°C", Reading::absent(Unit::Celsius))]
    #[case(":", Reading::text(":"))]
    #[case("h", Reading::text("h"))]
    #[case("::", Reading::text("::"))]
    #[case("99999999999999999999:00", Reading::text("99999999999999999999:00"))]
    #[case("äöü", Reading::text("äöü"))]
    #[case("1:00:00:00", Reading::text("1:00:00:00"))]
    fn test_odd_inputs_still_yield_a_reading(#[case] raw: &str, #[case] expected: Reading) {
        assert_eq!(parse_value(raw), expected);
    }

    #[test]
    fn test_reading_serializes_unit_symbol() {
        let json = serde_json::to_value(parse_value("21.5°C")).unwrap();
        assert_eq!(json, serde_json::json!({"value": 21.5, "unit": "°C"}));

        let json = serde_json::to_value(parse_value("--- °C")).unwrap();
        assert_eq!(json, serde_json::json!({"value": null, "unit": "°C"}));
    }

    #[rstest]
    #[case("21.5°C")]
    #[case("42")]
    #[case("1:30")]
    #[case("12h")]
    #[case("Automatic")]
    #[case("--- °C")]
    fn test_reading_json_keeps_variant(#[case] raw: &str) {
        let reading = parse_value(raw);
        let json = serde_json::to_string(&reading).unwrap();
        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading, "{json}");
    }
}
