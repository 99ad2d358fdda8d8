//! Sensor reading classification.
//!
//! Maps a sensor reading to a [`Severity`] using fixed per-type bands. Bands
//! are checked from `high` down to `low` and the first match wins; anything
//! outside every band is `none`. Readings that do not parse never alert.
//!
//! | type        | high           | medium                | low                   |
//! |-------------|----------------|-----------------------|-----------------------|
//! | temperature | < 10 or > 32   | [10, 12) or (30, 32]  | [12, 15) or (28, 30]  |
//! | moisture    | > 80           | (70, 80]              | (60, 70]              |
//! | air-quality | > 70           | (50, 70]              | (30, 50]              |

use serde::Serialize;

use crate::models::SensorType;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

/// Classify a raw reading for a sensor of the given type.
pub fn classify(sensor_type: SensorType, raw_reading: &str) -> Severity {
    // ---
    match parse_reading(raw_reading) {
        Some(value) => classify_value(sensor_type, value),
        None => Severity::None,
    }
}

/// Classify an already-parsed reading.
pub fn classify_value(sensor_type: SensorType, v: f64) -> Severity {
    // ---
    if !v.is_finite() {
        return Severity::None;
    }

    match sensor_type {
        SensorType::Temperature => {
            if v < 10.0 || v > 32.0 {
                Severity::High
            } else if v < 12.0 || v > 30.0 {
                Severity::Medium
            } else if v < 15.0 || v > 28.0 {
                Severity::Low
            } else {
                Severity::None
            }
        }
        SensorType::Moisture => above(v, 80.0, 70.0, 60.0),
        SensorType::AirQuality => above(v, 70.0, 50.0, 30.0),
    }
}

/// One-sided bands: strictly above each limit.
fn above(v: f64, high: f64, medium: f64, low: f64) -> Severity {
    if v > high {
        Severity::High
    } else if v > medium {
        Severity::Medium
    } else if v > low {
        Severity::Low
    } else {
        Severity::None
    }
}

/// Extract the leading decimal number from a reading such as `"21.5"`,
/// `" 85% "` or `"21.5 C"`.
pub fn parse_reading(raw: &str) -> Option<f64> {
    // ---
    let s = raw.trim();
    let end = numeric_prefix(s.as_bytes());
    if end == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Length of the decimal literal at the start of `b`, or 0 when there is
/// none. Single pass: `[+-] digits [. digits] [(e|E) [+-] digits]`, with at
/// least one mantissa digit. An exponent marker only counts when digits
/// follow it, so `"12e"` and `"3e-x"` stop before the `e`.
fn numeric_prefix(b: &[u8]) -> usize {
    // ---
    let digits_from = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i = 1;
    }

    let int_end = digits_from(i);
    let mut mantissa_digits = int_end - i;
    i = int_end;

    if b.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        mantissa_digits += frac_end - (i + 1);
        i = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(b.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use SensorType::*;

    #[test]
    fn test_temperature_bands() {
        // ---
        assert_eq!(classify(Temperature, "9.99"), Severity::High);
        assert_eq!(classify(Temperature, "10"), Severity::Medium);
        assert_eq!(classify(Temperature, "11.99"), Severity::Medium);
        assert_eq!(classify(Temperature, "12"), Severity::Low);
        assert_eq!(classify(Temperature, "14.9"), Severity::Low);
        assert_eq!(classify(Temperature, "15"), Severity::None);
        assert_eq!(classify(Temperature, "21"), Severity::None);
        assert_eq!(classify(Temperature, "28"), Severity::None);
        assert_eq!(classify(Temperature, "28.01"), Severity::Low);
        assert_eq!(classify(Temperature, "30"), Severity::Low);
        assert_eq!(classify(Temperature, "30.5"), Severity::Medium);
        assert_eq!(classify(Temperature, "32"), Severity::Medium);
        assert_eq!(classify(Temperature, "32.01"), Severity::High);
        assert_eq!(classify(Temperature, "-4"), Severity::High);
    }

    #[test]
    fn test_moisture_bands() {
        // ---
        assert_eq!(classify(Moisture, "60"), Severity::None);
        assert_eq!(classify(Moisture, "60.5"), Severity::Low);
        assert_eq!(classify(Moisture, "70"), Severity::Low);
        assert_eq!(classify(Moisture, "70.01"), Severity::Medium);
        assert_eq!(classify(Moisture, "80"), Severity::Medium);
        assert_eq!(classify(Moisture, "80.01"), Severity::High);
    }

    #[test]
    fn test_air_quality_bands() {
        // ---
        assert_eq!(classify(AirQuality, "30"), Severity::None);
        assert_eq!(classify(AirQuality, "31"), Severity::Low);
        assert_eq!(classify(AirQuality, "50"), Severity::Low);
        assert_eq!(classify(AirQuality, "50.5"), Severity::Medium);
        assert_eq!(classify(AirQuality, "70"), Severity::Medium);
        assert_eq!(classify(AirQuality, "70.01"), Severity::High);
    }

    #[test]
    fn test_unparseable_is_none() {
        // ---
        for raw in ["abc", "", "   ", "NaN", "inf", "-", ".", "n/a"] {
            assert_eq!(classify(Temperature, raw), Severity::None, "{raw:?}");
        }
    }

    #[test]
    fn test_reading_with_unit_suffix() {
        // ---
        assert_eq!(parse_reading("85%"), Some(85.0));
        assert_eq!(parse_reading(" 21.5 C "), Some(21.5));
        assert_eq!(parse_reading("1e2ppm"), Some(100.0));
        assert_eq!(parse_reading("12e"), Some(12.0));
        assert_eq!(classify(Moisture, "85%"), Severity::High);
    }

    #[test]
    fn test_literal_boundaries() {
        // ---
        assert_eq!(parse_reading("3-4"), Some(3.0));
        assert_eq!(parse_reading("-2.5e+1x"), Some(-25.0));
        assert_eq!(parse_reading("7e-"), Some(7.0));
        assert_eq!(parse_reading(".5"), Some(0.5));
        assert_eq!(parse_reading("5."), Some(5.0));
        assert_eq!(parse_reading("+.e1"), None);
        assert_eq!(parse_reading("1e999"), None);
    }

    #[test]
    fn test_huge_reading_is_linear() {
        // ---
        let m = 100_000;
        let raw = format!("{}{}", "1".repeat(m), "e-".repeat(m / 2));
        let started = std::time::Instant::now();

        // Overflows to infinity, so it never alerts.
        assert_eq!(classify(Moisture, &raw), Severity::None);
        let raw = format!("85{}", "e-".repeat(m / 2));
        assert_eq!(classify(Moisture, &raw), Severity::High);

        assert!(
            started.elapsed() < std::time::Duration::from_millis(500),
            "took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn test_severity_ordering() {
        // ---
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::None);
    }
}
