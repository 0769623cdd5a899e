//! Cell value parsing.
//!
//! Raw cells glue a numeric magnitude to its unit-of-measure string
//! ("23.5°C", "72%"). Characters are partitioned into digits-and-dot
//! (the magnitude) and everything else (the unit token).

use sensor_common::{SensorError, SensorResult};

/// Split a raw cell into `(magnitude, unit)`.
///
/// Returns `(None, unit)` when the cell contains no digit or dot at all
/// (e.g. "N/A") — callers must reject such rows before persistence. A
/// non-empty magnitude substring that is not a valid decimal (e.g. the
/// "1.2.3" shape) is an error.
pub fn parse_cell_value(raw: &str) -> SensorResult<(Option<f64>, String)> {
    let mut numeric = String::new();
    let mut unit = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() || c == '.' {
            numeric.push(c);
        } else {
            unit.push(c);
        }
    }

    if numeric.is_empty() {
        return Ok((None, unit));
    }

    let magnitude = numeric
        .parse::<f64>()
        .map_err(|_| SensorError::InvalidMagnitude {
            channel: String::new(),
            raw: raw.to_string(),
        })?;

    Ok((Some(magnitude), unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_with_unit_suffix() {
        let (mag, unit) = parse_cell_value("23.5°C").unwrap();
        assert_eq!(mag, Some(23.5));
        assert_eq!(unit, "°C");
    }

    #[test]
    fn test_percent_unit() {
        let (mag, unit) = parse_cell_value("72%").unwrap();
        assert_eq!(mag, Some(72.0));
        assert_eq!(unit, "%");
    }

    #[test]
    fn test_no_digits_yields_none() {
        let (mag, unit) = parse_cell_value("N/A").unwrap();
        assert_eq!(mag, None);
        assert_eq!(unit, "N/A");
    }

    #[test]
    fn test_empty_cell_yields_none() {
        let (mag, unit) = parse_cell_value("").unwrap();
        assert_eq!(mag, None);
        assert_eq!(unit, "");
    }

    #[test]
    fn test_bare_number_has_empty_unit() {
        let (mag, unit) = parse_cell_value("1013.25").unwrap();
        assert_eq!(mag, Some(1013.25));
        assert_eq!(unit, "");
    }

    #[test]
    fn test_multiple_dots_rejected() {
        assert!(parse_cell_value("1.2.3kPa").is_err());
    }

    #[test]
    fn test_partition_is_exact() {
        let raw = "19.8°C";
        let (mag, unit) = parse_cell_value(raw).unwrap();
        assert!(mag.is_some());
        // digits+dot plus unit must account for every input character
        assert_eq!("19.8".len() + unit.len(), raw.len());
    }
}
