//! Time handling for the sensor feed.
//!
//! Feed timestamps are naive local times tagged with a literal city-name
//! label rather than a numeric offset. The label is stripped, not converted,
//! so `NaiveDateTime` flows through the whole pipeline.

use chrono::NaiveDateTime;

use crate::error::{SensorError, SensorResult};

/// Trailing timezone label emitted by the feed, e.g. "2020-01-06T00:00:00 Chicago".
pub const TZ_LABEL_SUFFIX: &str = " Chicago";

const FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a feed timestamp, stripping the trailing city label if present.
///
/// The label is discarded, not applied as an offset, so the result is a
/// naive local time.
pub fn parse_feed_timestamp(raw: &str) -> SensorResult<NaiveDateTime> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_suffix(TZ_LABEL_SUFFIX).unwrap_or(trimmed);

    for fmt in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(stripped, fmt) {
            return Ok(ts);
        }
    }

    Err(SensorError::InvalidTimestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_strips_city_label() {
        let ts = parse_feed_timestamp("2020-01-06T00:15:00 Chicago").unwrap();
        let expected = NaiveDate::from_ymd_opt(2020, 1, 6)
            .unwrap()
            .and_hms_opt(0, 15, 0)
            .unwrap();
        assert_eq!(ts, expected);
    }

    #[test]
    fn test_parses_without_label() {
        let ts = parse_feed_timestamp("2020-01-06 12:00:00").unwrap();
        assert_eq!(ts.format("%H").to_string(), "12");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_feed_timestamp("not a time").is_err());
        assert!(parse_feed_timestamp("").is_err());
    }
}
