//! Wide-to-long reshape of the feed table.

use chrono::NaiveDateTime;
use tracing::debug;

use sensor_common::{parse_feed_timestamp, SensorError, SensorResult};

use crate::cell;
use crate::column::{self, ChannelPath};

/// Name of the feed's timestamp column.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// One melted row: a single reading of a single channel.
///
/// The unit token stays on the row because the hierarchy's Unit level is
/// keyed by it; it is not persisted on the value itself.
#[derive(Debug, Clone)]
pub struct LongRow {
    pub timestamp: NaiveDateTime,
    pub magnitude: Option<f64>,
    pub unit: String,
    pub building: String,
    pub floor: String,
    pub room_type: String,
    pub room_number: String,
    pub modality: String,
}

/// Melt a wide CSV snapshot into one `LongRow` per (timestamp, channel) pair.
///
/// Output length is always `rows x channels`; rows with a missing magnitude
/// are kept here and rejected later by the upserter's validation, so the
/// count property holds independently of cell contents.
pub fn reshape(data: &[u8]) -> SensorResult<Vec<LongRow>> {
    let mut reader = csv::Reader::from_reader(data);

    let headers = reader.headers()?.clone();
    let timestamp_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .ok_or_else(|| SensorError::MissingColumn(TIMESTAMP_COLUMN.to_string()))?;

    // Parse every channel header once, up front.
    let channels: Vec<(usize, String, ChannelPath)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != timestamp_idx)
        .map(|(idx, name)| {
            column::parse_column_name(name).map(|path| (idx, name.to_string(), path))
        })
        .collect::<SensorResult<_>>()?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let raw_ts = record.get(timestamp_idx).ok_or_else(|| {
            SensorError::FeedDecode("record shorter than header row".to_string())
        })?;
        let timestamp = parse_feed_timestamp(raw_ts)?;

        for (idx, name, path) in &channels {
            let raw = record.get(*idx).unwrap_or("");
            let (magnitude, unit) = cell::parse_cell_value(raw).map_err(|e| match e {
                SensorError::InvalidMagnitude { raw, .. } => SensorError::InvalidMagnitude {
                    channel: name.clone(),
                    raw,
                },
                other => other,
            })?;

            rows.push(LongRow {
                timestamp,
                magnitude,
                unit,
                building: path.building.clone(),
                floor: path.floor.clone(),
                room_type: path.room_type.clone(),
                room_number: path.room_number.clone(),
                modality: path.modality.clone(),
            });
        }
    }

    debug!(
        rows = rows.len(),
        channels = channels.len(),
        "Reshaped feed snapshot"
    );

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = "\
Timestamp,JCK-1-a2-temp,JCK-2-b3-humidity
2020-01-06T00:00:00 Chicago,21.5°C,45%
2020-01-06T00:15:00 Chicago,21.7°C,46%
2020-01-06T00:30:00 Chicago,21.6°C,44%
";

    #[test]
    fn test_row_count_is_rows_times_channels() {
        let rows = reshape(FEED.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3 * 2);
    }

    #[test]
    fn test_city_label_stripped() {
        let rows = reshape(FEED.as_bytes()).unwrap();
        assert_eq!(
            rows[0].timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2020-01-06T00:00:00"
        );
    }

    #[test]
    fn test_path_and_unit_attached() {
        let rows = reshape(FEED.as_bytes()).unwrap();
        let temp = rows.iter().find(|r| r.modality == "temp").unwrap();
        assert_eq!(temp.building, "JCK");
        assert_eq!(temp.floor, "1");
        assert_eq!(temp.room_type, "a");
        assert_eq!(temp.room_number, "2");
        assert_eq!(temp.unit, "°C");
        assert_eq!(temp.magnitude, Some(21.5));
    }

    #[test]
    fn test_missing_magnitude_survives_reshape() {
        let feed = "Timestamp,JCK-1-a2-temp\n2020-01-06T00:00:00,N/A\n";
        let rows = reshape(feed.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].magnitude, None);
        assert_eq!(rows[0].unit, "N/A");
    }

    #[test]
    fn test_missing_timestamp_column_rejected() {
        let feed = "Time,JCK-1-a2-temp\n2020-01-06T00:00:00,21.5°C\n";
        let err = reshape(feed.as_bytes()).unwrap_err();
        assert!(matches!(err, SensorError::MissingColumn(_)));
    }

    #[test]
    fn test_malformed_header_aborts() {
        let feed = "Timestamp,JCK-1-temp\n2020-01-06T00:00:00,21.5°C\n";
        assert!(reshape(feed.as_bytes()).is_err());
    }
}
