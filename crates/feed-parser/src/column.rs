//! Channel header parsing.

use sensor_common::{SensorError, SensorResult};

/// Delimiter between the four header segments. No other delimiter is
/// recognized.
pub const SEGMENT_DELIMITER: char = '-';

const SEGMENT_COUNT: usize = 4;

/// The hierarchy location encoded in one channel header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPath {
    pub building: String,
    pub floor: String,
    pub room_type: String,
    pub room_number: String,
    pub modality: String,
}

/// Decode a channel header of the form `<building>-<floor>-<room>-<modality>`.
///
/// The floor segment keeps only its digit characters; the room segment is
/// partitioned exactly into digits (room number) and non-digits (room type).
/// A header with any other segment count is rejected.
pub fn parse_column_name(raw: &str) -> SensorResult<ChannelPath> {
    let segments: Vec<&str> = raw.split(SEGMENT_DELIMITER).collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(SensorError::MalformedHeader {
            header: raw.to_string(),
            reason: format!(
                "expected {} '-' separated segments, found {}",
                SEGMENT_COUNT,
                segments.len()
            ),
        });
    }

    let floor: String = segments[1].chars().filter(char::is_ascii_digit).collect();
    let (room_number, room_type) = partition_digits(segments[2]);

    Ok(ChannelPath {
        building: segments[0].to_string(),
        floor,
        room_type,
        room_number,
        modality: segments[3].to_string(),
    })
}

/// Split a token into (digit characters, everything else), preserving order.
/// Every character lands in exactly one of the two outputs.
fn partition_digits(token: &str) -> (String, String) {
    let mut digits = String::new();
    let mut rest = String::new();
    for c in token.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            rest.push(c);
        }
    }
    (digits, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_header() {
        let path = parse_column_name("JCK-1-a2-temp").unwrap();
        assert_eq!(path.building, "JCK");
        assert_eq!(path.floor, "1");
        assert_eq!(path.room_type, "a");
        assert_eq!(path.room_number, "2");
        assert_eq!(path.modality, "temp");
    }

    #[test]
    fn test_floor_drops_non_digits() {
        let path = parse_column_name("JCK-Floor3-b12-humidity").unwrap();
        assert_eq!(path.floor, "3");
        assert_eq!(path.room_type, "b");
        assert_eq!(path.room_number, "12");
    }

    #[test]
    fn test_room_partition_is_exact() {
        // Non-alphanumeric characters in the room token must land in the
        // room type, never be silently lost.
        let path = parse_column_name("JCK-2-a_4-co2").unwrap();
        assert_eq!(path.room_number, "4");
        assert_eq!(path.room_type, "a_");
        let token = "a_4";
        assert_eq!(
            path.room_number.len() + path.room_type.len(),
            token.len()
        );
    }

    #[test]
    fn test_too_few_segments_rejected() {
        let err = parse_column_name("JCK-1-a2").unwrap_err();
        assert!(matches!(err, SensorError::MalformedHeader { .. }));
    }

    #[test]
    fn test_too_many_segments_rejected() {
        assert!(parse_column_name("JCK-1-a2-temp-extra").is_err());
    }
}
