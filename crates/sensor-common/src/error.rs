//! Error types for the sensor-warehouse services.

use thiserror::Error;

/// Result type alias using SensorError.
pub type SensorResult<T> = Result<T, SensorError>;

/// Primary error type for ingestion operations.
#[derive(Debug, Error)]
pub enum SensorError {
    // === Parse Errors ===
    #[error("Malformed channel header '{header}': {reason}")]
    MalformedHeader { header: String, reason: String },

    #[error("Unparseable magnitude '{raw}' in channel '{channel}'")]
    InvalidMagnitude { channel: String, raw: String },

    #[error("Invalid feed timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Feed is missing required column: {0}")]
    MissingColumn(String),

    #[error("Failed to decode feed table: {0}")]
    FeedDecode(String),

    // === Validation Errors ===
    #[error("Missing magnitude for channel '{channel}' at {timestamp}: raw value '{raw}'")]
    MissingMagnitude {
        channel: String,
        timestamp: String,
        raw: String,
    },

    // === Network Errors ===
    #[error("Feed unreachable: {0}")]
    Network(String),

    // === Storage Errors ===
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl SensorError {
    /// Whether the error originates from decoding the feed itself
    /// (as opposed to the network or the store).
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            SensorError::MalformedHeader { .. }
                | SensorError::InvalidMagnitude { .. }
                | SensorError::InvalidTimestamp(_)
                | SensorError::MissingColumn(_)
                | SensorError::FeedDecode(_)
        )
    }
}

impl From<csv::Error> for SensorError {
    fn from(err: csv::Error) -> Self {
        SensorError::FeedDecode(err.to_string())
    }
}
