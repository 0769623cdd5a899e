//! Common types shared across the sensor-warehouse crates.

pub mod error;
pub mod time;

pub use error::{SensorError, SensorResult};
pub use time::{parse_feed_timestamp, TZ_LABEL_SUFFIX};
