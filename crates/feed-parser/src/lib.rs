//! Decoding of the wide sensor feed.
//!
//! The feed arrives as a CSV table with one `Timestamp` column and one column
//! per sensor channel. Channel headers encode the building hierarchy
//! (`<building>-<floor>-<room>-<modality>`) and cell values carry the
//! magnitude glued to its unit string ("23.5°C"). This crate splits both
//! apart and melts the table into one row per (timestamp, channel) pair.

pub mod cell;
pub mod column;
pub mod reshape;

pub use cell::parse_cell_value;
pub use column::{parse_column_name, ChannelPath};
pub use reshape::{reshape, LongRow, TIMESTAMP_COLUMN};
