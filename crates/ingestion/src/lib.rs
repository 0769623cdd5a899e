//! Sensor data ingestion library.
//!
//! Core logic for mapping a reshaped feed snapshot into the five-level
//! building hierarchy. The upserter performs one lookup-or-create pass per
//! batch against a `SensorStore` and hands back an owned tree for a single
//! atomic commit; the `ingester` service owns the fetch/commit wiring.

pub mod upsert;

pub use upsert::build_hierarchy;
