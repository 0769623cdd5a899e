//! Storage abstractions for the sensor warehouse.
//!
//! Provides the hierarchy batch tree handed over by the upserter, the
//! `SensorStore` trait it targets, and two implementations: PostgreSQL for
//! services and an in-memory store for tests and local runs.

pub mod hierarchy;
pub mod memory;
pub mod postgres;
pub mod store;

pub use hierarchy::{
    BuildingNode, EntityId, FloorNode, HierarchyBatch, ModalityNode, NodeCounts, RoomNode,
    UnitNode, ValueLeaf,
};
pub use memory::{MemoryStore, StoreCounts};
pub use postgres::PgStore;
pub use store::SensorStore;
