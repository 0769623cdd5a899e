//! Store trait consumed by the hierarchy upserter.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use sensor_common::SensorResult;

use crate::hierarchy::{EntityId, HierarchyBatch};

/// Persistence boundary for the ingestion pipeline.
///
/// Lookups are by bare name and return the oldest matching row. Name
/// uniqueness is global across the whole store, not scoped to the parent
/// entity — an inherited design decision kept behind this trait so that a
/// future parent-scoped lookup is a policy change here, not a rewrite of
/// the upserter.
#[async_trait]
pub trait SensorStore: Send + Sync {
    async fn find_building(&self, name: &str) -> SensorResult<Option<EntityId>>;

    async fn find_floor(&self, name: &str) -> SensorResult<Option<EntityId>>;

    async fn find_room(&self, number: &str) -> SensorResult<Option<EntityId>>;

    async fn find_modality(&self, name: &str) -> SensorResult<Option<EntityId>>;

    async fn find_unit(&self, name: &str) -> SensorResult<Option<EntityId>>;

    /// Persist a whole batch atomically. On any failure nothing from the
    /// batch is left behind.
    async fn commit_batch(&self, batch: &HierarchyBatch) -> SensorResult<()>;

    /// Most recent value timestamp across the whole store, `None` when no
    /// values have been persisted yet.
    async fn last_update(&self) -> SensorResult<Option<NaiveDateTime>>;
}
