//! In-memory store implementation.
//!
//! Backs the upserter tests and local development without a database. Row
//! layout mirrors the Postgres schema one table per level, with the same
//! oldest-row-wins lookup semantics.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use sensor_common::SensorResult;

use crate::hierarchy::{EntityId, HierarchyBatch};
use crate::store::SensorStore;

#[derive(Debug, Default)]
struct Tables {
    next_id: EntityId,
    buildings: Vec<(EntityId, String)>,
    /// (id, building_id, name)
    floors: Vec<(EntityId, EntityId, String)>,
    /// (id, floor_id, number, room_type)
    rooms: Vec<(EntityId, EntityId, String, String)>,
    /// (id, room_id, name)
    modalities: Vec<(EntityId, EntityId, String)>,
    /// (id, modality_id, name)
    units: Vec<(EntityId, EntityId, String)>,
    /// (unit_id, magnitude, time_stamp)
    values: Vec<(EntityId, f64, NaiveDateTime)>,
}

impl Tables {
    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

/// Row counts per table, for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub buildings: usize,
    pub floors: usize,
    pub rooms: usize,
    pub modalities: usize,
    pub units: usize,
    pub values: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> StoreCounts {
        let tables = self.tables.lock().expect("store lock poisoned");
        StoreCounts {
            buildings: tables.buildings.len(),
            floors: tables.floors.len(),
            rooms: tables.rooms.len(),
            modalities: tables.modalities.len(),
            units: tables.units.len(),
            values: tables.values.len(),
        }
    }

    /// Building ids a floor is attached under, for inspecting the
    /// cross-building merge behavior of globally unique names.
    pub fn floor_parents(&self, floor_name: &str) -> Vec<EntityId> {
        let tables = self.tables.lock().expect("store lock poisoned");
        tables
            .floors
            .iter()
            .filter(|(_, _, name)| name == floor_name)
            .map(|(_, building_id, _)| *building_id)
            .collect()
    }
}

#[async_trait]
impl SensorStore for MemoryStore {
    async fn find_building(&self, name: &str) -> SensorResult<Option<EntityId>> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables
            .buildings
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| *id))
    }

    async fn find_floor(&self, name: &str) -> SensorResult<Option<EntityId>> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables
            .floors
            .iter()
            .find(|(_, _, n)| n == name)
            .map(|(id, _, _)| *id))
    }

    async fn find_room(&self, number: &str) -> SensorResult<Option<EntityId>> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables
            .rooms
            .iter()
            .find(|(_, _, n, _)| n == number)
            .map(|(id, _, _, _)| *id))
    }

    async fn find_modality(&self, name: &str) -> SensorResult<Option<EntityId>> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables
            .modalities
            .iter()
            .find(|(_, _, n)| n == name)
            .map(|(id, _, _)| *id))
    }

    async fn find_unit(&self, name: &str) -> SensorResult<Option<EntityId>> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables
            .units
            .iter()
            .find(|(_, _, n)| n == name)
            .map(|(id, _, _)| *id))
    }

    async fn commit_batch(&self, batch: &HierarchyBatch) -> SensorResult<()> {
        let mut tables = self.tables.lock().expect("store lock poisoned");

        for b in &batch.buildings {
            let building_id = b.existing.unwrap_or_else(|| {
                let id = tables.allocate_id();
                tables.buildings.push((id, b.name.clone()));
                id
            });

            for f in &b.floors {
                let floor_id = f.existing.unwrap_or_else(|| {
                    let id = tables.allocate_id();
                    tables.floors.push((id, building_id, f.name.clone()));
                    id
                });

                for r in &f.rooms {
                    let room_id = r.existing.unwrap_or_else(|| {
                        let id = tables.allocate_id();
                        tables
                            .rooms
                            .push((id, floor_id, r.number.clone(), r.room_type.clone()));
                        id
                    });

                    for m in &r.modalities {
                        let modality_id = m.existing.unwrap_or_else(|| {
                            let id = tables.allocate_id();
                            tables.modalities.push((id, room_id, m.name.clone()));
                            id
                        });

                        for u in &m.units {
                            let unit_id = u.existing.unwrap_or_else(|| {
                                let id = tables.allocate_id();
                                tables.units.push((id, modality_id, u.name.clone()));
                                id
                            });

                            for v in &u.values {
                                tables.values.push((unit_id, v.magnitude, v.timestamp));
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn last_update(&self) -> SensorResult<Option<NaiveDateTime>> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(tables.values.iter().map(|(_, _, ts)| *ts).max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::BuildingNode;

    fn bare_building(name: &str) -> HierarchyBatch {
        HierarchyBatch {
            buildings: vec![BuildingNode {
                existing: None,
                name: name.to_string(),
                floors: Vec::new(),
            }],
        }
    }

    #[tokio::test]
    async fn test_lookup_returns_oldest_row() {
        let store = MemoryStore::new();
        // Two same-named rows can exist if a caller skips the lookup; the
        // find must then deterministically pick the oldest.
        store.commit_batch(&bare_building("JCK")).await.unwrap();
        store.commit_batch(&bare_building("JCK")).await.unwrap();

        assert_eq!(store.counts().buildings, 2);
        assert_eq!(store.find_building("JCK").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_find_misses_return_none() {
        let store = MemoryStore::new();
        assert_eq!(store.find_building("JCK").await.unwrap(), None);
        assert_eq!(store.find_floor("1").await.unwrap(), None);
        assert_eq!(store.find_room("2").await.unwrap(), None);
        assert_eq!(store.find_modality("temp").await.unwrap(), None);
        assert_eq!(store.find_unit("°C").await.unwrap(), None);
    }
}
