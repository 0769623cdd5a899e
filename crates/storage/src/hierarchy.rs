//! In-memory hierarchy batch assembled by one ingestion run.
//!
//! The upserter builds one owned tree per batch instead of mutating store
//! objects incrementally; the store persists the whole tree in a single
//! transaction. Nodes that matched an existing row carry its id and are not
//! re-inserted — only their new descendants are.

use chrono::NaiveDateTime;

/// Row id in the relational store.
pub type EntityId = i64;

/// Everything one ingestion run wants to persist, grouped by building.
#[derive(Debug, Default)]
pub struct HierarchyBatch {
    pub buildings: Vec<BuildingNode>,
}

#[derive(Debug)]
pub struct BuildingNode {
    /// Id of the already-persisted row, if the lookup found one.
    pub existing: Option<EntityId>,
    pub name: String,
    pub floors: Vec<FloorNode>,
}

#[derive(Debug)]
pub struct FloorNode {
    pub existing: Option<EntityId>,
    pub name: String,
    pub rooms: Vec<RoomNode>,
}

#[derive(Debug)]
pub struct RoomNode {
    pub existing: Option<EntityId>,
    pub number: String,
    /// Taken from the first row of the room's subgroup when the node is new;
    /// ignored when the room already exists.
    pub room_type: String,
    pub modalities: Vec<ModalityNode>,
}

#[derive(Debug)]
pub struct ModalityNode {
    pub existing: Option<EntityId>,
    pub name: String,
    pub units: Vec<UnitNode>,
}

#[derive(Debug)]
pub struct UnitNode {
    pub existing: Option<EntityId>,
    pub name: String,
    pub values: Vec<ValueLeaf>,
}

/// A single timestamped reading. Always a leaf; the unit-of-measure token
/// lives on the owning `UnitNode`, not here.
#[derive(Debug, Clone, Copy)]
pub struct ValueLeaf {
    pub magnitude: f64,
    pub timestamp: NaiveDateTime,
}

impl HierarchyBatch {
    /// Total number of value leaves in the batch.
    pub fn value_count(&self) -> usize {
        self.buildings
            .iter()
            .flat_map(|b| &b.floors)
            .flat_map(|f| &f.rooms)
            .flat_map(|r| &r.modalities)
            .flat_map(|m| &m.units)
            .map(|u| u.values.len())
            .sum()
    }

    /// Number of nodes per level that did not match an existing row.
    pub fn new_node_counts(&self) -> NodeCounts {
        let mut counts = NodeCounts::default();
        for b in &self.buildings {
            counts.buildings += b.existing.is_none() as usize;
            for f in &b.floors {
                counts.floors += f.existing.is_none() as usize;
                for r in &f.rooms {
                    counts.rooms += r.existing.is_none() as usize;
                    for m in &r.modalities {
                        counts.modalities += m.existing.is_none() as usize;
                        for u in &m.units {
                            counts.units += u.existing.is_none() as usize;
                        }
                    }
                }
            }
        }
        counts
    }
}

/// Per-level node tally, used for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeCounts {
    pub buildings: usize,
    pub floors: usize,
    pub rooms: usize,
    pub modalities: usize,
    pub units: usize,
}
