//! Lookup-or-create cascade over the five hierarchy levels.
//!
//! Walks the long table grouped building → floor → room → modality → unit.
//! Each distinct key in a group is looked up in the store exactly once per
//! batch; a miss produces a new in-memory node that every later row of the
//! same subgroup reuses. The assembled tree is returned for a single atomic
//! commit — this function never writes to the store.

use tracing::{debug, instrument};

use feed_parser::LongRow;
use sensor_common::{SensorError, SensorResult};
use storage::{
    BuildingNode, FloorNode, HierarchyBatch, ModalityNode, RoomNode, SensorStore, UnitNode,
    ValueLeaf,
};

/// Build the hierarchy batch for one reshaped feed snapshot.
///
/// Rows with a missing magnitude abort the whole batch before any store
/// lookup on deeper levels happens; nothing is persisted for a rejected
/// batch.
#[instrument(skip_all, fields(rows = rows.len()))]
pub async fn build_hierarchy(
    rows: &[LongRow],
    store: &dyn SensorStore,
) -> SensorResult<HierarchyBatch> {
    validate(rows)?;

    let all: Vec<&LongRow> = rows.iter().collect();
    let mut batch = HierarchyBatch::default();

    for building_name in distinct(&all, |r| r.building.as_str()) {
        let building_rows = subgroup(&all, |r| r.building == building_name);
        let mut building = BuildingNode {
            existing: store.find_building(&building_name).await?,
            name: building_name,
            floors: Vec::new(),
        };

        for floor_name in distinct(&building_rows, |r| r.floor.as_str()) {
            let floor_rows = subgroup(&building_rows, |r| r.floor == floor_name);
            let mut floor = FloorNode {
                existing: store.find_floor(&floor_name).await?,
                name: floor_name,
                rooms: Vec::new(),
            };

            for room_number in distinct(&floor_rows, |r| r.room_number.as_str()) {
                let room_rows = subgroup(&floor_rows, |r| r.room_number == room_number);
                let mut room = RoomNode {
                    existing: store.find_room(&room_number).await?,
                    room_type: room_rows[0].room_type.clone(),
                    number: room_number,
                    modalities: Vec::new(),
                };

                for modality_name in distinct(&room_rows, |r| r.modality.as_str()) {
                    let modality_rows = subgroup(&room_rows, |r| r.modality == modality_name);
                    let mut modality = ModalityNode {
                        existing: store.find_modality(&modality_name).await?,
                        name: modality_name,
                        units: Vec::new(),
                    };

                    for unit_name in distinct(&modality_rows, |r| r.unit.as_str()) {
                        let unit_rows = subgroup(&modality_rows, |r| r.unit == unit_name);
                        let mut unit = UnitNode {
                            existing: store.find_unit(&unit_name).await?,
                            name: unit_name,
                            values: Vec::new(),
                        };

                        for &row in &unit_rows {
                            let magnitude =
                                row.magnitude.ok_or_else(|| missing_magnitude(row))?;
                            unit.values.push(ValueLeaf {
                                magnitude,
                                timestamp: row.timestamp,
                            });
                        }

                        modality.units.push(unit);
                    }

                    room.modalities.push(modality);
                }

                floor.rooms.push(room);
            }

            building.floors.push(floor);
        }

        batch.buildings.push(building);
    }

    debug!(
        buildings = batch.buildings.len(),
        values = batch.value_count(),
        "Assembled hierarchy batch"
    );

    Ok(batch)
}

/// Reject any row whose cell carried no numeric magnitude. Such rows must
/// never reach the store; the whole batch aborts instead of skipping them.
fn validate(rows: &[LongRow]) -> SensorResult<()> {
    match rows.iter().find(|r| r.magnitude.is_none()) {
        Some(row) => Err(missing_magnitude(row)),
        None => Ok(()),
    }
}

fn missing_magnitude(row: &LongRow) -> SensorError {
    SensorError::MissingMagnitude {
        channel: format!(
            "{}-{}-{}{}-{}",
            row.building, row.floor, row.room_type, row.room_number, row.modality
        ),
        timestamp: row.timestamp.to_string(),
        // with no digits in the cell, the unit token is the raw cell verbatim
        raw: row.unit.clone(),
    }
}

/// Distinct key values in first-seen order, like the grouping the store's
/// idempotence contract is defined over.
fn distinct<'a>(rows: &[&'a LongRow], key: impl Fn(&'a LongRow) -> &'a str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for &row in rows {
        let k = key(row);
        if !seen.iter().any(|s| s == k) {
            seen.push(k.to_string());
        }
    }
    seen
}

fn subgroup<'a>(rows: &[&'a LongRow], pred: impl Fn(&'a LongRow) -> bool) -> Vec<&'a LongRow> {
    rows.iter().copied().filter(|&r| pred(r)).collect()
}
