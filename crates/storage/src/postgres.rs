//! PostgreSQL store using sqlx.

use chrono::NaiveDateTime;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info};

use async_trait::async_trait;
use sensor_common::{SensorError, SensorResult};

use crate::hierarchy::{EntityId, HierarchyBatch};
use crate::store::SensorStore;

/// Hierarchy schema. Ids are generated by the database; name columns carry
/// plain indexes, not unique constraints — uniqueness is maintained by the
/// upserter's lookup discipline, matching the inherited schema.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS building (
    id BIGSERIAL PRIMARY KEY,
    building_name VARCHAR(100) NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_building_name ON building (building_name);

CREATE TABLE IF NOT EXISTS floor (
    id BIGSERIAL PRIMARY KEY,
    building_id BIGINT NOT NULL REFERENCES building (id),
    floor_name VARCHAR(10) NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_floor_name ON floor (floor_name);

CREATE TABLE IF NOT EXISTS room (
    id BIGSERIAL PRIMARY KEY,
    floor_id BIGINT NOT NULL REFERENCES floor (id),
    room_number VARCHAR(100) NOT NULL,
    room_type VARCHAR(100) NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_room_number ON room (room_number);

CREATE TABLE IF NOT EXISTS modality (
    id BIGSERIAL PRIMARY KEY,
    room_id BIGINT NOT NULL REFERENCES room (id),
    modality_name VARCHAR(100) NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_modality_name ON modality (modality_name);

CREATE TABLE IF NOT EXISTS unit (
    id BIGSERIAL PRIMARY KEY,
    modality_id BIGINT NOT NULL REFERENCES modality (id),
    unit_name VARCHAR(50) NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_unit_name ON unit (unit_name);

CREATE TABLE IF NOT EXISTS value (
    id BIGSERIAL PRIMARY KEY,
    unit_id BIGINT NOT NULL REFERENCES unit (id),
    value DOUBLE PRECISION NOT NULL,
    time_stamp TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_value_time_stamp ON value (time_stamp)
"#;

/// Database connection pool and hierarchy persistence.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store connection from a database URL.
    pub async fn connect(database_url: &str) -> SensorResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| SensorError::Database(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Create the hierarchy schema if it does not exist.
    pub async fn migrate(&self) -> SensorResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| SensorError::Database(format!("Migration failed: {}", e)))?;
            }
        }

        Ok(())
    }

    async fn find_id(&self, sql: &str, key: &str) -> SensorResult<Option<EntityId>> {
        sqlx::query_scalar::<_, EntityId>(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SensorError::Database(format!("Lookup failed: {}", e)))
    }
}

#[async_trait]
impl SensorStore for PgStore {
    async fn find_building(&self, name: &str) -> SensorResult<Option<EntityId>> {
        self.find_id(
            "SELECT id FROM building WHERE building_name = $1 ORDER BY id LIMIT 1",
            name,
        )
        .await
    }

    async fn find_floor(&self, name: &str) -> SensorResult<Option<EntityId>> {
        self.find_id(
            "SELECT id FROM floor WHERE floor_name = $1 ORDER BY id LIMIT 1",
            name,
        )
        .await
    }

    async fn find_room(&self, number: &str) -> SensorResult<Option<EntityId>> {
        self.find_id(
            "SELECT id FROM room WHERE room_number = $1 ORDER BY id LIMIT 1",
            number,
        )
        .await
    }

    async fn find_modality(&self, name: &str) -> SensorResult<Option<EntityId>> {
        self.find_id(
            "SELECT id FROM modality WHERE modality_name = $1 ORDER BY id LIMIT 1",
            name,
        )
        .await
    }

    async fn find_unit(&self, name: &str) -> SensorResult<Option<EntityId>> {
        self.find_id(
            "SELECT id FROM unit WHERE unit_name = $1 ORDER BY id LIMIT 1",
            name,
        )
        .await
    }

    async fn commit_batch(&self, batch: &HierarchyBatch) -> SensorResult<()> {
        let insert_failed = |e: sqlx::Error| SensorError::Storage(format!("Insert failed: {}", e));

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SensorError::Database(format!("Begin failed: {}", e)))?;

        for b in &batch.buildings {
            let building_id = match b.existing {
                Some(id) => id,
                None => sqlx::query_scalar::<_, EntityId>(
                    "INSERT INTO building (building_name) VALUES ($1) RETURNING id",
                )
                .bind(&b.name)
                .fetch_one(&mut *tx)
                .await
                .map_err(insert_failed)?,
            };

            for f in &b.floors {
                let floor_id = match f.existing {
                    Some(id) => id,
                    None => sqlx::query_scalar::<_, EntityId>(
                        "INSERT INTO floor (building_id, floor_name) VALUES ($1, $2) RETURNING id",
                    )
                    .bind(building_id)
                    .bind(&f.name)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(insert_failed)?,
                };

                for r in &f.rooms {
                    let room_id = match r.existing {
                        Some(id) => id,
                        None => sqlx::query_scalar::<_, EntityId>(
                            "INSERT INTO room (floor_id, room_number, room_type) \
                             VALUES ($1, $2, $3) RETURNING id",
                        )
                        .bind(floor_id)
                        .bind(&r.number)
                        .bind(&r.room_type)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(insert_failed)?,
                    };

                    for m in &r.modalities {
                        let modality_id = match m.existing {
                            Some(id) => id,
                            None => sqlx::query_scalar::<_, EntityId>(
                                "INSERT INTO modality (room_id, modality_name) \
                                 VALUES ($1, $2) RETURNING id",
                            )
                            .bind(room_id)
                            .bind(&m.name)
                            .fetch_one(&mut *tx)
                            .await
                            .map_err(insert_failed)?,
                        };

                        for u in &m.units {
                            let unit_id = match u.existing {
                                Some(id) => id,
                                None => sqlx::query_scalar::<_, EntityId>(
                                    "INSERT INTO unit (modality_id, unit_name) \
                                     VALUES ($1, $2) RETURNING id",
                                )
                                .bind(modality_id)
                                .bind(&u.name)
                                .fetch_one(&mut *tx)
                                .await
                                .map_err(insert_failed)?,
                            };

                            for v in &u.values {
                                sqlx::query(
                                    "INSERT INTO value (unit_id, value, time_stamp) \
                                     VALUES ($1, $2, $3)",
                                )
                                .bind(unit_id)
                                .bind(v.magnitude)
                                .bind(v.timestamp)
                                .execute(&mut *tx)
                                .await
                                .map_err(insert_failed)?;
                            }
                        }
                    }
                }
            }

            debug!(building = %b.name, "Staged building subtree");
        }

        tx.commit()
            .await
            .map_err(|e| SensorError::Storage(format!("Commit failed: {}", e)))?;

        info!(
            values = batch.value_count(),
            buildings = batch.buildings.len(),
            "Committed ingestion batch"
        );

        Ok(())
    }

    async fn last_update(&self) -> SensorResult<Option<NaiveDateTime>> {
        sqlx::query_scalar::<_, Option<NaiveDateTime>>("SELECT MAX(time_stamp) FROM value")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SensorError::Database(format!("Query failed: {}", e)))
    }
}
