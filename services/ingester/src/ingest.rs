//! Ingestion pipeline: fetch, reshape, upsert, commit.

use anyhow::Result;
use tracing::{error, info, instrument};

use feed_parser::reshape;
use ingestion::build_hierarchy;
use storage::{PgStore, SensorStore};

use crate::config::IngesterConfig;
use crate::sources::{FeedSource, HttpFeedSource};

/// Main ingestion pipeline.
pub struct IngestionPipeline {
    config: IngesterConfig,
    store: PgStore,
    source: Box<dyn FeedSource>,
}

impl IngestionPipeline {
    /// Connect to the store, bootstrap the schema, and build the feed source.
    pub async fn new(config: &IngesterConfig) -> Result<Self> {
        let store = PgStore::connect(&config.database_url).await?;
        store.migrate().await?;

        let source = HttpFeedSource::new(
            &config.feed_url,
            std::time::Duration::from_secs(config.request_timeout_secs),
        )?;

        Ok(Self {
            config: config.clone(),
            store,
            source: Box::new(source),
        })
    }

    /// Run ingestion cycles forever.
    pub async fn run_forever(&self) -> Result<()> {
        loop {
            info!("Starting ingestion cycle");

            if let Err(e) = self.run_once().await {
                error!(error = %e, "Ingestion cycle failed");
            }

            info!(
                interval_secs = self.config.poll_interval_secs,
                "Sleeping until next cycle"
            );
            tokio::time::sleep(std::time::Duration::from_secs(
                self.config.poll_interval_secs,
            ))
            .await;
        }
    }

    /// One all-or-nothing ingestion batch.
    ///
    /// Any failure — network, parse, validation, or storage — leaves the
    /// store untouched for this cycle.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<()> {
        let since = self.store.last_update().await?;
        info!(since = ?since, "Requesting feed window");

        let raw = self.source.fetch(since).await?;
        let rows = reshape(&raw)?;
        info!(rows = rows.len(), "Reshaped snapshot");

        let batch = build_hierarchy(&rows, &self.store).await?;
        let new_nodes = batch.new_node_counts();
        self.store.commit_batch(&batch).await?;

        info!(
            values = batch.value_count(),
            new_buildings = new_nodes.buildings,
            new_floors = new_nodes.floors,
            new_rooms = new_nodes.rooms,
            new_modalities = new_nodes.modalities,
            new_units = new_nodes.units,
            "Ingestion cycle committed"
        );

        Ok(())
    }
}
