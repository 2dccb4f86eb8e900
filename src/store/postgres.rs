use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use super::{BronzeStore, RawFeedRecord};
use crate::error::StoreError;

const INSERT_SQL: &str = "\
INSERT INTO bronze.gbfs_feed_raw (
    feed_type,
    source_name,
    load_batch_id,
    file_name,
    api_url,
    version,
    raw_payload
)
VALUES ($1, $2, $3, $4, $5, $6, $7)";

/// Postgres-backed bronze store. Append-only; batch-scoped replacement is a
/// downstream policy applied via `load_batch_id`.
pub struct PgBronzeStore {
    pool: PgPool,
}

impl PgBronzeStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl BronzeStore for PgBronzeStore {
    async fn append(&self, record: &RawFeedRecord) -> Result<(), StoreError> {
        debug!(feed = %record.feed_type, batch = %record.load_batch_id, "Inserting bronze record");

        sqlx::query(INSERT_SQL)
            .bind(&record.feed_type)
            .bind(&record.source_name)
            .bind(record.load_batch_id)
            .bind(&record.file_name)
            .bind(&record.api_url)
            .bind(&record.version)
            .bind(&record.raw_payload)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::new(&record.feed_type, e))?;

        Ok(())
    }
}
