//! Bronze-layer persistence for raw feed payloads.
//!
//! [`RawFeedRecord`] is the unit of provenance: every record from one
//! ingestion run carries the same `load_batch_id`, which is what any later
//! replace-or-rollback policy keys on. [`BronzeStore`] is the append-one
//! capability; [`PgBronzeStore`] implements it against Postgres.

mod postgres;

pub use postgres::PgBronzeStore;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::discovery::FeedDescriptor;
use crate::error::StoreError;

/// One raw feed payload with batch provenance. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct RawFeedRecord {
    pub feed_type: String,
    pub source_name: String,
    pub load_batch_id: Uuid,
    pub file_name: String,
    pub api_url: String,
    pub version: Option<String>,
    pub raw_payload: Value,
}

impl RawFeedRecord {
    /// Builds a record for one fetched feed.
    ///
    /// `version` is lifted from the payload's top-level `version` key: a
    /// string verbatim, any other non-null scalar as its JSON text.
    pub fn new(
        batch_id: Uuid,
        source_name: &str,
        feed: &FeedDescriptor,
        payload: Value,
    ) -> Self {
        let version = payload.get("version").and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });

        Self {
            feed_type: feed.name.clone(),
            source_name: source_name.to_string(),
            load_batch_id: batch_id,
            file_name: format!("{}.json", feed.name),
            api_url: feed.url.clone(),
            version,
            raw_payload: payload,
        }
    }
}

/// Append-one capability for the raw feed store.
///
/// Whether writes are append-only or replace-by-source is the
/// implementation's policy; a record carries enough provenance for either.
#[async_trait]
pub trait BronzeStore: Send + Sync {
    async fn append(&self, record: &RawFeedRecord) -> Result<(), StoreError>;
}
