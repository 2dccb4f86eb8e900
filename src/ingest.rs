//! Batch ingestion of fetched feed payloads into the bronze store.

use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::discovery::FeedDescriptor;
use crate::error::{FetchError, IngestError};
use crate::store::{BronzeStore, RawFeedRecord};

/// Outcome of one ingestion run over one source.
///
/// A returned report never implies full success — callers must consult
/// `failures` alongside `written`.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub written: usize,
    pub failures: Vec<FeedFailure>,
}

/// One feed's failure, kept with the feed name for reporting.
#[derive(Debug)]
pub struct FeedFailure {
    pub feed: String,
    pub error: IngestError,
}

/// Persists each fetched feed as a [`RawFeedRecord`] tagged with `batch_id`.
///
/// Feeds are independent: a fetch error carried in `fetched` or a store
/// rejection fails that feed alone and is accumulated into the report; the
/// remaining feeds still persist. The batch id is generated once per run by
/// the caller and threaded through unchanged.
pub async fn ingest<S: BronzeStore + ?Sized>(
    batch_id: Uuid,
    source_name: &str,
    fetched: Vec<(FeedDescriptor, Result<Value, FetchError>)>,
    store: &S,
) -> IngestReport {
    let mut report = IngestReport::default();

    for (feed, payload) in fetched {
        match payload {
            Ok(payload) => {
                let record = RawFeedRecord::new(batch_id, source_name, &feed, payload);
                match store.append(&record).await {
                    Ok(()) => {
                        info!(feed = %feed.name, "Feed persisted");
                        report.written += 1;
                    }
                    Err(e) => {
                        error!(feed = %feed.name, error = %e, "Store write failed");
                        report.failures.push(FeedFailure {
                            feed: feed.name,
                            error: e.into(),
                        });
                    }
                }
            }
            Err(e) => {
                error!(feed = %feed.name, error = %e, "Feed fetch failed");
                report.failures.push(FeedFailure {
                    feed: feed.name,
                    error: e.into(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct MemoryStore {
        records: Mutex<Vec<RawFeedRecord>>,
        reject: Option<String>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                reject: None,
            }
        }

        fn rejecting(feed_type: &str) -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                reject: Some(feed_type.to_string()),
            }
        }
    }

    #[async_trait]
    impl BronzeStore for MemoryStore {
        async fn append(&self, record: &RawFeedRecord) -> Result<(), StoreError> {
            if self.reject.as_deref() == Some(record.feed_type.as_str()) {
                return Err(StoreError::new(&record.feed_type, "constraint violation"));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn feed(name: &str) -> FeedDescriptor {
        FeedDescriptor {
            name: name.to_string(),
            url: format!("https://x/{name}"),
        }
    }

    #[tokio::test]
    async fn test_ingest_writes_all_successful_feeds() {
        let store = MemoryStore::new();
        let batch_id = Uuid::new_v4();
        let fetched = vec![
            (feed("station_information"), Ok(json!({"version": "2.3", "data": {"stations": []}}))),
            (feed("system_regions"), Ok(json!({"data": {"regions": []}}))),
        ];

        let report = ingest(batch_id, "bike-share-json", fetched, &store).await;

        assert_eq!(report.written, 2);
        assert!(report.failures.is_empty());

        let records = store.records.lock().unwrap();
        assert!(records.iter().all(|r| r.load_batch_id == batch_id));
        assert_eq!(records[0].version.as_deref(), Some("2.3"));
        assert_eq!(records[1].version, None);
    }

    #[tokio::test]
    async fn test_one_fetch_failure_does_not_abort_the_rest() {
        let store = MemoryStore::new();
        let fetched = vec![
            (feed("one"), Ok(json!({"data": {}}))),
            (
                feed("two"),
                Err(FetchError::new("https://x/two", "connection refused")),
            ),
            (feed("three"), Ok(json!({"data": {}}))),
        ];

        let report = ingest(Uuid::new_v4(), "src", fetched, &store).await;

        assert_eq!(report.written, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].feed, "two");
        assert!(matches!(report.failures[0].error, IngestError::Fetch(_)));

        let persisted: Vec<_> = store
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.feed_type.clone())
            .collect();
        assert_eq!(persisted, vec!["one", "three"]);
    }

    #[tokio::test]
    async fn test_store_rejection_is_isolated_per_feed() {
        let store = MemoryStore::rejecting("two");
        let fetched = vec![
            (feed("one"), Ok(json!({}))),
            (feed("two"), Ok(json!({}))),
            (feed("three"), Ok(json!({}))),
        ];

        let report = ingest(Uuid::new_v4(), "src", fetched, &store).await;

        assert_eq!(report.written, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].feed, "two");
        assert!(matches!(report.failures[0].error, IngestError::Store(_)));
    }

    #[tokio::test]
    async fn test_ingest_empty_feed_list() {
        let store = MemoryStore::new();
        let report = ingest(Uuid::new_v4(), "src", Vec::new(), &store).await;
        assert_eq!(report.written, 0);
        assert!(report.failures.is_empty());
    }
}
