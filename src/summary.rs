//! Per-source extraction summaries.
//!
//! Each discovery source gets a `feeds_summary.json` written beside its CSVs
//! after an extraction run. These snapshots are what the `compare` workflow
//! is pointed at when cross-checking two sources.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of one feed within an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedStatus {
    pub url: String,
    pub has_data: bool,
    pub error: Option<String>,
}

/// Summary document for one discovery source's extraction.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedSummary {
    pub resource: String,
    pub timestamp: DateTime<Utc>,
    pub feeds_count: usize,
    pub feeds: HashMap<String, FeedStatus>,
}

impl FeedSummary {
    pub fn new(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            timestamp: Utc::now(),
            feeds_count: 0,
            feeds: HashMap::new(),
        }
    }

    pub fn record_success(&mut self, name: &str, url: &str, has_data: bool) {
        self.feeds.insert(
            name.to_string(),
            FeedStatus {
                url: url.to_string(),
                has_data,
                error: None,
            },
        );
        self.feeds_count = self.feeds.len();
    }

    pub fn record_failure(&mut self, name: &str, url: &str, error: &str) {
        self.feeds.insert(
            name.to_string(),
            FeedStatus {
                url: url.to_string(),
                has_data: false,
                error: Some(error.to_string()),
            },
        );
        self.feeds_count = self.feeds.len();
    }

    /// Writes the summary as `feeds_summary.json` inside `dir`.
    pub fn write(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("feeds_summary.json");
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_summary_counts_and_statuses() {
        let mut summary = FeedSummary::new("bike-share-json");
        summary.record_success("station_information", "https://x/si", true);
        summary.record_failure("system_regions", "https://x/sr", "HTTP 500");

        assert_eq!(summary.feeds_count, 2);
        assert!(summary.feeds["station_information"].has_data);
        assert!(summary.feeds["station_information"].error.is_none());
        assert!(!summary.feeds["system_regions"].has_data);
        assert_eq!(summary.feeds["system_regions"].error.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn test_summary_write_roundtrip() {
        let dir = env::temp_dir().join("gbfs_batch_loader_test_summary");
        let _ = fs::remove_dir_all(&dir);

        let mut summary = FeedSummary::new("gbfs-specification");
        summary.record_success("station_status", "https://x/ss", true);
        summary.write(&dir).unwrap();

        let content = fs::read_to_string(dir.join("feeds_summary.json")).unwrap();
        let parsed: FeedSummary = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.resource, "gbfs-specification");
        assert_eq!(parsed.feeds_count, 1);

        fs::remove_dir_all(&dir).unwrap();
    }
}
