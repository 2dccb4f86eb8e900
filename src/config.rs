//! Runtime configuration, built once and threaded into entry points.

use anyhow::{Context, Result};

use crate::discovery::DEFAULT_LANGUAGE;

/// Catalog resource names treated as discovery sources. The dataset exposes
/// the same live endpoints through both, and both are processed
/// independently.
pub const DEFAULT_RESOURCE_NAMES: [&str; 2] = [
    "bike-share-json",
    "bike-share-gbfs-general-bikeshare-feed-specification",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the open-data catalog (CKAN portal).
    pub base_url: String,
    /// Catalog dataset holding the discovery resources.
    pub dataset_id: String,
    /// Resource names accepted as discovery sources.
    pub resource_names: Vec<String>,
    /// Language code for the discovery walk.
    pub language: String,
    /// Default directory for extracted CSVs and summaries.
    pub output_dir: String,
    /// Bronze store connection string; only the load command needs it.
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Builds the config from environment variables (after `.env` loading).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BASE_URL").context("BASE_URL must be set")?;
        let dataset_id = std::env::var("DATASET_ID").context("DATASET_ID must be set")?;
        let output_dir =
            std::env::var("OUTPUT_FOLDER").unwrap_or_else(|_| "data/output_data".to_string());
        let language =
            std::env::var("GBFS_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string());
        let database_url = std::env::var("DATABASE_URL").ok();

        Ok(Self {
            base_url,
            dataset_id,
            resource_names: DEFAULT_RESOURCE_NAMES.iter().map(|s| s.to_string()).collect(),
            language,
            output_dir,
            database_url,
        })
    }
}
