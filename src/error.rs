//! Typed errors for the feed pipeline.

use thiserror::Error;

/// A document root had the wrong shape for the operation applied to it.
///
/// Fatal to the single call that produced it, never to a whole batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The profiler was given a root that is not a JSON object.
    #[error("invalid shape: document root is not a JSON object")]
    InvalidShape,
    /// The normalizer was given a feed document that is not a JSON object.
    #[error("invalid feed shape: feed document root is not a JSON object")]
    InvalidFeedShape,
}

/// Fetching or decoding a feed payload failed.
#[derive(Debug, Error)]
#[error("fetching {url} failed")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub cause: Box<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    pub fn new(
        url: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            url: url.into(),
            cause: cause.into(),
        }
    }
}

/// The bronze store rejected a record.
///
/// Carries a rendered message rather than a backend error type so that any
/// [`crate::store::BronzeStore`] implementation can produce it.
#[derive(Debug, Error, Clone)]
#[error("store rejected {feed_type}: {message}")]
pub struct StoreError {
    pub feed_type: String,
    pub message: String,
}

impl StoreError {
    pub fn new(feed_type: impl Into<String>, message: impl ToString) -> Self {
        Self {
            feed_type: feed_type.into(),
            message: message.to_string(),
        }
    }
}

/// A single feed's failure within an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
