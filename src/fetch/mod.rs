mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::error::FetchError;

/// Fetches a URL and decodes the response body as a JSON tree.
///
/// Transport failures, non-success statuses, and undecodable bodies all
/// surface as [`FetchError`] carrying the offending URL.
pub async fn fetch_json<C: HttpClient>(client: &C, url: &str) -> Result<Value, FetchError> {
    let target = reqwest::Url::parse(url).map_err(|e| FetchError::new(url, e))?;
    let req = reqwest::Request::new(reqwest::Method::GET, target);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| FetchError::new(url, e))?
        .error_for_status()
        .map_err(|e| FetchError::new(url, e))?;

    resp.json::<Value>()
        .await
        .map_err(|e| FetchError::new(url, e))
}

/// Reads and parses a JSON snapshot from disk.
pub fn load_json_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
