//! Discovery document walking.

use serde_json::Value;
use tracing::warn;

/// Language code used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A named feed advertised by a discovery document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDescriptor {
    pub name: String,
    pub url: String,
}

/// Extracts the feed list from a discovery document.
///
/// Walks the fixed `data.<language>.feeds` path. A missing segment at any
/// level yields an empty list rather than an error — discovery documents may
/// legitimately carry zero feeds for a run. Entries missing `name` or `url`
/// are skipped and reported on the log; partial results beat total failure.
pub fn list_feeds(discovery: &Value, language: &str) -> Vec<FeedDescriptor> {
    let Some(entries) = discovery
        .get("data")
        .and_then(|data| data.get(language))
        .and_then(|lang| lang.get("feeds"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let name = entry.get("name").and_then(Value::as_str);
            let url = entry.get("url").and_then(Value::as_str);
            match (name, url) {
                (Some(name), Some(url)) => Some(FeedDescriptor {
                    name: name.to_string(),
                    url: url.to_string(),
                }),
                (None, _) => {
                    warn!(index, missing = "name", "Skipping malformed feed entry");
                    None
                }
                (_, None) => {
                    warn!(index, missing = "url", "Skipping malformed feed entry");
                    None
                }
            }
        })
        .collect()
}
