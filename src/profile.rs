//! Shallow structural metrics for discovery snapshots.

use serde_json::Value;

use crate::error::ShapeError;

/// Lightweight length metrics over a discovery snapshot.
///
/// Equal metrics for two snapshots do NOT guarantee structural identity —
/// this is a cheap pre-check, necessary but not sufficient. Use
/// [`crate::diff::compare`] for the authoritative verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMetrics {
    pub top_level_key_count: usize,
    /// Key count of the nested `data` object, when present.
    pub data_key_count: Option<usize>,
    /// Length of the `feeds` sequence under the given language, when present.
    pub feed_count: Option<usize>,
}

/// Computes [`SchemaMetrics`] for a snapshot.
///
/// Fails with [`ShapeError::InvalidShape`] when the root is not an object.
pub fn profile(tree: &Value, language: &str) -> Result<SchemaMetrics, ShapeError> {
    let root = tree.as_object().ok_or(ShapeError::InvalidShape)?;

    let data = root.get("data").and_then(Value::as_object);
    let feed_count = data
        .and_then(|d| d.get(language))
        .and_then(Value::as_object)
        .map(|lang| lang.get("feeds").and_then(Value::as_array).map_or(0, Vec::len));

    Ok(SchemaMetrics {
        top_level_key_count: root.len(),
        data_key_count: data.map(|d| d.len()),
        feed_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compare;
    use serde_json::json;

    #[test]
    fn test_profile_flat_object() {
        let metrics = profile(&json!({"a": 1, "b": 2}), "en").unwrap();
        assert_eq!(metrics.top_level_key_count, 2);
        assert_eq!(metrics.data_key_count, None);
        assert_eq!(metrics.feed_count, None);
    }

    #[test]
    fn test_profile_full_discovery_document() {
        let doc = json!({
            "last_updated": 1700000000,
            "ttl": 60,
            "data": {"en": {"feeds": [{"name": "a", "url": "u"}, {"name": "b", "url": "v"}]}}
        });
        let metrics = profile(&doc, "en").unwrap();
        assert_eq!(metrics.top_level_key_count, 3);
        assert_eq!(metrics.data_key_count, Some(1));
        assert_eq!(metrics.feed_count, Some(2));
    }

    #[test]
    fn test_profile_language_without_feeds_counts_zero() {
        let doc = json!({"data": {"en": {}}});
        let metrics = profile(&doc, "en").unwrap();
        assert_eq!(metrics.feed_count, Some(0));
    }

    #[test]
    fn test_profile_missing_language_has_no_feed_count() {
        let doc = json!({"data": {"fr": {"feeds": []}}});
        let metrics = profile(&doc, "en").unwrap();
        assert_eq!(metrics.data_key_count, Some(1));
        assert_eq!(metrics.feed_count, None);
    }

    #[test]
    fn test_profile_non_object_root_is_invalid_shape() {
        assert_eq!(profile(&json!([1, 2]), "en"), Err(ShapeError::InvalidShape));
        assert_eq!(profile(&json!("x"), "en"), Err(ShapeError::InvalidShape));
    }

    #[test]
    fn test_metric_mismatch_implies_nonempty_diff() {
        // The profiler is a sound pre-filter: differing metrics must mean the
        // full comparison also finds discrepancies.
        let pairs = [
            (json!({"a": 1}), json!({"a": 1, "b": 2})),
            (
                json!({"data": {"en": {"feeds": [{"name": "a", "url": "u"}]}}}),
                json!({"data": {"en": {"feeds": []}}}),
            ),
            (json!({"data": {"x": 1}}), json!({"data": {"x": 1, "y": 2}})),
        ];
        for (t1, t2) in &pairs {
            assert_ne!(profile(t1, "en").unwrap(), profile(t2, "en").unwrap());
            assert!(!compare(t1, t2).is_empty());
        }
    }
}
