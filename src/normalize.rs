//! Feed payload normalization into flat tabular rows.
//!
//! A GBFS feed document wraps its records in a `data` section whose single
//! record-bearing collection is keyed by feed type (`stations` for station
//! information and status, `plans` for pricing, `regions` for system
//! regions). The container keys are a closed list: supporting a new feed
//! type means extending [`CONTAINER_KEYS`], never guessing at runtime.

use serde_json::{Map, Value};

use crate::error::ShapeError;

/// Known record-container keys, probed in priority order.
pub const CONTAINER_KEYS: [&str; 3] = ["stations", "plans", "regions"];

/// One flattened record: dotted field path to value.
pub type NormalizedRow = Map<String, Value>;

/// Flattens a feed document into a uniform row set.
///
/// The record set is the first [`CONTAINER_KEYS`] sequence found in the
/// document's `data` section (the document itself when no `data` key
/// exists). Documents without a known container collapse to a single row —
/// except an empty data section, which is zero records, not one empty row.
/// Nested objects become dotted-path columns; sequences pass through as one
/// column each, final column typing being the sink's concern.
pub fn normalize(feed: &Value) -> Result<Vec<NormalizedRow>, ShapeError> {
    let doc = feed.as_object().ok_or(ShapeError::InvalidFeedShape)?;
    let data = doc.get("data").unwrap_or(feed);

    if let Some(section) = data.as_object() {
        for key in CONTAINER_KEYS {
            if let Some(records) = section.get(key).and_then(Value::as_array) {
                return Ok(records.iter().map(flatten_record).collect());
            }
        }
        if section.is_empty() {
            return Ok(Vec::new());
        }
    }

    Ok(vec![flatten_record(data)])
}

/// Flattens one record. Non-object records are carried under a `value` column.
fn flatten_record(record: &Value) -> NormalizedRow {
    let mut row = Map::new();
    match record {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(key, value, &mut row);
            }
        }
        other => {
            row.insert("value".to_string(), other.clone());
        }
    }
    row
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(&format!("{prefix}.{key}"), child, out);
            }
        }
        // Sequences, scalars, and empty objects stay as single columns.
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_stations() {
        let feed = json!({"data": {"stations": [{"id": "1", "lat": 1.0}]}});
        let rows = normalize(&feed).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&json!("1")));
        assert_eq!(rows[0].get("lat"), Some(&json!(1.0)));
    }

    #[test]
    fn test_normalize_flattens_nested_objects_to_dotted_paths() {
        let feed = json!({"data": {"stations": [
            {"id": "1", "rental_uris": {"android": "a://x", "ios": "i://x"}}
        ]}});
        let rows = normalize(&feed).unwrap();
        assert_eq!(rows[0].get("rental_uris.android"), Some(&json!("a://x")));
        assert_eq!(rows[0].get("rental_uris.ios"), Some(&json!("i://x")));
        assert!(!rows[0].contains_key("rental_uris"));
    }

    #[test]
    fn test_normalize_passes_sequences_through_as_columns() {
        let feed = json!({"data": {"plans": [
            {"plan_id": "p1", "per_min_pricing": [{"start": 0, "rate": 0.1}]}
        ]}});
        let rows = normalize(&feed).unwrap();
        assert_eq!(
            rows[0].get("per_min_pricing"),
            Some(&json!([{"start": 0, "rate": 0.1}]))
        );
    }

    #[test]
    fn test_normalize_container_priority_order() {
        // `stations` wins over `plans` when both are present.
        let feed = json!({"data": {
            "plans": [{"plan_id": "p"}],
            "stations": [{"station_id": "s"}]
        }});
        let rows = normalize(&feed).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains_key("station_id"));
    }

    #[test]
    fn test_normalize_empty_data_section_yields_no_rows() {
        let rows = normalize(&json!({"data": {}})).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_normalize_empty_container_yields_no_rows() {
        let rows = normalize(&json!({"data": {"regions": []}})).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_normalize_unknown_container_falls_back_to_single_row() {
        // system_information has no list container: the data section itself
        // is the one record.
        let feed = json!({"data": {"system_id": "tor", "name": "Bike Share Toronto"}});
        let rows = normalize(&feed).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("system_id"), Some(&json!("tor")));
    }

    #[test]
    fn test_normalize_document_without_data_key_uses_document_itself() {
        let feed = json!({"stations": [{"station_id": "s1"}]});
        let rows = normalize(&feed).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("station_id"), Some(&json!("s1")));
    }

    #[test]
    fn test_normalize_non_object_root_is_invalid_feed_shape() {
        assert_eq!(normalize(&json!([1])), Err(ShapeError::InvalidFeedShape));
        assert_eq!(normalize(&json!(null)), Err(ShapeError::InvalidFeedShape));
    }

    #[test]
    fn test_normalize_non_object_records_use_value_column() {
        let feed = json!({"data": {"regions": [{"region_id": "r1"}, "r2"]}});
        let rows = normalize(&feed).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("value"), Some(&json!("r2")));
    }

    #[test]
    fn test_normalize_row_key_order_is_deterministic() {
        let feed = json!({"data": {"stations": [{"b": 1, "a": 2, "c": {"z": 3, "y": 4}}]}});
        let keys: Vec<_> = normalize(&feed).unwrap()[0].keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a", "c.z", "c.y"]);
    }
}
