//! Recursive structural diff between two JSON trees.
//!
//! Used to verify that two independently fetched discovery snapshots describe
//! the same schema before either is trusted. Every discrepancy is reported as
//! a path-addressed [`DiffEntry`]; two structurally identical trees produce an
//! empty list.

use serde_json::Value;

/// One discrepancy between two trees.
///
/// `path` addresses the location with `.` for object keys and `[i]` for
/// sequence indices (e.g. `data.en.feeds[2].url`); the root is the empty
/// string. A key present on only one side is reported with the missing side
/// as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    pub path: String,
    pub left: Option<Value>,
    pub right: Option<Value>,
}

/// Compares two JSON trees depth-first and returns every discrepancy.
///
/// Output order is deterministic: object keys are walked in the left side's
/// order followed by keys unique to the right side, sequences positionally.
/// Sequences of different length produce a single entry carrying both full
/// sequences, with no per-element detail.
pub fn compare(left: &Value, right: &Value) -> Vec<DiffEntry> {
    let mut diffs = Vec::new();
    deep_diff("", left, right, &mut diffs);
    diffs
}

fn deep_diff(path: &str, left: &Value, right: &Value, out: &mut Vec<DiffEntry>) {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            for (key, left_child) in l {
                let child_path = join_key(path, key);
                match r.get(key) {
                    Some(right_child) => deep_diff(&child_path, left_child, right_child, out),
                    None => out.push(DiffEntry {
                        path: child_path,
                        left: Some(left_child.clone()),
                        right: None,
                    }),
                }
            }
            for (key, right_child) in r {
                if !l.contains_key(key) {
                    out.push(DiffEntry {
                        path: join_key(path, key),
                        left: None,
                        right: Some(right_child.clone()),
                    });
                }
            }
        }
        (Value::Array(l), Value::Array(r)) => {
            if l.len() != r.len() {
                // Length mismatches are reported coarsely: the whole pair of
                // sequences, not an element-by-element explanation.
                out.push(DiffEntry {
                    path: path.to_string(),
                    left: Some(left.clone()),
                    right: Some(right.clone()),
                });
            } else {
                for (i, (left_child, right_child)) in l.iter().zip(r).enumerate() {
                    deep_diff(&format!("{path}[{i}]"), left_child, right_child, out);
                }
            }
        }
        // Incompatible node kinds: report both full subtrees, do not recurse.
        // `null` is its own kind, distinct from an empty object or sequence.
        _ if kind(left) != kind(right) => {
            out.push(DiffEntry {
                path: path.to_string(),
                left: Some(left.clone()),
                right: Some(right.clone()),
            });
        }
        _ => {
            if left != right {
                out.push(DiffEntry {
                    path: path.to_string(),
                    left: Some(left.clone()),
                    right: Some(right.clone()),
                });
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
