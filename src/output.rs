//! CSV persistence for normalized feed rows.

use anyhow::Result;
use csv::WriterBuilder;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::normalize::NormalizedRow;

/// Writes a row set as a CSV file at `path`, creating parent directories.
///
/// The header is the union of row keys in first-seen order; cells missing
/// from a row are left empty. String values are written raw, everything else
/// as its JSON text. An empty row set still produces the (empty) file.
pub fn write_rows(path: &Path, rows: &[NormalizedRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if rows.is_empty() {
        std::fs::File::create(path)?;
        debug!(path = %path.display(), "No rows, wrote empty CSV");
        return Ok(());
    }

    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = columns.len(),
        "Writing CSV"
    );

    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|col| cell(row.get(*col))))?;
    }
    writer.flush()?;

    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
