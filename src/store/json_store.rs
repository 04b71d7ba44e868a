//! JSON store persistence
//!
//! The store is a single JSON file holding every bar record. Writes are
//! wholesale: serialize the full record list, replace the file. Reads
//! accept the shapes the store has had over its history (a bare array,
//! or an object wrapping the array under `bars` or `data`) and always
//! hand back a plain `Vec<BarRecord>`.

use crate::error::{Error, Result};
use crate::models::BarRecord;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_STORE_PATH: &str = "data/bars.json";

/// The store file's accepted top-level shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoreShape {
    Array(Vec<BarRecord>),
    Bars { bars: Vec<BarRecord> },
    Data { data: Vec<BarRecord> },
}

impl StoreShape {
    fn into_records(self) -> Vec<BarRecord> {
        match self {
            StoreShape::Array(records) => records,
            StoreShape::Bars { bars } => bars,
            StoreShape::Data { data } => data,
        }
    }
}

/// Load the store, failing when the file is missing or unparsable.
///
/// Passes that enrich existing records use this: running them against a
/// store that does not exist is an operator error, not an empty dataset.
pub fn load_store(path: &Path) -> Result<Vec<BarRecord>> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "store file {} does not exist (run import first?)",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(path)?;
    let shape: StoreShape = serde_json::from_str(&text)?;
    let records = shape.into_records();

    tracing::debug!(path = %path.display(), records = records.len(), "Loaded store");

    Ok(records)
}

/// Load the store, treating a missing file as empty.
///
/// The import pass uses this to pick up ids from a previous store without
/// requiring one to exist. A file that exists but does not parse is still
/// an error; silently discarding a corrupt store would lose data on the
/// next write.
pub fn load_store_if_exists(path: &Path) -> Result<Vec<BarRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    load_store(path)
}

/// Rewrite the store file with the full record list.
///
/// Pretty-printed array with a trailing newline. Parent directories are
/// created as needed.
pub fn save_store(path: &Path, records: &[BarRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut text = serde_json::to_string_pretty(records)?;
    text.push('\n');
    std::fs::write(path, text)?;

    tracing::info!(path = %path.display(), records = records.len(), "Store written");

    Ok(())
}
