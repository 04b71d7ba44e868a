//! CSV export pass
//!
//! Snapshot of the JSON store in the fixed tabular form, for spreadsheet
//! use and sharing. Read-only against the store.

use crate::store;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Counters for one export run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub records_exported: usize,
}

/// Export the store to a CSV snapshot.
pub fn run(store_path: &Path, out_path: &Path) -> Result<ExportSummary> {
    let records = store::load_store(store_path)
        .with_context(|| format!("failed to read store {}", store_path.display()))?;

    store::write_csv_table(out_path, &records)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    let summary = ExportSummary {
        records_exported: records.len(),
    };

    info!(
        records = summary.records_exported,
        out = %out_path.display(),
        "Export complete"
    );

    Ok(summary)
}
