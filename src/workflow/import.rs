//! CSV import pass
//!
//! Reads the tabular source, gives every bar a stable id, and rewrites
//! the JSON store. Re-importing is safe: records whose name already
//! exists in the store keep their old id, so links into the store
//! survive a fresh spreadsheet export.

use crate::models::{slugify, BarRecord};
use crate::store;
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Counters for one import run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub records_imported: usize,
    pub ids_preserved: usize,
    pub ids_assigned: usize,
    pub skipped_unnamed: usize,
}

/// Import a CSV file into the JSON store.
///
/// # Arguments
/// * `csv_path` - Tabular source (aliased headers accepted)
/// * `store_path` - Store to rewrite; read first for id preservation
pub fn run(csv_path: &Path, store_path: &Path) -> Result<ImportSummary> {
    let rows = store::read_csv_table(csv_path)
        .with_context(|| format!("failed to read {}", csv_path.display()))?;

    let existing = store::load_store_if_exists(store_path)
        .with_context(|| format!("failed to read existing store {}", store_path.display()))?;

    // Previous store's name → ids mapping, kept in store order. A
    // re-imported row keeps its id as long as the bar name is unchanged;
    // rows sharing a name claim the stored ids one by one.
    let mut known_ids: HashMap<String, Vec<String>> = HashMap::new();
    for bar in existing {
        known_ids.entry(bar.name).or_default().push(bar.id);
    }

    let mut summary = ImportSummary {
        rows_read: rows.len(),
        ..Default::default()
    };
    let mut taken = HashSet::new();
    let mut records: Vec<BarRecord> = Vec::new();

    for (index, mut record) in rows.into_iter().enumerate() {
        if record.name.trim().is_empty() {
            warn!(row = index + 1, "Skipping row without a bar name");
            summary.skipped_unnamed += 1;
            continue;
        }

        let (base, preserved) = if !record.id.trim().is_empty() {
            (record.id.trim().to_string(), true)
        } else if let Some(id) = claim_known_id(&mut known_ids, &record.name) {
            (id, true)
        } else {
            (slug_or_fallback(&record.name), false)
        };

        record.id = unique_id(&base, &mut taken);
        if preserved {
            summary.ids_preserved += 1;
        } else {
            summary.ids_assigned += 1;
        }

        if record.last_updated.is_none() {
            record.touch();
        }

        records.push(record);
    }

    summary.records_imported = records.len();

    store::save_store(store_path, &records)
        .with_context(|| format!("failed to write store {}", store_path.display()))?;

    info!(
        rows = summary.rows_read,
        imported = summary.records_imported,
        preserved = summary.ids_preserved,
        assigned = summary.ids_assigned,
        skipped = summary.skipped_unnamed,
        "Import complete"
    );

    Ok(summary)
}

/// Slug for a name, with a fallback for names that fold to nothing.
fn slug_or_fallback(name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        "bar".to_string()
    } else {
        slug
    }
}

/// Take the next unclaimed store id recorded for `name`.
fn claim_known_id(known: &mut HashMap<String, Vec<String>>, name: &str) -> Option<String> {
    let ids = known.get_mut(name)?;
    if ids.is_empty() {
        return None;
    }
    Some(ids.remove(0))
}

/// Claim `base`, or the first free `base-2`, `base-3`, ... variant.
fn unique_id(base: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
