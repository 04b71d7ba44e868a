//! Nominatim geocoding pass
//!
//! Walks the store sequentially, resolves each record's address, and
//! looks up coordinates for the records that need them. Lookup misses
//! and transport failures are per-record events: the record keeps its
//! prior state and the run continues. The store is rewritten once, at
//! the end.

use crate::models::BarRecord;
use crate::services::NominatimClient;
use crate::store;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Counters for one geocoding run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeocodeSummary {
    pub processed: usize,
    pub updated: usize,
    pub skipped_resolved: usize,
    pub skipped_no_address: usize,
    pub misses: usize,
    pub failures: usize,
    /// Remote lookups actually issued (memoized hits excluded).
    pub remote_calls: u64,
}

/// What the pass does with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GeocodeAction {
    /// Look up this address.
    Lookup(String),
    /// No usable address; nothing to look up.
    NoAddress,
    /// Real coordinates already present; left alone without `--force`.
    AlreadyResolved,
}

/// Decide what to do with a record.
///
/// Without `force`, records carrying real (non-placeholder) coordinates
/// are skipped; missing or placeholder coordinates qualify for a lookup.
fn action_for(record: &BarRecord, force: bool) -> GeocodeAction {
    if !force && !record.coordinates_overwritable() {
        return GeocodeAction::AlreadyResolved;
    }
    match record.resolved_address() {
        Some(address) => GeocodeAction::Lookup(address),
        None => GeocodeAction::NoAddress,
    }
}

/// Run the geocoding pass over the whole store.
pub async fn run(store_path: &Path, force: bool) -> Result<GeocodeSummary> {
    let mut records = store::load_store(store_path)
        .with_context(|| format!("failed to read store {}", store_path.display()))?;

    let client = NominatimClient::new().context("failed to build geocoding client")?;

    let mut summary = GeocodeSummary::default();
    let total = records.len();

    for (index, record) in records.iter_mut().enumerate() {
        summary.processed += 1;

        match action_for(record, force) {
            GeocodeAction::AlreadyResolved => {
                summary.skipped_resolved += 1;
            }
            GeocodeAction::NoAddress => {
                warn!(bar = %record.name, "No usable address, skipping");
                summary.skipped_no_address += 1;
            }
            GeocodeAction::Lookup(address) => match client.geocode(&address).await {
                Ok(Some(coords)) => {
                    record.set_coordinates(coords);
                    record.touch();
                    summary.updated += 1;
                }
                Ok(None) => {
                    warn!(bar = %record.name, address = %address, "No geocoding result");
                    summary.misses += 1;
                }
                Err(e) => {
                    warn!(bar = %record.name, error = %e, "Geocoding failed");
                    summary.failures += 1;
                }
            },
        }

        if (index + 1) % 10 == 0 {
            info!(processed = index + 1, total, "Geocoding progress");
        }
    }

    summary.remote_calls = client.remote_calls();

    store::save_store(store_path, &records)
        .with_context(|| format!("failed to write store {}", store_path.display()))?;

    info!(
        processed = summary.processed,
        updated = summary.updated,
        skipped_resolved = summary.skipped_resolved,
        skipped_no_address = summary.skipped_no_address,
        misses = summary.misses,
        failures = summary.failures,
        remote_calls = summary.remote_calls,
        "Geocoding pass complete"
    );

    Ok(summary)
}
