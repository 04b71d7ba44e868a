//! Google Places enrichment pass
//!
//! Matches each bar by name against the Places find-place endpoint and
//! folds the result into the record: place reference, API-verified
//! address, coordinates, and the deterministic tag derivation with the
//! venue rating as signal. Tags are only re-derived on a match; a miss
//! fills the baseline set on records that never had tags, and a failed
//! lookup leaves the record exactly as the run found it.
//!
//! The Google key is checked before the store is opened; a missing or
//! rejected credential aborts the run, and the store is only written
//! when the walk completes.

use crate::config::AppConfig;
use crate::models::BarRecord;
use crate::services::places_client::{PlaceSummary, PlacesError};
use crate::services::{derive_tags, GooglePlacesClient};
use crate::store;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// Counters for one enrichment run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichSummary {
    pub processed: usize,
    pub matched: usize,
    pub coordinates_updated: usize,
    pub addresses_corrected: usize,
    pub tags_updated: usize,
    pub misses: usize,
    pub failures: usize,
}

/// Fields changed by folding one place match into a record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct AppliedPlace {
    coordinates: bool,
    address: bool,
}

/// Fold a place match into a record.
///
/// `correct_address` is only filled when empty: a human-entered
/// correction outranks the API's formatted address. Coordinates follow
/// the same overwrite policy as the geocoding pass.
fn apply_place(record: &mut BarRecord, place: &PlaceSummary, force: bool) -> AppliedPlace {
    let mut applied = AppliedPlace::default();

    if place.place_id.is_some() {
        record.place_id = place.place_id.clone();
    }

    if record.correct_address.is_none() {
        if let Some(address) = &place.formatted_address {
            record.correct_address = Some(address.clone());
            applied.address = true;
        }
    }

    if let Some(coords) = place.coordinates {
        if force || record.coordinates_overwritable() {
            record.set_coordinates(coords);
            applied.coordinates = true;
        }
    }

    applied
}

/// Replace the record's tags, reporting whether they changed.
fn apply_tags(record: &mut BarRecord, tags: BTreeSet<String>) -> bool {
    if record.tags.as_ref() == Some(&tags) {
        return false;
    }
    record.tags = Some(tags);
    true
}

/// Fold one lookup outcome into the record.
///
/// A match refreshes the place fields and re-derives tags with the
/// rating signal. A miss only fills tags on records that never had any,
/// so a transient empty answer cannot downgrade an earlier derivation.
/// A transport failure leaves the record exactly as it was. A denied
/// request means the credential is bad for every remaining row, so it
/// aborts the pass instead of warning once per record.
fn apply_lookup(
    record: &mut BarRecord,
    lookup: Result<Option<PlaceSummary>, PlacesError>,
    force: bool,
    summary: &mut EnrichSummary,
) -> Result<()> {
    match lookup {
        Ok(Some(place)) => {
            summary.matched += 1;

            let applied = apply_place(record, &place, force);
            if applied.coordinates {
                summary.coordinates_updated += 1;
            }
            if applied.address {
                summary.addresses_corrected += 1;
            }
            if applied != AppliedPlace::default() {
                record.touch();
            }

            let tags = derive_tags(record, place.rating);
            if apply_tags(record, tags) {
                record.touch();
                summary.tags_updated += 1;
            }
        }
        Ok(None) => {
            warn!(bar = %record.name, "No Places match");
            summary.misses += 1;

            if record.tags.is_none() {
                let tags = derive_tags(record, None);
                if apply_tags(record, tags) {
                    record.touch();
                    summary.tags_updated += 1;
                }
            }
        }
        Err(e @ PlacesError::RequestDenied(_)) => {
            return Err(e).context("Places rejected the API key");
        }
        Err(e) => {
            warn!(bar = %record.name, error = %e, "Places lookup failed");
            summary.failures += 1;
        }
    }

    Ok(())
}

/// Run the enrichment pass over the whole store.
pub async fn run(config: &AppConfig, store_path: &Path, force: bool) -> Result<EnrichSummary> {
    let api_key = config.require_google_api_key()?;

    let mut records = store::load_store(store_path)
        .with_context(|| format!("failed to read store {}", store_path.display()))?;

    let client =
        GooglePlacesClient::new(api_key.to_string()).context("failed to build Places client")?;

    let mut summary = EnrichSummary::default();
    let total = records.len();

    for (index, record) in records.iter_mut().enumerate() {
        summary.processed += 1;

        let lookup = client.find_place(&record.name).await;
        apply_lookup(record, lookup, force, &mut summary)?;

        if (index + 1) % 10 == 0 {
            info!(processed = index + 1, total, "Enrichment progress");
        }
    }

    store::save_store(store_path, &records)
        .with_context(|| format!("failed to write store {}", store_path.display()))?;

    info!(
        processed = summary.processed,
        matched = summary.matched,
        coordinates_updated = summary.coordinates_updated,
        addresses_corrected = summary.addresses_corrected,
        tags_updated = summary.tags_updated,
        misses = summary.misses,
        failures = summary.failures,
        "Enrichment pass complete"
    );

    Ok(summary)
}
