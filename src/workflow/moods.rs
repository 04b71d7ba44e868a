//! Mood classification pass
//!
//! For each bar: fetch review snippets via Place Details when a place
//! reference exists, then ask the classifier which moods from the closed
//! vocabulary fit. A record only changes when classification produces at
//! least one valid label; anything else keeps the prior moods.
//!
//! The pass needs Google for the reviews and OpenAI for the
//! classification. Both credentials are checked before the store is
//! opened, a key rejection from either provider aborts the walk, and
//! the store is only written when the walk completes.

use crate::config::AppConfig;
use crate::models::{BarRecord, Mood};
use crate::services::openai_client::OpenAiError;
use crate::services::places_client::{PlaceDetails, PlacesError};
use crate::services::{apply_moods, GooglePlacesClient, MoodClassifier, OpenAiClient};
use crate::store;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Counters for one classification run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoodsSummary {
    pub processed: usize,
    pub classified: usize,
    pub skipped: usize,
    pub failures: usize,
}

/// Reviews from one detail-fetch outcome.
///
/// A failed fetch downgrades the classification input rather than
/// failing the record. A denied request is a credential problem for the
/// whole run and aborts the pass.
fn reviews_from(
    bar: &str,
    details: Result<Option<PlaceDetails>, PlacesError>,
) -> Result<Vec<String>> {
    match details {
        Ok(Some(details)) => Ok(details.reviews),
        Ok(None) => Ok(Vec::new()),
        Err(e @ PlacesError::RequestDenied(_)) => Err(e).context("Places rejected the API key"),
        Err(e) => {
            debug!(bar = %bar, error = %e, "Review fetch failed, classifying without reviews");
            Ok(Vec::new())
        }
    }
}

/// Fold one classification outcome into the record.
///
/// A rejected API key aborts the pass; any other classifier error is a
/// per-record failure and the record keeps its prior moods.
fn apply_classification(
    record: &mut BarRecord,
    outcome: Result<BTreeSet<Mood>, OpenAiError>,
    summary: &mut MoodsSummary,
) -> Result<()> {
    match outcome {
        Ok(moods) => {
            if moods.is_empty() {
                warn!(bar = %record.name, "No valid moods returned, keeping prior");
                summary.skipped += 1;
            } else if apply_moods(record, moods) {
                record.touch();
                summary.classified += 1;
            } else {
                summary.skipped += 1;
            }
            Ok(())
        }
        Err(e @ OpenAiError::InvalidApiKey) => Err(e).context("OpenAI rejected the API key"),
        Err(e) => {
            warn!(bar = %record.name, error = %e, "Mood classification failed");
            summary.failures += 1;
            Ok(())
        }
    }
}

/// Run the mood classification pass over the whole store.
pub async fn run(config: &AppConfig, store_path: &Path) -> Result<MoodsSummary> {
    let google_key = config.require_google_api_key()?;
    let openai_key = config.require_openai_api_key()?;

    let mut records = store::load_store(store_path)
        .with_context(|| format!("failed to read store {}", store_path.display()))?;

    let places =
        GooglePlacesClient::new(google_key.to_string()).context("failed to build Places client")?;
    let classifier = MoodClassifier::new(
        OpenAiClient::new(openai_key.to_string()).context("failed to build OpenAI client")?,
    );

    let mut summary = MoodsSummary::default();
    let total = records.len();

    for (index, record) in records.iter_mut().enumerate() {
        summary.processed += 1;

        // Reviews are optional context for the classifier.
        let reviews = match &record.place_id {
            Some(place_id) => reviews_from(&record.name, places.place_details(place_id).await)?,
            None => Vec::new(),
        };

        let outcome = classifier.classify(record, &reviews).await;
        apply_classification(record, outcome, &mut summary)?;

        if (index + 1) % 10 == 0 {
            info!(processed = index + 1, total, "Mood classification progress");
        }
    }

    store::save_store(store_path, &records)
        .with_context(|| format!("failed to write store {}", store_path.display()))?;

    info!(
        processed = summary.processed,
        classified = summary.classified,
        skipped = summary.skipped,
        failures = summary.failures,
        "Mood classification pass complete"
    );

    Ok(summary)
}
