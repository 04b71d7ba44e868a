//! Deterministic tag derivation
//!
//! Computes classification tags from fields the record already carries,
//! plus an optional rating signal from Places. No network, no state:
//! the same record and signal always produce the same set, so the
//! enrichment pass can re-run without tags accumulating.

use crate::models::BarRecord;
use std::collections::BTreeSet;

pub const TAG_PARTY: &str = "party";
pub const TAG_GIRLS_NIGHT: &str = "girls-night";
pub const TAG_DATING: &str = "dating";
pub const TAG_CHILL: &str = "chill";

/// Ratings at or above this count as a high-quality venue.
pub const HIGH_RATING_THRESHOLD: f64 = 4.5;

/// Derive the full tag set for a record.
///
/// A dance floor marks a bar as a party venue; a high rating marks it as
/// date-worthy and relaxed. When nothing fires, the bar is at least
/// somewhere to sit down with a beer.
pub fn derive_tags(record: &BarRecord, rating: Option<f64>) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    if record.has_dance_floor() {
        tags.insert(TAG_PARTY.to_string());
        tags.insert(TAG_GIRLS_NIGHT.to_string());
    }

    if matches!(rating, Some(r) if r >= HIGH_RATING_THRESHOLD) {
        tags.insert(TAG_DATING.to_string());
        tags.insert(TAG_CHILL.to_string());
    }

    if tags.is_empty() {
        tags.insert(TAG_CHILL.to_string());
    }

    tags
}
