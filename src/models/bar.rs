//! Bar record model
//!
//! `BarRecord` is the unit of data flowing through every pipeline pass.
//! Records are created by the import pass, enriched in place by the
//! geocode/enrich/mood passes, and written back wholesale by the store.
//!
//! Field-name aliasing is resolved here, once, at the serde boundary:
//! the store has accumulated several spellings over time (`bar_name`,
//! `location`, `cheapest_beer_sek`, ...) and downstream code only ever
//! sees the canonical names.

use crate::models::Mood;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stockholm city center, used historically as a geocoding fallback.
///
/// Coordinates equal to this pair are placeholders, not real results, and
/// may be overwritten by any later geocoding pass.
pub const STOCKHOLM_CENTER: Coordinates = Coordinates {
    lat: 59.3293,
    lng: 18.0686,
};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// True when this pair is the Stockholm city-center placeholder.
    pub fn is_placeholder(&self) -> bool {
        (self.lat - STOCKHOLM_CENTER.lat).abs() < 1e-6
            && (self.lng - STOCKHOLM_CENTER.lng).abs() < 1e-6
    }
}

/// One bar, as persisted in the JSON store.
///
/// Optional fields serialize as `null` rather than being omitted so that
/// store rewrites produce stable diffs. `tags` and `moods` are sets:
/// re-running a derivation pass replaces them with an identical set
/// instead of growing a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    /// Stable slug, unique within the store; derived from `name` on import.
    #[serde(default)]
    pub id: String,

    /// Display name.
    #[serde(default, alias = "bar_name")]
    pub name: String,

    /// Address as originally captured. May be inaccurate or a placeholder
    /// shared by several records.
    #[serde(default, alias = "location", alias = "full_address")]
    pub address: Option<String>,

    /// Human- or API-verified address. Authoritative over `address` for
    /// geocoding and display whenever present.
    #[serde(default)]
    pub correct_address: Option<String>,

    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,

    #[serde(default, alias = "longitude")]
    pub lng: Option<f64>,

    /// Cheapest beer, SEK.
    #[serde(default, alias = "cheapest_beer_sek")]
    pub price: Option<i64>,

    /// Free text or a structured sub-document; stored as provided.
    #[serde(default, alias = "openingHours", alias = "hours")]
    pub opening_hours: Option<serde_json::Value>,

    /// "yes", "no", "unknown", or free text.
    #[serde(default, alias = "danceFloor")]
    pub dance_floor: Option<String>,

    #[serde(default, alias = "danceNotes")]
    pub dance_notes: Option<String>,

    /// Derived classification tags ("vibes").
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,

    /// Moods from the closed vocabulary; absent until classification runs.
    #[serde(default)]
    pub moods: Option<BTreeSet<Mood>>,

    /// Opaque reference into the external places provider.
    #[serde(default)]
    pub place_id: Option<String>,

    /// Informational only.
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl BarRecord {
    /// Fresh record with only identity set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            correct_address: None,
            lat: None,
            lng: None,
            price: None,
            opening_hours: None,
            dance_floor: None,
            dance_notes: None,
            tags: None,
            moods: None,
            place_id: None,
            last_updated: None,
        }
    }

    /// The authoritative address for geocoding and display.
    ///
    /// Precedence: cleaned `correct_address` > cleaned `address` > `None`.
    /// Pure; performs no I/O. A `None` here must short-circuit any remote
    /// lookup for this record.
    pub fn resolved_address(&self) -> Option<String> {
        clean_address(self.correct_address.as_deref())
            .or_else(|| clean_address(self.address.as_deref()))
    }

    /// Current coordinate pair, if both components are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    pub fn set_coordinates(&mut self, coords: Coordinates) {
        self.lat = Some(coords.lat);
        self.lng = Some(coords.lng);
    }

    /// True when a geocoding pass may write coordinates without `--force`:
    /// either none are set yet, or the existing pair is the city-center
    /// placeholder. A real, non-placeholder result is never silently
    /// replaced.
    pub fn coordinates_overwritable(&self) -> bool {
        match self.coordinates() {
            None => true,
            Some(coords) => coords.is_placeholder(),
        }
    }

    /// True when this bar is recorded as having a dance floor.
    pub fn has_dance_floor(&self) -> bool {
        self.dance_floor
            .as_deref()
            .map(|v| v.trim().eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
    }

    /// Stamp `last_updated` with the current time (RFC 3339).
    pub fn touch(&mut self) {
        self.last_updated = Some(Utc::now().to_rfc3339());
    }
}

/// Trim, strip one layer of surrounding double quotes, trim again.
/// Empty results and the literal placeholder "null" resolve to `None`.
fn clean_address(raw: Option<&str>) -> Option<String> {
    let mut value = raw?.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value = value[1..value.len() - 1].trim();
    }
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    Some(value.to_string())
}

/// Derive a stable slug from a bar name.
///
/// Lowercases, folds the Swedish/Latin diacritics that show up in bar
/// names (å→a, ö→o, é→e, ...), maps every other non-alphanumeric run to a
/// single `-`, and trims. Uniqueness across the store is the import
/// pass's job, not this function's.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().map(fold_char) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Fold one character to its ASCII base form, or pass it through.
fn fold_char(ch: char) -> char {
    match ch {
        'å' | 'ä' | 'à' | 'á' | 'â' | 'ã' | 'Å' | 'Ä' | 'À' | 'Á' | 'Â' | 'Ã' => 'a',
        'ö' | 'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'Ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => 'o',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'ü' | 'ù' | 'ú' | 'û' | 'Ü' | 'Ù' | 'Ú' | 'Û' => 'u',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        other => other,
    }
}
