//! Nominatim (OpenStreetMap) geocoding client
//!
//! Resolves free-text addresses to coordinates. Keyless, but the usage
//! policy requires a descriptive User-Agent and at most one request per
//! second, so calls go through the shared rate limiter.
//!
//! Lookups are memoized for the lifetime of the client: several bars in
//! the source data share the same placeholder address, and re-resolving
//! it once per bar would burn quota for nothing. The cache is run-scoped;
//! nothing is persisted between invocations.

use crate::models::Coordinates;
use crate::services::rate_limiter::RateLimiter;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "barkartan/0.1.0 (https://github.com/barkartan/barkartan)";
const RATE_LIMIT_MS: u64 = 1000; // Nominatim policy: max 1 request/second

/// Suffix appended to addresses that do not already mention the city,
/// biasing results toward the right locality.
const CITY_SUFFIX: &str = ", Stockholm, Sweden";

/// Nominatim client errors
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One result row from the Nominatim search endpoint.
/// Coordinates come back as strings.
#[derive(Debug, Clone, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Nominatim geocoding client with run-scoped memoization.
pub struct NominatimClient {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
    /// Normalized address → result. Negative results are cached too, so a
    /// placeholder address shared by many records costs one call total.
    cache: Mutex<HashMap<String, Option<Coordinates>>>,
    remote_calls: AtomicU64,
}

impl NominatimClient {
    pub fn new() -> Result<Self, GeocodeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GeocodeError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(RATE_LIMIT_MS),
            cache: Mutex::new(HashMap::new()),
            remote_calls: AtomicU64::new(0),
        })
    }

    /// Resolve an address to coordinates.
    ///
    /// `Ok(None)` means the service answered but found nothing; transport
    /// and decode problems are errors. Either way the caller keeps
    /// whatever coordinate it already had.
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let query = normalize_address(address);

        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&query) {
                tracing::debug!(address = %query, "Geocode cache hit");
                return Ok(*cached);
            }
        }

        self.rate_limiter.wait().await;
        self.remote_calls.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(address = %query, "Querying Nominatim");

        let response = self
            .http_client
            .get(NOMINATIM_BASE_URL)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeocodeError::ApiError(status.as_u16(), error_text));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::ParseError(e.to_string()))?;

        let coords = match places.first() {
            Some(place) => Some(parse_coordinates(place)?),
            None => None,
        };

        match &coords {
            Some(c) => tracing::info!(
                address = %query,
                lat = c.lat,
                lng = c.lng,
                "Geocoded address"
            ),
            None => tracing::debug!(address = %query, "No geocoding result"),
        }

        self.cache.lock().await.insert(query, coords);

        Ok(coords)
    }

    /// Remote calls issued so far this run (cache hits excluded).
    pub fn remote_calls(&self) -> u64 {
        self.remote_calls.load(Ordering::Relaxed)
    }
}

/// Collapse whitespace and add the city suffix when the address does not
/// already mention Stockholm.
fn normalize_address(address: &str) -> String {
    let mut normalized = address.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.to_lowercase().contains("stockholm") {
        normalized.push_str(CITY_SUFFIX);
    }
    normalized
}

fn parse_coordinates(place: &NominatimPlace) -> Result<Coordinates, GeocodeError> {
    let lat: f64 = place
        .lat
        .parse()
        .map_err(|_| GeocodeError::ParseError(format!("bad latitude: {}", place.lat)))?;
    let lng: f64 = place
        .lon
        .parse()
        .map_err(|_| GeocodeError::ParseError(format!("bad longitude: {}", place.lon)))?;

    tracing::debug!(display_name = %place.display_name, "Parsed geocoding result");

    Ok(Coordinates { lat, lng })
}
