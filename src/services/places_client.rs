//! Google Places API client
//!
//! Two endpoints are used: Find Place From Text to match a bar name to a
//! place (coordinates, formatted address, rating), and Place Details to
//! fetch review text for mood classification. Both require an API key
//! and are rate limited.
//!
//! Result matching is biased toward central Stockholm so that a bare bar
//! name like "Kvarnen" resolves to the right venue.

use crate::models::Coordinates;
use crate::services::rate_limiter::RateLimiter;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const FIND_PLACE_URL: &str = "https://maps.googleapis.com/maps/api/place/findplacefromtext/json";
const PLACE_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const RATE_LIMIT_MS: u64 = 200; // 5 requests per second

/// 5 km circle around central Stockholm (same point as the coordinate
/// placeholder in the source data).
const LOCATION_BIAS: &str = "circle:5000@59.3293,18.0686";

/// How many reviews to keep per place. Enough signal for classification
/// without blowing up the prompt.
const REVIEW_LIMIT: usize = 5;

/// Google Places client errors
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Request denied: {0}")]
    RequestDenied(String),

    #[error("Places API status {0}: {1}")]
    StatusError(String, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Best match for a bar name, cooked down from a Find Place candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSummary {
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub rating: Option<f64>,
}

/// Review text and rating from a Place Details lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetails {
    pub rating: Option<f64>,
    pub reviews: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    candidates: Vec<PlaceCandidate>,
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlaceCandidate {
    place_id: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<Geometry>,
    rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Clone, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlaceResult {
    rating: Option<f64>,
    #[serde(default)]
    reviews: Vec<Review>,
}

#[derive(Debug, Clone, Deserialize)]
struct Review {
    #[serde(default)]
    text: String,
}

/// Google Places API client
pub struct GooglePlacesClient {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(api_key: String) -> Result<Self, PlacesError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PlacesError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(RATE_LIMIT_MS),
            api_key,
        })
    }

    /// Find the best place match for a bar name.
    ///
    /// `Ok(None)` means Google answered with zero candidates. A denied
    /// request (bad or unauthorized key) is an error, not a miss.
    pub async fn find_place(&self, name: &str) -> Result<Option<PlaceSummary>, PlacesError> {
        self.rate_limiter.wait().await;

        tracing::debug!(name = %name, "Querying Places find-place");

        let response = self
            .http_client
            .get(FIND_PLACE_URL)
            .query(&[
                ("input", name),
                ("inputtype", "textquery"),
                ("fields", "place_id,formatted_address,geometry,rating"),
                ("locationbias", LOCATION_BIAS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlacesError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlacesError::ApiError(status.as_u16(), error_text));
        }

        let body: FindPlaceResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::ParseError(e.to_string()))?;

        check_body_status(&body.status, body.error_message)?;

        let candidate = match body.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                tracing::debug!(name = %name, "No Places match");
                return Ok(None);
            }
        };

        let summary = cook_candidate(candidate);

        tracing::info!(
            name = %name,
            place_id = summary.place_id.as_deref().unwrap_or("-"),
            rating = summary.rating.unwrap_or(0.0),
            "Places match found"
        );

        Ok(Some(summary))
    }

    /// Fetch rating and review text for a known place.
    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        self.rate_limiter.wait().await;

        tracing::debug!(place_id = %place_id, "Querying Places details");

        let response = self
            .http_client
            .get(PLACE_DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("fields", "rating,reviews"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlacesError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlacesError::ApiError(status.as_u16(), error_text));
        }

        let body: DetailsResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::ParseError(e.to_string()))?;

        check_body_status(&body.status, body.error_message)?;

        let details = match body.result {
            Some(result) => cook_details(result),
            None => return Ok(None),
        };

        tracing::debug!(
            place_id = %place_id,
            reviews = details.reviews.len(),
            "Places details fetched"
        );

        Ok(Some(details))
    }
}

/// The Places API reports most failures in the body status, not the HTTP
/// status. ZERO_RESULTS is a valid answer and passes through.
fn check_body_status(status: &str, error_message: Option<String>) -> Result<(), PlacesError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "REQUEST_DENIED" => Err(PlacesError::RequestDenied(
            error_message.unwrap_or_else(|| "check the API key".to_string()),
        )),
        other => Err(PlacesError::StatusError(
            other.to_string(),
            error_message.unwrap_or_default(),
        )),
    }
}

fn cook_candidate(candidate: PlaceCandidate) -> PlaceSummary {
    let coordinates = candidate
        .geometry
        .and_then(|g| g.location)
        .map(|l| Coordinates { lat: l.lat, lng: l.lng });

    PlaceSummary {
        place_id: candidate.place_id,
        formatted_address: candidate.formatted_address,
        coordinates,
        rating: candidate.rating,
    }
}

fn cook_details(result: PlaceResult) -> PlaceDetails {
    PlaceDetails {
        rating: result.rating,
        reviews: result
            .reviews
            .into_iter()
            .map(|r| r.text)
            .filter(|t| !t.trim().is_empty())
            .take(REVIEW_LIMIT)
            .collect(),
    }
}
