//! Service modules for the enrichment passes
//!
//! External API clients (Nominatim, Google Places, OpenAI) plus the
//! derivation logic that runs over their results. Clients own their own
//! rate limiting; none of them touch the store.

pub mod mood_classifier;
pub mod nominatim_client;
pub mod openai_client;
pub mod places_client;
pub mod rate_limiter;
pub mod tag_deriver;

pub use mood_classifier::{apply_moods, MoodClassifier};
pub use nominatim_client::{GeocodeError, NominatimClient};
pub use openai_client::{OpenAiClient, OpenAiError};
pub use places_client::{GooglePlacesClient, PlaceDetails, PlaceSummary, PlacesError};
pub use rate_limiter::RateLimiter;
pub use tag_deriver::{derive_tags, HIGH_RATING_THRESHOLD};
