//! Pipeline passes over the bar store
//!
//! One module per pass, each a sequential walk over the full record
//! list: load the store, process records one at a time, rewrite the
//! store once at the end. Records are independent; a single record's
//! failure is logged and the walk continues.
//!
//! Passes and their order in a full refresh:
//! 1. `import`: CSV rows to store records with stable ids
//! 2. `geocode`: Nominatim coordinates for unresolved records
//! 3. `enrich`: Places match (verified address, place ref, rating, tags)
//! 4. `moods`: review-based mood classification
//! 5. `export`: CSV snapshot of the store
//!
//! `ask` sits apart: it reads the store but never writes it.

pub mod ask;
pub mod enrich;
pub mod export;
pub mod geocode;
pub mod import;
pub mod moods;

pub use ask::{AskOutcome, MatchedBar};
pub use enrich::EnrichSummary;
pub use export::ExportSummary;
pub use geocode::GeocodeSummary;
pub use import::ImportSummary;
pub use moods::MoodsSummary;
