//! barkartan - Stockholm bar dataset pipeline
//!
//! A small data pipeline around one JSON store of Stockholm bars:
//! import from CSV, geocode addresses via Nominatim, enrich via Google
//! Places, classify moods via OpenAI, export back to CSV. Each pass
//! walks the store sequentially and rewrites it wholesale.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
