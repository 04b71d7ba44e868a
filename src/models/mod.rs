//! Data models for the bar pipeline

pub mod bar;
pub mod mood;

pub use bar::{slugify, BarRecord, Coordinates, STOCKHOLM_CENTER};
pub use mood::{Mood, UnknownMood};
