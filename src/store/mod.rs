//! Store persistence
//!
//! The JSON store is the source of truth; the CSV table is its import
//! source and export snapshot. Both rewrite their file wholesale.

pub mod csv_table;
pub mod json_store;

pub use csv_table::{read_csv_table, write_csv_table, CSV_HEADER, DEFAULT_CSV_PATH};
pub use json_store::{load_store, load_store_if_exists, save_store, DEFAULT_STORE_PATH};
