//! src/ingest/mod.rs
mod row;
pub use row::{CsvRowSource, IngestionError, Row};

mod normalizer;
pub use normalizer::{extract_candidate, normalize_candidates, normalize_rows};
