//! src/ingest/normalizer.rs
use crate::domain::Address;
use crate::ingest::{IngestionError, Row};
use std::collections::HashSet;

/// Where a row may hold its email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extraction {
    Column(&'static str),
    FirstField,
}

/// Tried in order; the first non-empty value wins.
const EXTRACTION_ORDER: [Extraction; 4] = [
    Extraction::Column("email"),
    Extraction::Column("Email"),
    Extraction::Column("EMAIL"),
    Extraction::FirstField,
];

impl Extraction {
    fn apply(self, row: &Row) -> Option<&str> {
        match self {
            Extraction::Column(name) => row.get(name),
            Extraction::FirstField => row.first(),
        }
    }
}

/// Picks the raw address candidate out of `row`, if it has one.
///
/// Header-less files end up here through [`Extraction::FirstField`], which will
/// happily return a non-email first column; the validity check downstream is what
/// filters those out.
pub fn extract_candidate(row: &Row) -> Option<&str> {
    EXTRACTION_ORDER
        .iter()
        .find_map(|strategy| strategy.apply(row).filter(|value| !value.is_empty()))
}

#[derive(Default)]
struct Normalizer {
    seen: HashSet<Address>,
    addresses: Vec<Address>,
}

impl Normalizer {
    fn offer(&mut self, candidate: &str) {
        match Address::parse(candidate) {
            Ok(address) => {
                if self.seen.insert(address.clone()) {
                    self.addresses.push(address);
                }
            }
            Err(e) => tracing::debug!("Dropping candidate {:?}: {}", candidate, e),
        }
    }
}

/// Validates and deduplicates raw candidates, keeping first-occurrence order.
pub fn normalize_candidates<I, S>(candidates: I) -> Vec<Address>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalizer = Normalizer::default();
    for candidate in candidates {
        normalizer.offer(candidate.as_ref());
    }
    normalizer.addresses
}

/// Like [`normalize_candidates`], reading candidates out of `rows`.
///
/// Rows without a candidate are skipped. The first unreadable row aborts the
/// whole operation.
#[tracing::instrument(name = "Normalize recipient rows", skip(rows))]
pub fn normalize_rows<I>(rows: I) -> Result<Vec<Address>, IngestionError>
where
    I: IntoIterator<Item = Result<Row, IngestionError>>,
{
    let mut normalizer = Normalizer::default();
    for row in rows {
        let row = row?;
        if let Some(candidate) = extract_candidate(&row) {
            normalizer.offer(candidate);
        }
    }
    Ok(normalizer.addresses)
}
