//! src/ingest/row.rs
use std::io::Read;

#[derive(thiserror::Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read the uploaded file: {0}")]
    Unreadable(#[from] csv::Error),
}

/// One record of an uploaded file, fields kept in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(Vec<(String, String)>);

impl Row {
    /// Value of the column named exactly `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Value of the left-most column.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(|(_, value)| value.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Lazily yields the rows of a CSV document whose first line names the columns.
///
/// Bytes that are not UTF-8 are decoded lossily, so a stray Latin-1 name does
/// not cost the rest of the file. Only a failing reader is an error, and the
/// source ends after yielding it.
#[derive(Debug)]
pub struct CsvRowSource<R> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    failed: bool,
}

impl<R: Read> CsvRowSource<R> {
    pub fn new(input: R) -> Result<Self, IngestionError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(input);
        let headers = reader.byte_headers()?.iter().map(lossy).collect();

        Ok(Self {
            reader,
            headers,
            failed: false,
        })
    }
}

fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

impl<R: Read> Iterator for CsvRowSource<R> {
    type Item = Result<Row, IngestionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut record = csv::ByteRecord::new();
        match self.reader.read_byte_record(&mut record) {
            Ok(true) => Some(Ok(self
                .headers
                .iter()
                .map(String::as_str)
                .zip(record.iter().map(lossy))
                .collect())),
            Ok(false) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e.into()))
            }
        }
    }
}
