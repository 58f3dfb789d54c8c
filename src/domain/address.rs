//! src/domain/address.rs
use serde::Serialize;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Empty email")]
    Empty,
    #[error("Invalid email: {0}")]
    Invalid(String),
}

/// A recipient address, trimmed and lower-cased.
///
/// Two addresses are the same recipient iff their normalized strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Address(String);

impl Address {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(Error::Empty);
        }

        if is_valid(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(Error::Invalid(normalized))
        }
    }
}

// `local@domain`, where neither side is empty, nothing contains whitespace or a
// second `@`, and the domain has a `.` with at least one character on each side.
fn is_valid(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
