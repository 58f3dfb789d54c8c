//! src/domain/sender.rs
use crate::domain::address::{self, Address};
use unicode_segmentation::UnicodeSegmentation;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NameError {
    #[error("A sender name must not be empty")]
    Empty,
    #[error("A sender name must not be more than 256 graphemes long")]
    TooLong,
    #[error("A sender name must not contain any of the following characters: '/' '(' ')' '\"' '<' '>' '\\' '{{' '}}'")]
    InvalidCharacters,
}

#[derive(thiserror::Error, Debug)]
pub enum SenderError {
    #[error("Invalid sender name")]
    Name(#[from] NameError),
    #[error("Invalid sender email")]
    Address(#[from] address::Error),
}

/// Display name placed in the `From` header of every message of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderName(String);

impl SenderName {
    pub fn parse(s: String) -> Result<Self, NameError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NameError::Empty);
        }

        // Graphemes, not chars: `å` may be two code points.
        if s.graphemes(true).count() > 256 {
            return Err(NameError::TooLong);
        }

        // These would break out of the quoted display name in the `From` header.
        let forbidden_characters = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];
        if s.chars().any(|c| forbidden_characters.contains(&c)) {
            return Err(NameError::InvalidCharacters);
        }

        Ok(Self(s.to_owned()))
    }
}

impl AsRef<str> for SenderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The run-invariant `From` identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    name: SenderName,
    address: Address,
}

impl Sender {
    pub fn parse(name: String, email: &str) -> Result<Self, SenderError> {
        Ok(Self {
            name: SenderName::parse(name)?,
            address: Address::parse(email)?,
        })
    }

    pub fn name(&self) -> &SenderName {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}
