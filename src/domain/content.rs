//! src/domain/content.rs

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ContentError {
    #[error("Subject is required")]
    EmptySubject,
    #[error("Email body is required")]
    EmptyBody,
}

/// Subject line of a run. Kept as submitted; only checked to be non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(String);

impl Subject {
    pub fn parse(s: String) -> Result<Self, ContentError> {
        if s.trim().is_empty() {
            return Err(ContentError::EmptySubject);
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for Subject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// HTML body of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body(String);

impl Body {
    pub fn parse(s: String) -> Result<Self, ContentError> {
        if s.trim().is_empty() {
            return Err(ContentError::EmptyBody);
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for Body {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
