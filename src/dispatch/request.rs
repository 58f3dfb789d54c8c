//! src/dispatch/request.rs
use crate::dispatch::Limits;
use crate::domain::{Address, Body, ContentError, Sender, Subject};
use crate::ingest::normalize_candidates;
use std::time::Duration;

pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("No valid email addresses found in CSV")]
    NoValidAddresses,
}

/// Process-wide settings the engine runs with, built once at startup.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub sender: Sender,
    pub limits: Limits,
    /// Pause between two consecutive batches.
    pub batch_delay: Duration,
}

impl DispatchConfig {
    pub fn new(sender: Sender) -> Self {
        Self {
            sender,
            limits: Limits::default(),
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

/// The input of one run. Read-only once built.
#[derive(Debug, Clone)]
pub struct RunRequest {
    recipients: Vec<Address>,
    subject: Subject,
    body: Body,
    limits: Limits,
}

impl RunRequest {
    /// Normalizes `candidates` and refuses a run with nobody to send to.
    pub fn new<I, S>(
        candidates: I,
        subject: Subject,
        body: Body,
        limits: Limits,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let recipients = normalize_candidates(candidates);
        if recipients.is_empty() {
            return Err(ValidationError::NoValidAddresses);
        }

        Ok(Self {
            recipients,
            subject,
            body,
            limits,
        })
    }

    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}
