//! src/email/mod.rs
use async_trait::async_trait;

mod message;
pub use message::{EmailBuilder, OutgoingEmail};

mod smtp;
pub use smtp::SmtpRelay;

#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("{0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("Mail relay is shutting down")]
    Closed(#[from] tokio::sync::AcquireError),
    #[error("{0}")]
    Rejected(String),
}

/// Something that delivers one message to one recipient.
///
/// Implementations are shared by every delivery of a batch at once, so they
/// must multiplex their own connections and enforce their own timeouts.
#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn send(&self, email: &OutgoingEmail<'_>) -> Result<(), RelayError>;
}
