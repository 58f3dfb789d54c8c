//! src/dispatch/worker.rs
use crate::domain::{Address, Body, Sender, Subject};
use crate::email::{MailRelay, OutgoingEmail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    /// Carries the relay's description of what went wrong.
    Failed(String),
}

/// What happened to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub address: Address,
    pub outcome: Outcome,
}

/// Sends the run's message to `address`.
///
/// Never fails: relay errors become [`Outcome::Failed`] so that one bad recipient
/// cannot take down the rest of the batch.
#[tracing::instrument(
    name = "Deliver email",
    skip_all,
    fields(recipient = %address)
)]
pub async fn deliver<R>(
    relay: &R,
    sender: &Sender,
    subject: &Subject,
    body: &Body,
    address: Address,
) -> Delivery
where
    R: MailRelay + ?Sized,
{
    let result = {
        let email = OutgoingEmail::builder(sender, &address)
            .subject(subject.as_ref())
            .html_content(body.as_ref())
            .build();
        relay.send(&email).await
    };

    let outcome = match result {
        Ok(()) => {
            tracing::info!("Sent to {}", address);
            Outcome::Sent
        }
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Failed to send to {}: {}", address, e);
            Outcome::Failed(e.to_string())
        }
    };

    Delivery { address, outcome }
}
