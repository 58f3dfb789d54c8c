//! tests/api/helpers.rs

use async_trait::async_trait;
use bulkmail::configuration::get_configuration;
use bulkmail::email::{MailRelay, OutgoingEmail, RelayError};
use bulkmail::startup::Application;
use bulkmail::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use reqwest::multipart::{Form, Part};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // Set TEST_LOG=true to see logs during tests
    // Use bunyan to format the logs nicely:
    // $ TEST_LOG=true cargo test | bunyan
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

/// Stands in for the SMTP relay: remembers every recipient and rejects the ones
/// it was told to.
#[derive(Default)]
pub struct FakeRelay {
    rejected: HashSet<String>,
    recipients: Mutex<Vec<String>>,
}

impl FakeRelay {
    pub fn rejecting(addresses: &[&str]) -> Self {
        Self {
            rejected: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.recipients.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailRelay for FakeRelay {
    async fn send(&self, email: &OutgoingEmail<'_>) -> Result<(), RelayError> {
        let to = email.to.to_string();
        self.recipients.lock().unwrap().push(to.clone());

        if self.rejected.contains(&to) {
            Err(RelayError::Rejected(format!("550 {} mailbox unavailable", to)))
        } else {
            Ok(())
        }
    }
}

pub struct Test {
    pub address: String,
    pub relay: Arc<FakeRelay>,
}

impl Test {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(&format!("{}{}", self.address, path))
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_bulk_email(&self, form: Form) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/send-bulk-email", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// The three fields the upload form sends.
pub fn bulk_email_form(csv: &str, subject: &str, body: &str) -> Form {
    Form::new()
        .part("csvFile", csv_part(csv, "recipients.csv", "text/csv"))
        .text("subject", subject.to_owned())
        .text("body", body.to_owned())
}

pub fn csv_part(contents: &str, filename: &str, mime: &str) -> Part {
    Part::text(contents.to_owned())
        .file_name(filename.to_owned())
        .mime_str(mime)
        .expect("Invalid mime type")
}

pub async fn setup() -> Test {
    setup_with(|_| {}, FakeRelay::default()).await
}

pub async fn setup_with<F>(customize: F, relay: FakeRelay) -> Test
where
    F: FnOnce(&mut bulkmail::configuration::Settings),
{
    Lazy::force(&TRACING);

    let mut config = get_configuration().expect("Failed to read configuration.");
    config.application.port = 0;
    config.dispatch.batch_delay_milliseconds = Some("0".to_string());
    customize(&mut config);

    let relay = Arc::new(relay);
    let app = Application::build_with_relay(config, relay.clone())
        .expect("Failed to build application.");
    let address = format!("http://127.0.0.1:{}", app.port());

    // Launch the server as a background task
    let _ = tokio::spawn(app.run());

    Test { address, relay }
}
