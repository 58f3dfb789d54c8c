//! src/email/smtp.rs
use crate::configuration::RelaySettings;
use crate::email::{MailRelay, OutgoingEmail, RelayError};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters, TlsVersion};
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Port on which the relay expects TLS from the first byte instead of STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Pooled SMTP connection to the mail relay.
///
/// At most `pool_size` sessions talk to the relay at once; further sends wait
/// for a free slot. The pool itself only bounds idle connections. Cloning is
/// cheap and clones share both the pool and the limit.
#[derive(Clone)]
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sessions: Arc<Semaphore>,
}

impl std::fmt::Debug for SmtpRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpRelay").finish_non_exhaustive()
    }
}

impl SmtpRelay {
    pub fn new(settings: &RelaySettings) -> Result<Self, RelayError> {
        let host = settings.host.trim();

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(settings.port)
            .tls(tls_policy(host, settings)?)
            .timeout(Some(settings.timeout()))
            .pool_config(PoolConfig::new().max_size(settings.pool_size));

        if !settings.user.trim().is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.user.trim().to_owned(),
                settings.pass.expose_secret().trim().to_owned(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            sessions: Arc::new(Semaphore::new(settings.pool_size.max(1) as usize)),
        })
    }

    /// Opens a connection and greets the relay.
    #[tracing::instrument(name = "Verify mail relay connection", skip(self))]
    pub async fn verify(&self) -> Result<bool, RelayError> {
        Ok(self.transport.test_connection().await?)
    }
}

fn tls_policy(host: &str, settings: &RelaySettings) -> Result<Tls, RelayError> {
    // Skipping certificate checks is a deployment decision made in the relay
    // settings; startup logs a warning whenever it is on.
    let parameters = TlsParameters::builder(host.to_owned())
        .dangerous_accept_invalid_certs(settings.accept_invalid_certs)
        .set_min_tls_version(TlsVersion::Tlsv12)
        .build()?;

    let tls = if settings.port == IMPLICIT_TLS_PORT {
        Tls::Wrapper(parameters)
    } else if settings.require_tls {
        Tls::Required(parameters)
    } else {
        Tls::Opportunistic(parameters)
    };

    Ok(tls)
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn send(&self, email: &OutgoingEmail<'_>) -> Result<(), RelayError> {
        let message = email.to_message()?;
        let _session = self.sessions.acquire().await?;
        self.transport.send(message).await?;
        Ok(())
    }
}
