//! src/startup.rs
use crate::configuration::Settings;
use crate::dispatch::DispatchConfig;
use crate::email::{MailRelay, SmtpRelay};
use crate::routes::{health_check, home, send_bulk_email, UploadLimit};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Builds the application against the SMTP relay described by `config.relay`.
    pub fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let relay = SmtpRelay::new(&config.relay).context("Failed to configure the mail relay")?;

        tracing::info!(
            host = %config.relay.host,
            port = config.relay.port,
            user = %config.relay.user,
            "Mail relay configured"
        );
        if config.relay.accept_invalid_certs {
            tracing::warn!("TLS certificate verification for the mail relay is disabled");
        }

        let relay_check = relay.clone();
        tokio::spawn(async move {
            match relay_check.verify().await {
                Ok(true) => tracing::info!("Mail relay is ready to take our messages"),
                Ok(false) => tracing::warn!("Mail relay did not accept a test connection"),
                Err(e) => tracing::error!(error.cause_chain = ?e, "Mail relay connection error"),
            }
        });

        Self::build_with_relay(config, Arc::new(relay))
    }

    /// Builds the application around any relay; the tests use this to swap SMTP out.
    pub fn build_with_relay(
        config: Settings,
        relay: Arc<dyn MailRelay>,
    ) -> Result<Self, anyhow::Error> {
        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();

        let dispatch_config = config
            .dispatch_config()
            .context("Invalid sender configuration")?;
        tracing::info!(
            batch_size = dispatch_config.limits.batch_size(),
            daily_cap = dispatch_config.limits.daily_cap(),
            batch_delay_ms = dispatch_config.batch_delay.as_millis() as u64,
            "Dispatch limits"
        );

        let server = run(
            listener,
            relay,
            dispatch_config,
            UploadLimit(config.application.upload_limit_bytes),
        )?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    relay: Arc<dyn MailRelay>,
    dispatch_config: DispatchConfig,
    upload_limit: UploadLimit,
) -> Result<Server, std::io::Error> {
    let relay: web::Data<dyn MailRelay> = web::Data::from(relay);
    let dispatch_config = web::Data::new(dispatch_config);
    let upload_limit = web::Data::new(upload_limit);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/send-bulk-email", web::post().to(send_bulk_email))
            .route("/", web::get().to(home))
            .app_data(relay.clone())
            .app_data(dispatch_config.clone())
            .app_data(upload_limit.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
