//! src/configuration.rs
use crate::dispatch::{DispatchConfig, Limits, DEFAULT_BATCH_DELAY};
use crate::domain::{Sender, SenderError};
use anyhow::Context;
use config::{Config, File};
use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    #[serde(default)]
    pub dispatch: DispatchSettings,
    pub sender: SenderSettings,
    #[serde(skip)]
    pub relay: RelaySettings,
}

impl Settings {
    pub fn dispatch_config(&self) -> Result<DispatchConfig, SenderError> {
        let sender = Sender::parse(self.sender.name.clone(), &self.sender.email)?;
        Ok(DispatchConfig {
            sender,
            limits: self.dispatch.limits(),
            batch_delay: self.dispatch.batch_delay(),
        })
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
    #[serde(default = "default_upload_limit")]
    pub upload_limit_bytes: usize,
}

fn default_upload_limit() -> usize {
    5 * 1024 * 1024
}

/// Raw dispatch limits, as configured.
///
/// A limit that is missing, unparsable or not positive falls back to its
/// default instead of failing startup.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct DispatchSettings {
    pub batch_size: Option<String>,
    pub daily_cap: Option<String>,
    pub batch_delay_milliseconds: Option<String>,
}

impl DispatchSettings {
    pub fn limits(&self) -> Limits {
        Limits::from_raw(self.batch_size.as_deref(), self.daily_cap.as_deref())
    }

    /// Zero is allowed and disables the pause; anything unparsable means the default.
    pub fn batch_delay(&self) -> Duration {
        self.batch_delay_milliseconds
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_BATCH_DELAY)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct SenderSettings {
    pub name: String,
    pub email: String,
}

/// Connection settings for the SMTP relay, read from `SMTP_*` variables.
#[derive(Deserialize, Clone, Debug)]
pub struct RelaySettings {
    #[serde(default = "default_relay_host")]
    pub host: String,
    #[serde(default = "default_relay_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default = "empty_secret")]
    pub pass: Secret<String>,
    /// Skips certificate verification. Insecure; kept for relays behind
    /// TLS-intercepting proxies.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub require_tls: bool,
    #[serde(default = "default_relay_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_relay_pool_size")]
    pub pool_size: u32,
}

impl RelaySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            host: default_relay_host(),
            port: default_relay_port(),
            user: String::new(),
            pass: empty_secret(),
            accept_invalid_certs: default_accept_invalid_certs(),
            require_tls: false,
            timeout_seconds: default_relay_timeout(),
            pool_size: default_relay_pool_size(),
        }
    }
}

fn default_relay_host() -> String {
    "smtp-relay.brevo.com".to_string()
}

fn default_relay_port() -> u16 {
    587
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_relay_timeout() -> u64 {
    60
}

fn default_relay_pool_size() -> u32 {
    5
}

#[derive(PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            _ => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                s
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, anyhow::Error> {
    let base_path = std::env::current_dir().context("Failed to determine the current directory")?;
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment.
    // Default to `local` if not specified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(anyhow::Error::msg)
        .context("Failed to parse APP_ENVIRONMENT.")?;

    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base")).required(true))
        .add_source(File::from(configuration_directory.join(environment.as_str())).required(true))
        // E.g. `APP_DISPATCH__BATCH_SIZE=25` sets `Settings.dispatch.batch_size`.
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut settings: Settings = settings.try_deserialize()?;

    if environment == Environment::Local {
        // Optional: credentials may just as well come from the real environment.
        let _ = dotenvy::from_filename(configuration_directory.join("relay.env"));
    }

    settings.relay = envy::prefixed("SMTP_")
        .from_env::<RelaySettings>()
        .context("Failed to parse relay settings from environment")?;

    Ok(settings)
}
