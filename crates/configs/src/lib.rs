//! # configs
//!
//! Typed settings for the CampusFound binary, loaded from layered sources:
//! `config/default.toml`, then `config/<profile>.toml`, then environment
//! variables prefixed `CAMPUSFOUND_` (with `__` as the section separator).
//! Secrets ride in `SecretString` and never appear in Debug output.
//!
//! Feature flags mirror the adapter features, so a binary built without a
//! backend cannot be configured to use it.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub media: MediaSettings,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    /// Default tracing filter; overridden by RUST_LOG.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Default)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreSettings {
    /// Hosted document store, PostgREST-style.
    #[cfg(feature = "store-rest")]
    Rest {
        base_url: String,
        api_key: SecretString,
        #[serde(default = "default_poll_secs")]
        poll_secs: u64,
    },
    /// In-process store for development.
    #[default]
    Memory,
}

fn default_poll_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum AuthSettings {
    /// Campus identity gateway (device-authorization flow).
    #[cfg(feature = "auth-oidc")]
    Oidc {
        issuer: String,
        client_id: String,
        token_secret: SecretString,
    },
    /// Instant local sign-in for development.
    Dev {
        uid: String,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self::Dev {
            uid: "dev-user".to_string(),
            display_name: Some("Dev User".to_string()),
            email: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(tag = "host", rename_all = "lowercase")]
pub enum MediaSettings {
    /// Third-party image host, imgbb-style.
    #[cfg(feature = "media-imgbb")]
    Imgbb {
        endpoint: String,
        api_key: SecretString,
    },
    /// In-process host for development.
    #[default]
    Memory,
}

impl Settings {
    /// Layered load. Missing files are fine; the in-memory defaults give a
    /// runnable dev profile with no configuration at all.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        let profile =
            std::env::var("CAMPUSFOUND_PROFILE").unwrap_or_else(|_| "default".to_string());
        debug!(%profile, "loading configuration");
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            .add_source(Environment::with_prefix("CAMPUSFOUND").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
