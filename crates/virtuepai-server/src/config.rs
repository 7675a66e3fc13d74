//! Server configuration for `VirtuePAI`.
//!
//! Loads configuration from environment variables. Operational settings have
//! defaults; the encryption key and the upstream API token do not, and their
//! absence is a startup error.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use virtuepai_core::crypto::EncryptionKey;
use virtuepai_core::error::CodecError;
use virtuepai_core::mail::MailSettings;

/// Default upstream chat-completion endpoint.
pub const DEFAULT_CHAT_API_URL: &str = "https://api.guiji.ai/v1/chat/completions";

/// Default upstream model.
pub const DEFAULT_CHAT_MODEL: &str = "deepseek-r1";

/// Upper bound on extra attempts after a failed upstream call.
pub const MAX_CHAT_RETRIES: u8 = 1;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required secret is unset or empty.
    #[error("{name} must be set")]
    MissingSecret { name: &'static str },

    /// The encryption key has the wrong shape.
    #[error("ENCRYPTION_KEY is invalid: {0}")]
    InvalidKey(#[from] CodecError),

    /// A setting could not be parsed.
    #[error("{name} is invalid: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Key for the mail-password codec.
    pub encryption_key: EncryptionKey,
    /// Upstream chat-completion settings.
    pub upstream: UpstreamConfig,
    /// Raw mail settings, resolved per request.
    pub mail: MailSettings,
    /// Where contact-form notifications are delivered.
    pub contact_recipient: String,
    /// JSON file served by `GET /api/sales`.
    pub sales_team_path: PathBuf,
}

/// Upstream chat-completion API settings.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub endpoint: String,
    /// Bearer token. Never logged.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra attempts after the first failure, at most [`MAX_CHAT_RETRIES`].
    pub max_retries: u8,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl UpstreamConfig {
    /// Settings for `endpoint` with the stock model parameters.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.to_owned(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(15),
            max_retries: 0,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on, binds to `0.0.0.0`
    /// - `VIRTUEPAI_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:3000`)
    /// - `VIRTUEPAI_LOG_LEVEL` — log filter (default: `info`)
    /// - `ENCRYPTION_KEY` — 64 hex chars or 32 bytes (required)
    /// - `GUIJI_API_KEY` / `DEEPSEEK_API_KEY` — upstream bearer token (one required)
    /// - `CHAT_API_URL` — upstream endpoint (default: guiji.ai completions)
    /// - `CHAT_MODEL` — model name (default: `deepseek-r1`)
    /// - `CHAT_TIMEOUT_SECS` — per-attempt timeout (default: `15`)
    /// - `CHAT_MAX_RETRIES` — extra attempts, clamped to `1` (default: `0`)
    /// - `EMAIL_HOST`, `EMAIL_PORT`, `EMAIL_SECURE`, `EMAIL_USER`, `EMAIL_PASSWORD`
    /// - `CONTACT_RECIPIENT` — notification address (default: `sales@virtuepai.com`)
    /// - `SALES_TEAM_PATH` — sales directory JSON (default: `data/salesTeam.json`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required secret is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Priority: VIRTUEPAI_BIND_ADDR > PORT > default 127.0.0.1:3000
        let bind_addr = if let Some(addr) = get("VIRTUEPAI_BIND_ADDR") {
            addr.parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "VIRTUEPAI_BIND_ADDR",
                    reason: e.to_string(),
                })?
        } else if let Some(port) = get("PORT") {
            let port: u16 = parse_number("PORT", &port)?;
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 3000))
        };

        let log_level = get("VIRTUEPAI_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let raw_key = get("ENCRYPTION_KEY").ok_or(ConfigError::MissingSecret {
            name: "ENCRYPTION_KEY",
        })?;
        let encryption_key = EncryptionKey::from_config_str(&raw_key)?;

        let api_key = get("GUIJI_API_KEY")
            .or_else(|| get("DEEPSEEK_API_KEY"))
            .ok_or(ConfigError::MissingSecret {
                name: "GUIJI_API_KEY",
            })?;

        let mut upstream = UpstreamConfig::new(
            get("CHAT_API_URL").unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_owned()),
            api_key,
        );
        if let Some(model) = get("CHAT_MODEL") {
            upstream.model = model;
        }
        if let Some(secs) = get("CHAT_TIMEOUT_SECS") {
            let secs: u64 = parse_number("CHAT_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "CHAT_TIMEOUT_SECS",
                    reason: "must be greater than zero".to_owned(),
                });
            }
            upstream.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = get("CHAT_MAX_RETRIES") {
            let retries: u8 = parse_number("CHAT_MAX_RETRIES", &retries)?;
            upstream.max_retries = retries.min(MAX_CHAT_RETRIES);
        }

        let mail = MailSettings {
            host: lookup("EMAIL_HOST"),
            port: lookup("EMAIL_PORT"),
            secure: lookup("EMAIL_SECURE"),
            user: lookup("EMAIL_USER"),
            password: lookup("EMAIL_PASSWORD"),
        };

        let contact_recipient =
            get("CONTACT_RECIPIENT").unwrap_or_else(|| "sales@virtuepai.com".to_owned());

        let sales_team_path = get("SALES_TEAM_PATH")
            .map_or_else(|| PathBuf::from("data/salesTeam.json"), PathBuf::from);

        Ok(Self {
            bind_addr,
            log_level,
            encryption_key,
            upstream,
            mail,
            contact_recipient,
            sales_team_path,
        })
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name,
        reason: e.to_string(),
    })
}
