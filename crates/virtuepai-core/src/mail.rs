//! Mail transport configuration.
//!
//! [`MailSettings`] holds the raw configuration values as loaded by the
//! server. [`resolve_mail_config`] turns them into a [`MailTransportConfig`]
//! on each request that needs to send mail, decrypting the password when it
//! is stored in codec form.

use std::fmt;

use tracing::warn;

use crate::crypto::{CredentialCodec, looks_encoded};

/// SMTP host used when none is configured.
pub const DEFAULT_HOST: &str = "smtp.feishu.cn";

/// SMTP port used when none is configured.
pub const DEFAULT_PORT: u16 = 465;

/// Raw, unvalidated mail settings.
///
/// Empty strings are treated the same as absent values.
#[derive(Clone, Default)]
pub struct MailSettings {
    pub host: Option<String>,
    pub port: Option<String>,
    pub secure: Option<String>,
    pub user: Option<String>,
    /// Plaintext or codec-encoded password.
    pub password: Option<String>,
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Ready-to-use SMTP transport settings.
#[derive(Clone, PartialEq, Eq)]
pub struct MailTransportConfig {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub pass: String,
}

impl MailTransportConfig {
    /// Whether both a user and a password are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty() && !self.pass.is_empty()
    }
}

impl fmt::Debug for MailTransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailTransportConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Build the transport configuration from raw settings.
///
/// Defaults: host [`DEFAULT_HOST`], port [`DEFAULT_PORT`], `secure` only when
/// the raw value is exactly `"true"`, empty user and password. A password
/// containing `:` is decrypted with `codec`; any other password is used
/// verbatim so deployments that never encrypted it keep working.
///
/// Returns `None` when the password cannot be decrypted or the port is not a
/// valid number. The caller should treat that as "mail unavailable".
pub fn resolve_mail_config(
    settings: &MailSettings,
    codec: &CredentialCodec,
) -> Option<MailTransportConfig> {
    let port = match non_empty(settings.port.as_ref()) {
        Some(raw) => match raw.trim().parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                warn!(port = %raw, "mail port is not a valid number");
                return None;
            }
        },
        None => DEFAULT_PORT,
    };

    let raw_password = non_empty(settings.password.as_ref()).unwrap_or_default();
    let pass = if looks_encoded(raw_password) {
        let Ok(pass) = codec.decrypt(raw_password) else {
            warn!("mail password could not be decrypted");
            return None;
        };
        pass
    } else {
        raw_password.to_owned()
    };

    Some(MailTransportConfig {
        host: non_empty(settings.host.as_ref())
            .unwrap_or(DEFAULT_HOST)
            .to_owned(),
        port,
        secure: settings.secure.as_deref() == Some("true"),
        user: non_empty(settings.user.as_ref())
            .unwrap_or_default()
            .to_owned(),
        pass,
    })
}
