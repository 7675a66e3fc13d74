//! Shared application state for the `VirtuePAI` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. Nothing in it is mutated after construction, so
//! concurrent requests never contend on it.

use std::path::PathBuf;
use std::sync::Arc;

use virtuepai_core::crypto::CredentialCodec;
use virtuepai_core::mail::MailSettings;

use crate::config::ServerConfig;
use crate::mailer::Mailer;
use crate::proxy::ChatProxy;
use crate::upstream::{CompletionClient, UpstreamError};

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Upstream chat proxy with keyword fallback.
    pub chat: ChatProxy,
    /// Codec for the encrypted mail password.
    pub codec: CredentialCodec,
    /// Raw mail settings, resolved on each contact submission.
    pub mail_settings: MailSettings,
    /// Contact notification delivery.
    pub mailer: Arc<dyn Mailer>,
    /// Recipient of contact notifications.
    pub contact_recipient: String,
    /// Sales directory JSON file.
    pub sales_team_path: PathBuf,
}

impl AppState {
    /// Build state from configuration and a mail delivery backend.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &ServerConfig, mailer: Arc<dyn Mailer>) -> Result<Self, UpstreamError> {
        let upstream = CompletionClient::new(config.upstream.clone())?;
        Ok(Self {
            chat: ChatProxy::new(upstream),
            codec: CredentialCodec::new(config.encryption_key.clone()),
            mail_settings: config.mail.clone(),
            mailer,
            contact_recipient: config.contact_recipient.clone(),
            sales_team_path: config.sales_team_path.clone(),
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
