//! Outbound mail for contact-form notifications.
//!
//! [`Mailer`] is the seam between the contact route and SMTP so the route can
//! be exercised without a mail server. [`SmtpMailer`] builds a fresh
//! transport from the resolved [`MailTransportConfig`] for every message.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use virtuepai_core::mail::MailTransportConfig;

/// Port on which SMTP expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Errors from composing or delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// A sender or recipient address did not parse.
    #[error("invalid mail address: {0}")]
    Address(String),

    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Build(String),

    /// The SMTP exchange failed.
    #[error("smtp delivery failed: {0}")]
    Transport(String),
}

/// A rendered HTML notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// `Display Name <address>` or a bare address.
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Delivers rendered mail.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send `mail` using `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the message cannot be built or delivered.
    async fn send(
        &self,
        transport: &MailTransportConfig,
        mail: OutgoingMail,
    ) -> Result<(), MailError>;
}

/// SMTP delivery via `lettre`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpMailer;

impl SmtpMailer {
    fn transport(
        config: &MailTransportConfig,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        // Port 465 only speaks implicit TLS; everything else upgrades with STARTTLS.
        let builder = if config.secure || config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        };
        let builder = builder.map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build())
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        transport: &MailTransportConfig,
        mail: OutgoingMail,
    ) -> Result<(), MailError> {
        let message = Message::builder()
            .from(mail.from.parse().map_err(|e: lettre::address::AddressError| {
                MailError::Address(e.to_string())
            })?)
            .to(mail.to.parse().map_err(|e: lettre::address::AddressError| {
                MailError::Address(e.to_string())
            })?)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        Self::transport(transport)?
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!(host = %transport.host, port = transport.port, "notification mail sent");
        Ok(())
    }
}
