//! Outbound SMTP Mail
//!
//! Thin wrapper over `mail-send`/`mail-builder` with a primary relay
//! and an optional fallback relay. Delivery goes to the fallback only
//! after the primary fails, so a flaky primary degrades latency but
//! not delivery.

use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use thiserror::Error;

/// A single SMTP relay endpoint
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Use implicit TLS (SMTPS, typically port 465) instead of STARTTLS
    pub implicit_tls: bool,
}

/// Mailer configuration: sender identity plus relay endpoints
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Display name for the From header
    pub from_name: String,
    /// Sender address
    pub from_address: String,
    pub primary: RelayConfig,
    pub fallback: Option<RelayConfig>,
}

/// Mail delivery errors
#[derive(Debug, Error)]
pub enum MailError {
    /// All configured relays refused or failed to deliver
    #[error("Mail delivery failed on all relays: {0}")]
    DeliveryFailed(String),
}

/// An outbound message before relay-specific framing
#[derive(Debug, Clone)]
pub struct OutboundMail {
    pub to_name: String,
    pub to_address: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Send a message through the primary relay, falling back on failure
pub async fn send_mail(config: &MailerConfig, mail: &OutboundMail) -> Result<(), MailError> {
    match deliver(config, &config.primary, mail).await {
        Ok(()) => Ok(()),
        Err(primary_err) => {
            let Some(fallback) = &config.fallback else {
                return Err(MailError::DeliveryFailed(primary_err.to_string()));
            };

            tracing::warn!(
                relay = %config.primary.host,
                error = %primary_err,
                "Primary mail relay failed, retrying via fallback"
            );

            deliver(config, fallback, mail).await.map_err(|fallback_err| {
                MailError::DeliveryFailed(format!(
                    "primary: {primary_err}; fallback: {fallback_err}"
                ))
            })
        }
    }
}

async fn deliver(
    config: &MailerConfig,
    relay: &RelayConfig,
    mail: &OutboundMail,
) -> Result<(), mail_send::Error> {
    let message = MessageBuilder::new()
        .from((config.from_name.as_str(), config.from_address.as_str()))
        .to((mail.to_name.as_str(), mail.to_address.as_str()))
        .subject(mail.subject.as_str())
        .html_body(mail.html_body.as_str())
        .text_body(mail.text_body.as_str());

    SmtpClientBuilder::new(relay.host.as_str(), relay.port)
        .implicit_tls(relay.implicit_tls)
        .credentials((relay.username.as_str(), relay.password.as_str()))
        .connect()
        .await?
        .send(message)
        .await
}
