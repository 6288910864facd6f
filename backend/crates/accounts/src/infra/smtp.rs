//! SMTP Mailer Implementation
//!
//! Builds the verification message and delivers it through the
//! platform mailer (primary relay with fallback).

use platform::mailer::{MailerConfig, OutboundMail, send_mail};

use crate::domain::repository::Mailer;
use crate::domain::value_object::Email;
use crate::error::AccountResult;

/// SMTP-backed mailer
#[derive(Clone)]
pub struct SmtpMailer {
    config: MailerConfig,
    /// Base URL of the verification endpoint the link points at
    verification_url: String,
}

impl SmtpMailer {
    pub fn new(config: MailerConfig, verification_url: String) -> Self {
        Self {
            config,
            verification_url,
        }
    }

    fn verification_link(&self, token: &str) -> String {
        format!("{}?verification_email_token={}", self.verification_url, token)
    }
}

impl Mailer for SmtpMailer {
    async fn send_verification_email(
        &self,
        to: &Email,
        name: &str,
        token: &str,
    ) -> AccountResult<()> {
        let link = self.verification_link(token);

        let mail = OutboundMail {
            to_name: name.to_string(),
            to_address: to.as_str().to_string(),
            subject: "Confirm your email address".to_string(),
            html_body: format!(
                "<p>Hello, {name}!</p>\
                 <p>Please confirm your email address by following \
                 <a href=\"{link}\">this link</a>.</p>\
                 <p>If you did not register, ignore this message.</p>"
            ),
            text_body: format!(
                "Hello, {name}!\n\n\
                 Please confirm your email address: {link}\n\n\
                 If you did not register, ignore this message.\n"
            ),
        };

        send_mail(&self.config, &mail).await?;

        tracing::info!(to = %to, "Verification email sent");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::mailer::RelayConfig;

    #[test]
    fn test_verification_link() {
        let mailer = SmtpMailer::new(
            MailerConfig {
                from_name: "Registration".to_string(),
                from_address: "noreply@example.com".to_string(),
                primary: RelayConfig {
                    host: "smtp.example.com".to_string(),
                    port: 465,
                    username: "noreply".to_string(),
                    password: "secret".to_string(),
                    implicit_tls: true,
                },
                fallback: None,
            },
            "https://example.com/verify".to_string(),
        );

        assert_eq!(
            mailer.verification_link("abc=="),
            "https://example.com/verify?verification_email_token=abc=="
        );
    }
}
