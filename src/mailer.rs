//! Outbound mail.
//!
//! Registration sends one welcome message carrying the activation link.
//! [`SmtpMailer`] delivers it over SMTP; [`LogMailer`] only logs it and is
//! used whenever SMTP is disabled.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use socialfeed_config::EmailConfig;
use socialfeed_core::AppError;
use tracing::{info, instrument};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_welcome(
        &self,
        username: &str,
        email: &str,
        activation_url: &str,
    ) -> Result<(), AppError>;
}

/// Picks the SMTP mailer when enabled, the logging one otherwise.
pub fn mailer_from_config(config: &EmailConfig) -> Arc<dyn Mailer> {
    if config.enabled {
        Arc::new(SmtpMailer::new(config.clone()))
    } else {
        Arc::new(LogMailer)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_welcome(
        &self,
        username: &str,
        email: &str,
        _activation_url: &str,
    ) -> Result<(), AppError> {
        info!(%username, %email, "smtp disabled, welcome mail not sent");
        Ok(())
    }
}

pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, AppError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );
        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::internal_error(format!("failed to create SMTP relay: {e}")))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }

    #[instrument(skip(self, text_body, html_body))]
    async fn send(
        &self,
        to_email: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);
        let message = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("invalid from address: {e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal_error(format!("invalid to address: {e}")))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("failed to build email: {e}")))?;

        let transport = self.transport()?;
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AppError::internal_error(format!("mail task failed: {e}")))?
            .map_err(|e| AppError::internal_error(format!("failed to send email: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_welcome(
        &self,
        username: &str,
        email: &str,
        activation_url: &str,
    ) -> Result<(), AppError> {
        let hours = self.config.invitation_ttl.as_secs() / 3600;
        let text_body = format!(
            "Hi {username},\n\n\
             Thanks for signing up to {app}.\n\n\
             Confirm your account by opening the link below:\n\
             {activation_url}\n\n\
             The link expires in {hours} hours.\n\n\
             If you did not sign up, you can ignore this email.",
            app = self.config.from_name,
        );
        let html_body = welcome_template(&self.config.from_name, username, activation_url, hours);

        self.send(
            email,
            &format!("Finish registration with {}", self.config.from_name),
            text_body,
            html_body,
        )
        .await
    }
}

fn welcome_template(app: &str, username: &str, activation_url: &str, hours: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Welcome to {app}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px;">
                    <tr>
                        <td style="background-color: #2563EB; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">{app}</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px; color: #444444; font-size: 16px; line-height: 1.5;">
                            <p>Hi <strong>{username}</strong>,</p>
                            <p>Thanks for signing up. Confirm your account to start posting:</p>
                            <p style="text-align: center; margin: 30px 0;">
                                <a href="{activation_url}" style="padding: 14px 40px; background-color: #2563EB; color: #ffffff; text-decoration: none; border-radius: 6px;">Activate account</a>
                            </p>
                            <p style="font-size: 14px; word-break: break-all;">{activation_url}</p>
                            <p style="font-size: 14px;"><strong>This link expires in {hours} hours.</strong></p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#
    )
}
