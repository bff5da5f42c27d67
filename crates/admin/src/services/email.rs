//! Email delivery for notifications.
//!
//! Uses SMTP via lettre with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use craftline_core::Email;

use crate::config::EmailConfig;

/// HTML template for notification email.
#[derive(Template)]
#[template(path = "email/notification.html")]
struct NotificationEmailHtml<'a> {
    title: &'a str,
    body: &'a str,
}

/// Plain text template for notification email.
#[derive(Template)]
#[template(path = "email/notification.txt")]
struct NotificationEmailText<'a> {
    title: &'a str,
    body: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for notification delivery.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be constructed.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a notification email.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_notification(
        &self,
        to: &Email,
        title: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let html = NotificationEmailHtml { title, body }.render()?;
        let text = NotificationEmailText { title, body }.render()?;

        self.send_multipart_email(to.as_str(), title, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_templates_render() {
        let html = NotificationEmailHtml {
            title: "Order shipped",
            body: "Order ORD-42 left the warehouse.",
        }
        .render()
        .expect("html template renders");
        assert!(html.contains("Order shipped"));
        assert!(html.contains("ORD-42"));

        let text = NotificationEmailText {
            title: "Order shipped",
            body: "Order ORD-42 left the warehouse.",
        }
        .render()
        .expect("text template renders");
        assert!(text.contains("Order shipped"));
    }

    #[test]
    fn test_html_template_escapes_markup() {
        let html = NotificationEmailHtml {
            title: "<script>alert(1)</script>",
            body: "safe",
        }
        .render()
        .expect("render");
        assert!(!html.contains("<script>"));
    }
}
