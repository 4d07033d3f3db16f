//! SMTP transport using lettre.

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from_email: String,
    pub from_name: String,
    /// Optional for local catch-all servers such as Mailpit
    pub username: Option<String>,
    pub password: Option<String>,
    /// STARTTLS relay when true, plaintext otherwise
    pub use_tls: bool,
    pub timeout: Duration,
}

impl SmtpConfig {
    pub fn new(host: impl Into<String>, port: u16, from_email: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            from_email: from_email.into(),
            from_name: "Accounts".to_string(),
            username: None,
            password: None,
            use_tls: false,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Environment variables (defaults target a local Mailpit):
/// - `SMTP_HOST` (localhost), `SMTP_PORT` (1025)
/// - `SMTP_FROM_EMAIL` (noreply@localhost), `SMTP_FROM_NAME` (Accounts)
/// - `SMTP_USERNAME`, `SMTP_PASSWORD` (unset)
/// - `SMTP_USE_TLS` (false), `SMTP_TIMEOUT_SECS` (10)
impl FromEnv for SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        Ok(Self {
            host: env_or_default("SMTP_HOST", "localhost"),
            port: env_parse_or("SMTP_PORT", 1025u16)?,
            from_email: env_or_default("SMTP_FROM_EMAIL", "noreply@localhost"),
            from_name: env_or_default("SMTP_FROM_NAME", "Accounts"),
            username: non_empty("SMTP_USERNAME"),
            password: non_empty("SMTP_PASSWORD"),
            use_tls: env_parse_or("SMTP_USE_TLS", false)?,
            timeout: Duration::from_secs(env_parse_or("SMTP_TIMEOUT_SECS", 10u64)?),
        })
    }
}

pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    config: SmtpConfig,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| NotificationError::ConfigError(format!("Invalid from address: {e}")))?;

        Ok(Self {
            transport,
            from,
            config,
        })
    }

    fn build_transport(config: &SmtpConfig) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| NotificationError::ConfigError(format!("Failed to create SMTP relay: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let mut builder = builder.port(config.port).timeout(Some(config.timeout));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    fn build_message(&self, email: &EmailContent) -> NotificationResult<Message> {
        let to: Mailbox = email
            .to_email
            .parse()
            .map_err(|e| NotificationError::InvalidEmail(format!("{}: {e}", email.to_email)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| NotificationError::ProviderError(format!("Failed to build email message: {e}")))
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        debug!(
            to = %email.to_email,
            subject = %email.subject,
            host = %self.config.host,
            port = self.config.port,
            "Sending email via SMTP"
        );

        let message = self.build_message(email)?;

        let response = self.transport.send(message).await.map_err(|e| {
            error!(to = %email.to_email, error = %e, "Failed to send email via SMTP");
            NotificationError::ProviderError(format!("SMTP send failed: {e}"))
        })?;

        let message_id = response.message().next().map(str::to_string);
        info!(to = %email.to_email, message_id = ?message_id, "Email sent via SMTP");

        Ok(SentEmail {
            message_id,
            accepted: response.is_positive(),
        })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn health_check(&self) -> NotificationResult<()> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(NotificationError::ProviderError(
                "SMTP server did not accept the connection".to_string(),
            )),
            Err(e) => Err(NotificationError::ProviderError(format!("SMTP health check failed: {e}"))),
        }
    }
}
