//! Account mail flows: render a template and hand it to the provider.

use crate::error::NotificationResult;
use crate::providers::{EmailContent, EmailProvider, SentEmail};
use crate::templates::{AccountEmailData, RenderedEmail, TemplateEngine};
use std::sync::Arc;
use tracing::{info, warn};

/// Sends activation and password-reset emails.
///
/// Delivery errors are returned to the caller; nothing is queued or retried.
pub struct AccountMailer {
    provider: Arc<dyn EmailProvider>,
    templates: TemplateEngine,
    frontend_url: String,
}

impl AccountMailer {
    pub fn new(provider: Arc<dyn EmailProvider>, frontend_url: impl Into<String>) -> NotificationResult<Self> {
        Ok(Self {
            provider,
            templates: TemplateEngine::new()?,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn health_check(&self) -> NotificationResult<()> {
        self.provider.health_check().await
    }

    pub async fn send_account_activation(&self, email: &str, token: &str) -> NotificationResult<SentEmail> {
        let data = self.data(email, token, "activate");
        let rendered = self.templates.render_activation(&data)?;
        self.deliver(email, rendered, "activation").await
    }

    pub async fn send_password_reset(&self, email: &str, token: &str) -> NotificationResult<SentEmail> {
        let data = self.data(email, token, "password-reset");
        let rendered = self.templates.render_password_reset(&data)?;
        self.deliver(email, rendered, "password_reset").await
    }

    fn data(&self, email: &str, token: &str, page: &str) -> AccountEmailData {
        AccountEmailData {
            email: email.to_string(),
            token: token.to_string(),
            link: format!("{}/{page}/{token}", self.frontend_url),
        }
    }

    async fn deliver(&self, email: &str, rendered: RenderedEmail, kind: &str) -> NotificationResult<SentEmail> {
        let content = EmailContent {
            to_email: email.to_string(),
            subject: rendered.subject,
            html_body: rendered.html,
            text_body: rendered.text,
        };

        match self.provider.send(&content).await {
            Ok(sent) => {
                info!(to = %email, kind, provider = self.provider.name(), "Account email sent");
                Ok(sent)
            }
            Err(e) => {
                warn!(to = %email, kind, provider = self.provider.name(), error = %e, "Account email failed");
                Err(e)
            }
        }
    }
}
