//! Email transports behind the [`EmailProvider`] trait.

mod memory;
mod smtp;

pub use memory::MemoryEmailProvider;
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::NotificationResult;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Provider message id, when the transport reports one
    pub message_id: Option<String>,
    pub accepted: bool,
}

/// A rendered message ready for a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailContent {
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> NotificationResult<()>;
}
