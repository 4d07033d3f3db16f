//! In-process provider that records messages instead of delivering them.

use super::{EmailContent, EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::Mutex;

/// Captures sent emails; can be switched into a failing mode to simulate an
/// unreachable mail server.
#[derive(Debug, Clone, Default)]
pub struct MemoryEmailProvider {
    sent: Arc<Mutex<Vec<EmailContent>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let provider = Self::default();
        provider.set_failing(true);
        provider
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent_emails(&self) -> Vec<EmailContent> {
        self.sent.lock().await.clone()
    }

    pub async fn last_email(&self) -> Option<EmailContent> {
        self.sent.lock().await.last().cloned()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent.lock().await.iter().any(|e| e.to_email == email)
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl EmailProvider for MemoryEmailProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<SentEmail> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::ProviderError("Mail server unavailable".to_string()));
        }

        let mut sent = self.sent.lock().await;
        sent.push(email.clone());

        Ok(SentEmail {
            message_id: Some(format!("memory-{}", sent.len())),
            accepted: true,
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> NotificationResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::ProviderError("Mail server unavailable".to_string()));
        }
        Ok(())
    }
}
