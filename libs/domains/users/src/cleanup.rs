//! Periodic removal of auth tokens that have not been used for a week.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::UserResult;
use crate::token::{TokenRepository, idle_cutoff};

pub struct TokenCleanupTask<T: TokenRepository> {
    tokens: Arc<T>,
    interval: Duration,
}

impl<T: TokenRepository + 'static> TokenCleanupTask<T> {
    pub fn new(tokens: Arc<T>, interval: Duration) -> Self {
        Self { tokens, interval }
    }

    /// One sweep. Returns the number of deleted tokens.
    pub async fn run_once(&self) -> UserResult<u64> {
        let cutoff = idle_cutoff(Utc::now());
        let deleted = self.tokens.delete_unused_since(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, %cutoff, "Removed stale auth tokens");
        }
        Ok(deleted)
    }

    /// Sweeps every `interval` until `shutdown` fires. Failures are logged
    /// and the loop keeps going.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(interval_secs = self.interval.as_secs(), "Token cleanup task started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            tracing::error!(error = %e, "Token cleanup failed");
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Token cleanup task stopping");
                        break;
                    }
                }
            }
        })
    }
}
