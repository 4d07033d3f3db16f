//! Resource cleanup run after the shutdown signal.

use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Closes a sea-orm connection pool and logs the outcome.
pub async fn close_postgres(db: sea_orm::DatabaseConnection, name: &str) {
    match db.close().await {
        Ok(_) => info!("PostgreSQL connection '{}' closed successfully", name),
        Err(e) => error!("Error closing PostgreSQL connection '{}': {}", name, e),
    }
}

/// Runs named cleanup tasks concurrently and waits for all of them.
///
/// ```ignore
/// let mut cleanup = CleanupCoordinator::new();
/// cleanup.add_handle("token-sweep", sweep_handle);
/// cleanup.add_task("postgres", async move { close_postgres(db, "main").await });
/// cleanup.run().await;
/// ```
#[derive(Default)]
pub struct CleanupCoordinator {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` immediately and tracks it.
    pub fn add_task<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((name, tokio::spawn(task)));
    }

    /// Tracks an already running task, e.g. a background loop that exits on shutdown.
    pub fn add_handle(&mut self, name: &'static str, handle: JoinHandle<()>) {
        self.tasks.push((name, handle));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// A failed task is logged and does not stop the others.
    pub async fn run(self) {
        info!("Running {} cleanup tasks", self.tasks.len());

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(_) => info!("Cleanup task '{}' completed successfully", name),
                Err(e) => error!("Cleanup task '{}' failed: {}", name, e),
            }
        }

        info!("All cleanup tasks completed");
    }
}
