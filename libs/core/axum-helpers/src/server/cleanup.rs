//! Connection cleanup during graceful shutdown.

use tracing::{error, info};

/// Close a SeaORM connection, logging the outcome.
pub async fn close_postgres(db: sea_orm::DatabaseConnection, name: &str) {
    match db.close().await {
        Ok(_) => info!("PostgreSQL connection '{}' closed", name),
        Err(e) => error!("error closing PostgreSQL connection '{}': {}", name, e),
    }
}

/// Release a Redis connection manager.
///
/// The underlying connection closes on drop; this exists for symmetric
/// logging with [`close_postgres`].
pub async fn close_redis(redis: redis::aio::ConnectionManager, name: &str) {
    drop(redis);
    info!("Redis connection '{}' closed", name);
}

/// Runs named cleanup tasks and waits for all of them.
pub struct CleanupCoordinator {
    tasks: Vec<(&'static str, tokio::task::JoinHandle<()>)>,
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Spawn a cleanup task and track it for completion.
    pub fn add_task<F>(&mut self, name: &'static str, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        self.tasks.push((name, handle));
    }

    /// Wait for every task. A panicking task is logged, not propagated.
    pub async fn run(self) {
        info!("running {} cleanup tasks", self.tasks.len());

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(_) => info!("cleanup task '{}' completed", name),
                Err(e) => error!("cleanup task '{}' failed: {}", name, e),
            }
        }
    }
}

impl Default for CleanupCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn runs_all_tasks() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut cleanup = CleanupCoordinator::new();

        for name in ["postgres", "redis"] {
            let counter = counter.clone();
            cleanup.add_task(name, async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        cleanup.run().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
