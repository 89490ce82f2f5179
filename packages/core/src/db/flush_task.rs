//! Periodic Flush Task
//!
//! Checkpoints the database at a fixed interval so writes made by the CRUD
//! surface survive a crash even when no synthesis run flushes explicitly.
//!
//! The task owns nothing but a clone of the `DatabaseService` handle and a
//! shutdown channel; dropping or shutting down the handle stops the loop.

use crate::db::DatabaseService;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Default flush period
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest accepted flush period; smaller values are raised to it
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Environment variable overriding the flush period (seconds)
pub const FLUSH_INTERVAL_ENV: &str = "VICOO_FLUSH_INTERVAL_SECS";

/// Handle to the background flush loop
pub struct FlushTask {
    shutdown_tx: mpsc::Sender<()>,
    join: tokio::task::JoinHandle<()>,
}

impl FlushTask {
    /// Spawn the flush loop
    ///
    /// The first flush happens one full `interval` after start. An interval
    /// below `MIN_FLUSH_INTERVAL` is raised to it.
    pub fn start(db: DatabaseService, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        if interval < MIN_FLUSH_INTERVAL {
            tracing::warn!(
                "Flush interval {:?} is too short, using {:?}",
                interval,
                MIN_FLUSH_INTERVAL
            );
        }
        let interval = interval.max(MIN_FLUSH_INTERVAL);

        tracing::info!("FlushTask starting (interval: {:?})", interval);

        let join = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.recv() => {
                        tracing::info!("FlushTask shutting down");
                        break;
                    }

                    _ = ticker.tick() => {
                        if let Err(e) = db.flush().await {
                            tracing::error!("Failed to flush database: {}", e);
                        }
                    }
                }
            }

            // Final flush so a clean shutdown never loses the last interval
            if let Err(e) = db.flush().await {
                tracing::warn!("Final flush failed: {}", e);
            }
        });

        Self { shutdown_tx, join }
    }

    /// Read the flush period from `VICOO_FLUSH_INTERVAL_SECS` (default 5s)
    pub fn interval_from_env() -> Duration {
        std::env::var(FLUSH_INTERVAL_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FLUSH_INTERVAL)
    }

    /// Stop the loop and wait for the final flush
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.join.await {
            tracing::warn!("FlushTask terminated abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_flush_task_shuts_down_cleanly() {
        let temp_dir = TempDir::new().unwrap();
        let db = DatabaseService::new(temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let task = FlushTask::start(db.clone(), Duration::from_millis(20));
        db.execute("INSERT INTO nodes (id, label) VALUES (?, ?)", ("n1", "Rust"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        tokio::time::timeout(Duration::from_secs(5), task.shutdown())
            .await
            .expect("shutdown should complete promptly");

        let count = db
            .query_one("SELECT COUNT(*) FROM nodes", (), |row| Ok(row.get::<i64>(0)?))
            .await
            .unwrap();
        assert_eq!(count, Some(1));
    }

    #[tokio::test]
    async fn test_zero_interval_is_raised_to_minimum() {
        let temp_dir = TempDir::new().unwrap();
        let db = DatabaseService::new(temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let task = FlushTask::start(db.clone(), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!task.join.is_finished(), "flush loop must survive a zero interval");

        tokio::time::timeout(Duration::from_secs(5), task.shutdown())
            .await
            .expect("shutdown should complete promptly");
    }
}
