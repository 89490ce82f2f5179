//! Background Auto-Graph Processor
//!
//! Drives `GraphSynthesisService::tick` from a timer:
//! - First tick after `initial_delay`, then one every `check_interval`
//! - A tick that is still running when the next one is due makes the next
//!   one a no-op (the service's in-progress flag), never a queued run
//! - Graceful shutdown between ticks
//!
//! When the configuration disables the job, `start` returns a handle with no
//! background task; the manual trigger still works through it.

use crate::services::error::SynthesisError;
use crate::services::graph_synthesis::{GenerationSummary, GraphSynthesisService, TickOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Shortest accepted tick period; smaller values are raised to it
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Handle to the background synthesis timer
pub struct AutoGraphProcessor {
    service: Arc<GraphSynthesisService>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl AutoGraphProcessor {
    /// Start the timer task for `service`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(service: Arc<GraphSynthesisService>) -> Self {
        let config = service.config().clone();

        if !config.enabled {
            tracing::info!("Auto graph generation is disabled");
            return Self {
                service,
                shutdown_tx: None,
                join: None,
            };
        }

        tracing::info!(
            "Starting auto graph service (interval: {:?}, first run in {:?})",
            config.check_interval,
            config.initial_delay
        );

        if config.check_interval < MIN_CHECK_INTERVAL {
            tracing::warn!(
                "Auto graph interval {:?} is too short, using {:?}",
                config.check_interval,
                MIN_CHECK_INTERVAL
            );
        }
        let check_interval = config.check_interval.max(MIN_CHECK_INTERVAL);

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let task_service = service.clone();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(
                tokio::time::Instant::now() + config.initial_delay,
                check_interval,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased; // Check shutdown first

                    _ = shutdown_rx.recv() => {
                        tracing::info!("Auto graph service stopped");
                        break;
                    }

                    _ = ticker.tick() => {
                        // Ticks run detached; overlap is resolved by the in-progress flag
                        let service = task_service.clone();
                        tokio::spawn(async move {
                            match service.tick().await {
                                TickOutcome::Skipped | TickOutcome::NothingToDo => {}
                                outcome => {
                                    tracing::debug!("Auto graph tick finished: {:?}", outcome)
                                }
                            }
                        });
                    }
                }
            }
        });

        Self {
            service,
            shutdown_tx: Some(shutdown_tx),
            join: Some(join),
        }
    }

    /// True when a timer task was started
    pub fn is_active(&self) -> bool {
        self.join.is_some()
    }

    /// Run a manual full regeneration through the shared service
    pub async fn trigger(&self) -> Result<GenerationSummary, SynthesisError> {
        self.service.trigger_graph_generation().await
    }

    /// Stop the timer
    ///
    /// A tick already in flight is not cancelled; it finishes on its own.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                tracing::warn!("Auto graph task terminated abnormally: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DatabaseService, GraphStore, LibsqlStore};
    use crate::models::NewNote;
    use crate::services::mock::MockReasoningClient;
    use crate::services::AutoGraphConfig;
    use tempfile::TempDir;

    async fn create_test_processor(
        config: AutoGraphConfig,
    ) -> (AutoGraphProcessor, Arc<LibsqlStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = DatabaseService::new(temp_dir.path().join("test.db"))
            .await
            .unwrap();
        let store = Arc::new(LibsqlStore::new(db));
        let service = Arc::new(GraphSynthesisService::new(
            store.clone(),
            Arc::new(MockReasoningClient::new()),
            config,
        ));
        (AutoGraphProcessor::start(service), store, temp_dir)
    }

    #[tokio::test]
    async fn test_timer_creates_stub_nodes() {
        let config = AutoGraphConfig::default()
            .with_intervals(Duration::from_millis(10), Duration::from_millis(50));
        let (processor, store, _temp_dir) = create_test_processor(config).await;
        assert!(processor.is_active());

        store
            .create_note(NewNote::new("dev_user_1", "Lonely note", "content"))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while store.list_nodes().await.unwrap().is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("timer should stub the note");

        processor.shutdown().await;
        assert_eq!(store.list_nodes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_interval_still_ticks() {
        let config = AutoGraphConfig::default().with_intervals(Duration::ZERO, Duration::ZERO);
        let (processor, store, _temp_dir) = create_test_processor(config).await;

        store
            .create_note(NewNote::new("dev_user_1", "Lonely note", "content"))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while store.list_nodes().await.unwrap().is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("timer should keep running with a zero interval");

        processor.shutdown().await;
    }

    #[tokio::test]
    async fn test_disabled_processor_has_no_task() {
        let config = AutoGraphConfig::default()
            .disabled()
            .with_intervals(Duration::from_millis(1), Duration::from_millis(5));
        let (processor, store, _temp_dir) = create_test_processor(config).await;
        assert!(!processor.is_active());

        store
            .create_note(NewNote::new("dev_user_1", "Lonely note", "content"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.list_nodes().await.unwrap().is_empty());

        let err = processor.trigger().await.unwrap_err();
        assert!(matches!(err, SynthesisError::InsufficientNotes { found: 1, .. }));
        processor.shutdown().await;
    }
}
