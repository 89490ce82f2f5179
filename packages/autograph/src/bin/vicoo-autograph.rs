//! Vicoo Auto-Graph Daemon
//!
//! Owns the database file for the lifetime of the process, checkpoints it
//! periodically, and runs the graph synthesis timer until Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! DATABASE_URL=./data/vicoo.db VICOO_SEED=1 cargo run --bin vicoo-autograph
//! ```
//!
//! See `AutoGraphConfig::from_env` for the synthesis settings.

use std::sync::Arc;
use vicoo_autograph::{init_tracing, open_store, seed_requested};
use vicoo_core::db::FlushTask;
use vicoo_core::services::{
    seed_development_data, AutoGraphConfig, AutoGraphProcessor, CliReasoningClient,
    GraphSynthesisService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("🚀 Vicoo auto-graph daemon");

    let store = open_store().await?;

    if seed_requested() {
        seed_development_data(&store).await?;
    }

    let flush_task = FlushTask::start(store.database().clone(), FlushTask::interval_from_env());

    let config = AutoGraphConfig::from_env();
    tracing::info!(
        "User: {}, retention: {}, min notes: {}",
        config.user_id,
        config.retention,
        config.min_notes_to_generate
    );

    let client = CliReasoningClient::from_env();
    let status = client.status().await;
    if status.available {
        tracing::info!(
            "Reasoning tool ready: {}",
            status.version.as_deref().unwrap_or("unknown version")
        );
    } else {
        tracing::warn!(
            "Reasoning tool unavailable ({}); full regenerations will fail until it is installed",
            status.message
        );
    }

    let service = Arc::new(GraphSynthesisService::new(
        store.clone(),
        Arc::new(client),
        config,
    ));
    let processor = AutoGraphProcessor::start(service);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    processor.shutdown().await;
    flush_task.shutdown().await;

    Ok(())
}
