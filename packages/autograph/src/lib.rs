//! Shared setup for the Vicoo auto-graph binaries
//!
//! - `vicoo-autograph` - daemon: flush task plus the synthesis timer until Ctrl-C
//! - `graph-trigger` - one manual full regeneration, prints the summary as JSON
//! - `seed-db` - development sample data
//! - `graph-status` - reasoning tool availability probe
//!
//! All binaries read the database location from `DATABASE_URL`
//! (default `~/.vicoo/data/vicoo.db`) and log through `RUST_LOG`
//! (default `info`).

use std::sync::Arc;
use vicoo_core::db::{DatabaseService, LibsqlStore};

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Open the database at its configured location
pub async fn open_store() -> anyhow::Result<Arc<LibsqlStore>> {
    let db_path = DatabaseService::default_path();
    tracing::info!("Opening database at {}", db_path.display());
    let db = DatabaseService::new(db_path).await?;
    Ok(Arc::new(LibsqlStore::new(db)))
}

/// True when `VICOO_SEED` asks for development data on startup
pub fn seed_requested() -> bool {
    std::env::var("VICOO_SEED")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
