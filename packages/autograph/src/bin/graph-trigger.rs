//! Run one full graph regeneration and print its summary as JSON
//!
//! Exits with an error when fewer unlinked notes than the threshold exist.

use std::sync::Arc;
use vicoo_autograph::{init_tracing, open_store};
use vicoo_core::services::{AutoGraphConfig, CliReasoningClient, GraphSynthesisService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let store = open_store().await?;
    let service = GraphSynthesisService::new(
        store,
        Arc::new(CliReasoningClient::from_env()),
        AutoGraphConfig::from_env(),
    );

    let summary = service.trigger_graph_generation().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
