//! Report whether the reasoning tool can be run, as JSON

use vicoo_autograph::init_tracing;
use vicoo_core::services::CliReasoningClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let client = CliReasoningClient::from_env();
    let status = client.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    if !status.available {
        std::process::exit(1);
    }
    Ok(())
}
