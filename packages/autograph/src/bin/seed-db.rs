//! Seed the development database with the sample user and notes

use vicoo_autograph::{init_tracing, open_store};
use vicoo_core::services::seed_development_data;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let store = open_store().await?;
    if seed_development_data(&store).await? {
        println!("✅ Development seed completed");
    } else {
        println!("Seed already applied, nothing to do");
    }

    Ok(())
}
