//! CalmCast API - Main Entry Point

use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_logging(&settings.logging)?;

    info!("=== CalmCast API v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting stress prediction service...");

    run_server(settings).await
}
