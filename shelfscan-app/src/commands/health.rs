use crate::config::Config;
use anyhow::{Context, Result};
use shelfscan_client::WarehouseClient;

pub async fn run() -> Result<()> {
    println!("🏥 Health Check\n");

    let config = Config::load().context("Config not found. Run 'shelfscan' once to create it.")?;
    config.validate()?;

    let client = WarehouseClient::new(config.base_url(), config.request_timeout(), 0);
    check(&client).await
}

/// Probe the server's health endpoint and print the verdict.
pub async fn check(client: &WarehouseClient) -> Result<()> {
    print!("🌐 Warehouse API at {}... ", client.base_url());
    match client.health().await {
        Ok(health) if health.is_ok() => {
            println!("✓ ({})", health.message);
            println!("\n✅ Server is healthy");
            Ok(())
        }
        Ok(health) => {
            println!("✗ ({})", health.status);
            anyhow::bail!("Server reported status '{}'", health.status)
        }
        Err(e) => {
            println!("✗ ({})", e);
            Err(e).context("Health check failed")
        }
    }
}
