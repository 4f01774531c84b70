use ratesdash::{config::AppConfig, logger::init_tracing, manager::MarketDataManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    tracing::info!("Starting ratesdash...");

    let cfg = AppConfig::from_env();
    let manager = MarketDataManager::start(&cfg)?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    manager.shutdown().await;

    Ok(())
}
