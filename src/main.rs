use compass_director::config::AppConfig;
use env_logger::{Builder, Env};
use log::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    let config = AppConfig::load()?;
    log::info!("configuration loaded: address={}", config.address);

    compass_director::run_server(&config).await
}
