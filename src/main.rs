use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shrt::api;
use shrt::config::Config;
use shrt::shortener::Shortener;
use shrt::storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let storage = storage::connect(&config.database).await?;

    info!("Initializing database...");
    storage.init().await?;
    info!("Database initialized successfully");

    let shortener = Arc::new(Shortener::new(storage, config.shortener()));
    info!("Short URLs use base {}", shortener.base_url());

    let router = api::create_api_router(shortener);

    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 API server listening on http://{}", addr);
    info!("   - POST http://{}/encode", addr);
    info!("   - POST http://{}/decode", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
