use car_shop::api;
use car_shop::config::AppConfig;
use car_shop::storage::DocumentStore;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so the configured level applies
    let config = AppConfig::load()?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = DocumentStore::with_config(config.storage.clone());
    let app = api::create_router(store, &config.api);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Car shop API starting...");
    info!("REST API running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Car shop API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
