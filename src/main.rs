use backlog_api::config::config;
use backlog_api::database::DatabaseManager;
use backlog_api::is_development;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("backlog_api=info,tower_http=info")),
        )
        .init();

    let config = config();
    tracing::info!("Starting Backlog API in {:?} mode", config.environment);

    if config.security.jwt_secret.trim().is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if is_development!() {
        tracing::warn!("Development mode: using the built-in JWT secret unless JWT_SECRET is set");
    }

    let store = DatabaseManager::open_store(&config.database).await?;
    let app = backlog_api::api::router(store);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Backlog API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
