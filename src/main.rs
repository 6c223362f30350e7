use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use toxtrack::config::AppConfig;
use toxtrack::db::Repository;
use toxtrack::services::AppState;
use toxtrack::{metrics, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables and configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.rust_log))
        .init();

    info!("Starting toxtrack v{}", env!("CARGO_PKG_VERSION"));

    // Metrics recorder
    let metrics_handle = metrics::install_recorder()?;
    metrics::register_metrics();

    // Database connection and schema bootstrap
    let repo = Repository::connect(&config.database).await?;
    info!("Connected to database");

    // App state and router
    let state = AppState::new(repo);
    let app = routes::create_router(state, metrics_handle);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
