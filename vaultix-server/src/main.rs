use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use vaultix_core::observability::logging::{init_tracing, LogFormat};
use vaultix_server::{
    build_router,
    config::ServerConfig,
    services::{FlatFileStore, InMemorySessionStore, SystemClock, TracingDelivery},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), vaultix_core::error::AppError> {
    // Fail fast on bad configuration
    let config = ServerConfig::from_env()?;

    init_tracing(&config.log_level, LogFormat::from_env());

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting Vaultix server"
    );

    let store = Arc::new(FlatFileStore::open(&config.store.data_file).await.map_err(
        |e| vaultix_core::error::AppError::StorageError(anyhow::anyhow!(e)),
    )?);
    tracing::info!(path = %config.store.data_file, "Store loaded");

    let clock = Arc::new(SystemClock);
    let sessions = Arc::new(InMemorySessionStore::new(clock.clone()));
    let delivery = Arc::new(TracingDelivery);

    let state = AppState::new(config.clone(), store, sessions, delivery, clock);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
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
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
