// Pupillix API server
// Decision: PostgreSQL when DATABASE_URL is set, in-memory dev mode otherwise
// Decision: Connect info is enabled so download tracking sees peer addresses

use anyhow::{Context, Result};
use pupillix_control_plane::auth::AuthConfig;
use pupillix_control_plane::build_app;
use pupillix_control_plane::config::ServerConfig;
use pupillix_control_plane::storage::StorageBackend;
use pupillix_core::telemetry::{init_telemetry, TelemetryConfig};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "pupillix" {
        telemetry_config.service_name = "pupillix-control-plane".to_string();
    }
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter =
            Some("info,pupillix_control_plane=debug,tower_http=debug".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(&telemetry_config)?;

    tracing::info!("pupillix-control-plane starting...");

    let config = ServerConfig::from_env()?;

    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            StorageBackend::in_memory()
        }
    };

    let auth_config = AuthConfig::from_env();
    tracing::info!(
        token_lifetime_secs = auth_config.jwt.token_lifetime.as_secs(),
        argon2_memory_kib = auth_config.argon2.memory_kib,
        "Authentication configured"
    );

    let app = build_app(&config, auth_config, Arc::new(db));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}:{}", config.host, config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
