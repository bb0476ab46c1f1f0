//! HTTP surface: router, shared state, and server lifecycle.

mod error;
mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use quizlens_core::config::{LimitsConfig, ServerConfig};
use quizlens_core::{Analyzer, Config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Static facts reported by `GET /`.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub platform: String,
    pub port: u16,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub info: Arc<ServerInfo>,
}

/// Permissive CORS for browser clients.
///
/// Browsers reject `*` together with credentials, so the credentialed
/// variant mirrors the request's origin, method and headers instead.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.cors_allow_credentials {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the application router.
pub fn build_router(state: AppState, server: &ServerConfig, limits: &LimitsConfig) -> Router {
    let body_limit = (limits.max_upload_mb as usize).saturating_mul(1024 * 1024);

    Router::new()
        .route("/", get(handlers::home))
        .route("/upload", post(handlers::upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn run(config: Config, analyzer: Analyzer) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to bind {}:{}: {e}",
                config.server.host,
                config.server.port
            )
        })?;
    let addr = listener.local_addr()?;

    let state = AppState {
        analyzer: Arc::new(analyzer),
        info: Arc::new(ServerInfo {
            platform: std::env::consts::OS.to_string(),
            port: addr.port(),
        }),
    };
    let app = build_router(state, &config.server, &config.limits);

    tracing::info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
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
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
