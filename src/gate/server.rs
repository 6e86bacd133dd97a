//! Gateway HTTP server

use crate::gate::config::GatewayConfig;
use crate::gate::handlers::{self, GatewayState};
use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::info;

/// Build the gateway router
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        // Native endpoint
        .route("/generate", post(handlers::generate_handler))
        // OpenAI-compatible endpoint
        .route("/v1/chat/completions", post(handlers::chat_completions_handler))
        // Utility endpoints
        .route("/healthz", get(handlers::health_check))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
}

/// Start the gateway server
pub async fn start_server(config: GatewayConfig, state: GatewayState) -> anyhow::Result<()> {
    let app = build_router(state);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}:{}: {}", config.host, config.port, e))?;

    info!("Starting gateway on http://{}", addr);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}

/// Logging middleware
async fn logging_middleware(req: Request, next: Next) -> axum::response::Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    info!("{} {} {} {:?}", method, uri, status, duration);

    response
}
