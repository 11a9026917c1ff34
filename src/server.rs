//! HTTP server configuration and request routing.
//!
//! Provides the Axum server setup with middleware stack and graceful
//! shutdown for the inbound webhook listener. Requests flow through
//! middleware in order:
//! 1. Request ID generation
//! 2. Request/response logging
//! 3. Timeout enforcement, sized above the worst-case delivery schedule
//! 4. Handler execution

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{base::types::Void, interaction::ticket_event, runtime::Runtime};

/// Creates the Axum router with all routes and middleware.
///
/// The request timeout is derived from the delivery settings and outlasts
/// the full delivery schedule; a delivery that times out on every attempt is
/// answered with the handler's own status, never cut off by this layer.
pub fn create_router(runtime: Runtime) -> Router {
    Router::new()
        .route("/webhooks/helpdesk", post(ticket_event::handle_ticket_event))
        .route("/health", get(health_check))
        .layer(TimeoutLayer::new(runtime.config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(runtime)
}

/// Liveness endpoint for service monitoring.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Middleware to inject a request ID into all responses.
///
/// Adds an `X-Request-Id` header for correlating a webhook with the relay
/// attempt it triggered.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Binds the listener and serves requests until a shutdown signal arrives.
pub async fn serve(runtime: Runtime) -> Void {
    let addr = format!("{}:{}", runtime.config.host, runtime.config.port).parse::<SocketAddr>()?;
    let app = create_router(runtime);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Webhook listener bound on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server stopped gracefully.");

    Ok(())
}

/// Waits for a shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received CTRL+C, starting graceful shutdown."),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown."),
    }

    warn!("Waiting for in-flight requests to complete.");
}
