//! Dashboard — Axum web server for monitoring and control.
//!
//! Serves the JSON control API and a self-contained HTML panel.
//! CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// The embedded control panel (compiled into the binary).
const PANEL_HTML: &str = include_str!("templates/index.html");

/// Run the web server until shutdown (ctrl-c).
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    info!(host, port, "Control surface listening on http://{host}:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("Server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // API routes
        .route("/api/status", get(routes::get_status))
        .route("/api/wallet", get(routes::get_wallet))
        .route("/api/orders", get(routes::get_orders))
        .route("/api/scan", get(routes::get_scan))
        .route("/api/settings", post(routes::post_settings))
        .route("/api/search", get(routes::get_search))
        .route("/api/debug/markets", get(routes::get_debug_markets))
        .route("/health", get(routes::health))
        // Control panel HTML
        .route("/", get(serve_panel))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML panel.
async fn serve_panel() -> Html<&'static str> {
    Html(PANEL_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
