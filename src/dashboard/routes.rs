//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ControlService>`.
//! Remote failures become structured `{error: ...}` payloads with the
//! collection fields defaulted to empty — the panel stays usable even
//! when the exchange is unreachable. Only validation failures change
//! the status code (400); nothing here returns a transport fault.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::control::ControlService;
use crate::types::{
    ArbitrageOpportunity, KestrelError, Market, Order, ScanReport, SettingsPatch,
    TradeOpportunity,
};

pub type AppState = Arc<ControlService>;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OrdersParams {
    #[serde(default = "default_orders_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct ScanParams {
    #[serde(default = "default_scan_limit")]
    pub limit: u32,
    #[serde(default)]
    pub auto_execute: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct DebugParams {
    #[serde(default = "default_debug_limit")]
    pub limit: u32,
}

fn default_orders_limit() -> u32 {
    25
}
fn default_scan_limit() -> u32 {
    50
}
fn default_search_limit() -> u32 {
    100
}
fn default_debug_limit() -> u32 {
    10
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct StatusErrorResponse {
    pub connected: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub arbitrage_opportunities: Vec<ArbitrageOpportunity>,
    pub trade_opportunities: Vec<TradeOpportunity>,
    pub executed_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<crate::types::DebugInfo>,
}

impl ScanResponse {
    fn ok(report: ScanReport) -> Self {
        ScanResponse {
            error: None,
            arbitrage_opportunities: report.arbitrage_opportunities,
            trade_opportunities: report.trade_opportunities,
            executed_count: report.executed_count,
            debug: Some(report.debug),
        }
    }

    fn err(message: String) -> Self {
        ScanResponse {
            error: Some(message),
            arbitrage_opportunities: Vec::new(),
            trade_opportunities: Vec::new(),
            executed_count: 0,
            debug: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub markets: Vec<Market>,
    pub count: usize,
    pub query: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/status — exchange connectivity, pass-through.
pub async fn get_status(State(state): State<AppState>) -> Response {
    match state.connection_status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            warn!(error = %e, "Connectivity probe failed");
            Json(StatusErrorResponse {
                connected: false,
                error: e.to_string(),
            })
            .into_response()
        }
    }
}

/// GET /api/wallet — balance summary, pass-through.
pub async fn get_wallet(State(state): State<AppState>) -> Response {
    match state.wallet().await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            warn!(error = %e, "Wallet fetch failed");
            Json(ErrorBody {
                error: e.to_string(),
            })
            .into_response()
        }
    }
}

/// GET /api/orders — recent orders; an unreachable exchange yields an
/// empty list rather than an error shape (panel compatibility).
pub async fn get_orders(
    State(state): State<AppState>,
    Query(params): Query<OrdersParams>,
) -> Json<Vec<Order>> {
    match state.recent_orders(params.limit).await {
        Ok(orders) => Json(orders),
        Err(e) => {
            warn!(error = %e, "Order fetch failed");
            Json(Vec::new())
        }
    }
}

/// GET /api/scan — run one scan pass, optionally auto-executing.
pub async fn get_scan(
    State(state): State<AppState>,
    Query(params): Query<ScanParams>,
) -> Json<ScanResponse> {
    match state.scan(params.limit, params.auto_execute).await {
        Ok(report) => Json(ScanResponse::ok(report)),
        Err(e) => {
            warn!(error = %e, "Scan failed");
            Json(ScanResponse::err(e.to_string()))
        }
    }
}

/// POST /api/settings — partial threshold update; a validation failure
/// rejects the whole update.
pub async fn post_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Response {
    match state.update_settings(patch).await {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /api/search — free-text match over a fresh market window.
pub async fn get_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    match state.search(&params.query, params.limit).await {
        Ok(markets) => {
            let count = markets.len();
            Json(SearchResponse {
                error: None,
                markets,
                count,
                query: params.query.trim().to_string(),
            })
            .into_response()
        }
        Err(e @ KestrelError::Validation(_)) => (
            StatusCode::BAD_REQUEST,
            Json(SearchResponse {
                error: Some(e.to_string()),
                markets: Vec::new(),
                count: 0,
                query: params.query,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Search failed");
            Json(SearchResponse {
                error: Some(e.to_string()),
                markets: Vec::new(),
                count: 0,
                query: params.query,
            })
            .into_response()
        }
    }
}

/// GET /api/debug/markets — raw/filtered samples plus active thresholds.
pub async fn get_debug_markets(
    State(state): State<AppState>,
    Query(params): Query<DebugParams>,
) -> Response {
    match state.debug_markets(params.limit).await {
        Ok(samples) => Json(samples).into_response(),
        Err(e) => {
            warn!(error = %e, "Debug market fetch failed");
            Json(ErrorBody {
                error: e.to_string(),
            })
            .into_response()
        }
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}
