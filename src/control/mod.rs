//! Control layer — the sequencing logic behind every API endpoint.
//!
//! Owns the settings store and the collaborator handles (exchange, scan
//! engine), and composes them: fetch → filter → scan → telemetry for a
//! scan request, fetch → match for a search. Nothing here retains state
//! between requests except the settings record.

pub mod filter;
pub mod search;
pub mod settings;

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::engine::OpportunityScanner;
use crate::exchange::ExchangeClient;
use crate::types::{
    ConnectionStatus, DebugInfo, KestrelError, Market, Order, ScanReport, Settings, SettingsPatch,
    WalletSummary,
};
use filter::filter_by_liquidity;
use settings::SettingsStore;

/// Largest market window one request may pull from the exchange.
pub const MAX_WINDOW_LIMIT: u32 = 500;

/// Raw and filtered market samples plus the active thresholds, served by
/// the debug endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSamples {
    pub total_fetched: usize,
    pub after_liquidity_filter: usize,
    pub settings: Settings,
    pub raw: Vec<Market>,
    pub filtered: Vec<Market>,
}

/// The control-and-monitoring service shared by all route handlers.
pub struct ControlService {
    exchange: Arc<dyn ExchangeClient>,
    scanner: Arc<dyn OpportunityScanner>,
    settings: SettingsStore,
}

impl ControlService {
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        scanner: Arc<dyn OpportunityScanner>,
        initial_settings: Settings,
    ) -> Self {
        Self {
            exchange,
            scanner,
            settings: SettingsStore::new(initial_settings),
        }
    }

    // -- Pass-through reads ----------------------------------------------

    pub async fn connection_status(&self) -> Result<ConnectionStatus, KestrelError> {
        self.exchange
            .check_connection()
            .await
            .map_err(remote_unavailable)
    }

    pub async fn wallet(&self) -> Result<WalletSummary, KestrelError> {
        self.exchange
            .get_wallet_summary()
            .await
            .map_err(remote_unavailable)
    }

    pub async fn recent_orders(&self, limit: u32) -> Result<Vec<Order>, KestrelError> {
        self.exchange
            .get_recent_orders(limit)
            .await
            .map_err(remote_unavailable)
    }

    // -- Settings --------------------------------------------------------

    pub async fn settings(&self) -> Settings {
        self.settings.get().await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, KestrelError> {
        self.settings.update(patch).await
    }

    // -- Market window ---------------------------------------------------

    /// Fetch up to `limit` open markets. Always a fresh remote fetch;
    /// the limit is clamped into 1..=MAX_WINDOW_LIMIT.
    pub async fn fetch_window(&self, limit: u32) -> Result<Vec<Market>, KestrelError> {
        let limit = limit.clamp(1, MAX_WINDOW_LIMIT);
        let markets = self
            .exchange
            .get_markets(limit, "open")
            .await
            .map_err(remote_unavailable)?;
        debug!(limit, fetched = markets.len(), "Market window fetched");
        Ok(markets)
    }

    // -- Scan ------------------------------------------------------------

    /// One scan pass: settings snapshot → single fetch → liquidity filter
    /// → engine → report. The debug telemetry and the engine share the
    /// same fetch, and the thresholds in the report are the snapshot
    /// taken before the fetch — never re-read.
    pub async fn scan(&self, limit: u32, auto_execute: bool) -> Result<ScanReport, KestrelError> {
        let snapshot = self.settings.get().await;

        let markets = self.fetch_window(limit).await?;
        let total_fetched = markets.len();
        let sample_market_fields = sample_market_fields(markets.first());

        let filtered = filter_by_liquidity(markets, snapshot.min_liquidity);
        let after_filter = filtered.len();

        let outcome = self
            .scanner
            .scan(&filtered, snapshot, auto_execute)
            .await
            .map_err(remote_unavailable)?;

        info!(
            fetched = total_fetched,
            after_filter,
            arbitrage = outcome.arbitrage.len(),
            trades = outcome.trades.len(),
            executed = outcome.executed_count,
            auto_execute,
            "Scan complete"
        );

        Ok(ScanReport {
            arbitrage_opportunities: outcome.arbitrage,
            trade_opportunities: outcome.trades,
            executed_count: outcome.executed_count,
            debug: DebugInfo {
                total_markets_fetched: total_fetched,
                markets_after_liquidity_filter: after_filter,
                min_liquidity: snapshot.min_liquidity,
                min_profit_per_day: snapshot.min_profit_per_day,
                sample_market_fields,
            },
        })
    }

    // -- Search ----------------------------------------------------------

    /// Free-text search over a freshly fetched window. An empty or
    /// all-whitespace query is a validation error — nothing is fetched.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Market>, KestrelError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(KestrelError::Validation(
                "query must not be empty".to_string(),
            ));
        }

        let window = self.fetch_window(limit).await?;
        let matches = search::match_markets(trimmed, &window);
        debug!(query = trimmed, window = window.len(), matches = matches.len(), "Search complete");
        Ok(matches)
    }

    // -- Debug -----------------------------------------------------------

    /// Raw and filtered samples of a small window, with the thresholds
    /// that produced the filtering.
    pub async fn debug_markets(&self, limit: u32) -> Result<MarketSamples, KestrelError> {
        let snapshot = self.settings.get().await;
        let raw = self.fetch_window(limit).await?;
        let filtered = filter_by_liquidity(raw.clone(), snapshot.min_liquidity);

        Ok(MarketSamples {
            total_fetched: raw.len(),
            after_liquidity_filter: filtered.len(),
            settings: snapshot,
            raw,
            filtered,
        })
    }
}

/// JSON field names of the first fetched market, for the debug record.
fn sample_market_fields(market: Option<&Market>) -> Vec<String> {
    market
        .and_then(|m| serde_json::to_value(m).ok())
        .and_then(|v| match v {
            serde_json::Value::Object(map) => Some(map.keys().cloned().collect()),
            _ => None,
        })
        .unwrap_or_default()
}

fn remote_unavailable(e: anyhow::Error) -> KestrelError {
    KestrelError::RemoteUnavailable(e.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
