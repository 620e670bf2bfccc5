//! Shared types for the KESTREL control surface.
//!
//! These types form the data model used across all modules: the market
//! window fetched from the exchange, the mutable operating thresholds,
//! and the result shapes returned by the scan/search endpoints. All
//! response shaping goes through these tagged structs — nothing is
//! serialized reflectively.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// A single open market in the fetched window.
///
/// Prices and liquidity are integer cents, matching the exchange wire
/// format. Lives only for the duration of one request — nothing in this
/// layer caches or persists markets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub ticker: String,
    /// Longer display ticker, when the exchange provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_name: Option<String>,
    pub title: String,
    /// Best YES bid in cents (0 = no bid).
    pub yes_bid: i64,
    /// Best YES ask in cents (0 = no ask).
    pub yes_ask: i64,
    /// Best NO bid in cents.
    pub no_bid: i64,
    /// Best NO ask in cents.
    pub no_ask: i64,
    /// Available depth in cents, used as the admission threshold.
    pub liquidity: i64,
    #[serde(default)]
    pub volume_24h: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<DateTime<Utc>>,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (YES {}¢/{}¢ | NO {}¢/{}¢ | liq {}¢)",
            self.ticker, self.title, self.yes_bid, self.yes_ask, self.no_bid, self.no_ask,
            self.liquidity,
        )
    }
}

impl Market {
    /// The identifier used for free-text matching: the display ticker
    /// when present, otherwise the plain ticker.
    pub fn search_key(&self) -> &str {
        self.ticker_name.as_deref().unwrap_or(&self.ticker)
    }

    /// Whether this market clears the given liquidity threshold.
    pub fn meets_liquidity(&self, threshold: i64) -> bool {
        self.liquidity >= threshold
    }

    /// Time remaining until the market closes, if a close time is known.
    pub fn time_to_close(&self) -> Option<chrono::Duration> {
        self.close_time.map(|t| t - Utc::now())
    }

    /// Helper to build a test market with sensible defaults.
    #[cfg(test)]
    pub fn sample(ticker: &str, title: &str, liquidity: i64) -> Self {
        Market {
            ticker: ticker.to_string(),
            ticker_name: None,
            title: title.to_string(),
            yes_bid: 44,
            yes_ask: 46,
            no_bid: 53,
            no_ask: 55,
            liquidity,
            volume_24h: 2500,
            status: "open".to_string(),
            close_time: Some(Utc::now() + chrono::Duration::days(14)),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The two runtime-tunable thresholds shared by every control operation.
///
/// Process-wide and mutable, but only ever read or written as a whole
/// record — see `control::settings::SettingsStore`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Minimum market depth in cents to admit a market into a scan.
    pub min_liquidity: i64,
    /// Minimum estimated profit in dollars per day for a directional
    /// candidate to be reported.
    pub min_profit_per_day: Decimal,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min_liquidity={}¢ min_profit_per_day=${}",
            self.min_liquidity, self.min_profit_per_day,
        )
    }
}

/// Partial settings update: unset fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SettingsPatch {
    pub min_liquidity: Option<i64>,
    pub min_profit_per_day: Option<Decimal>,
}

impl SettingsPatch {
    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.min_liquidity.is_none() && self.min_profit_per_day.is_none()
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Contract side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Yes => write!(f, "YES"),
            Side::No => write!(f, "NO"),
        }
    }
}

/// Order action on the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Buy,
    Sell,
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "buy"),
            OrderAction::Sell => write!(f, "sell"),
        }
    }
}

// ---------------------------------------------------------------------------
// Exchange pass-through shapes
// ---------------------------------------------------------------------------

/// Result of the exchange connectivity probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub details: ExchangeStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExchangeStatus {
    pub exchange_active: bool,
    pub trading_active: bool,
}

/// Account balance summary, all amounts in cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalletSummary {
    /// Cash available for new orders.
    pub available_cash: i64,
    /// Cash committed to resting orders.
    pub reserved_cash: i64,
    pub total_equity: i64,
}

impl fmt::Display for WalletSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "available=${:.2} reserved=${:.2} equity=${:.2}",
            self.available_cash as f64 / 100.0,
            self.reserved_cash as f64 / 100.0,
            self.total_equity as f64 / 100.0,
        )
    }
}

/// A historical or resting order, as listed by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub ticker: String,
    pub side: Side,
    /// Exchange lifecycle state: "resting", "executed", "canceled", ...
    pub state: String,
    /// Limit price in cents on the order's side.
    pub price: i64,
    pub count: u32,
    pub remaining_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}x @ {}¢ ({})",
            self.ticker, self.side, self.count, self.price, self.state,
        )
    }
}

/// A new order to submit to the exchange.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub ticker: String,
    pub side: Side,
    pub action: OrderAction,
    pub count: u32,
    /// Limit price in cents on `side`.
    pub price: i64,
    /// Idempotency key, one per submission attempt.
    pub client_order_id: String,
}

impl OrderRequest {
    /// A limit buy of `count` contracts at `price` cents.
    pub fn limit_buy(ticker: &str, side: Side, count: u32, price: i64) -> Self {
        OrderRequest {
            ticker: ticker.to_string(),
            side,
            action: OrderAction::Buy,
            count,
            price,
            client_order_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Exchange acknowledgement of a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub ticker: String,
    pub side: Side,
    pub price: i64,
    pub count: u32,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Opportunities
// ---------------------------------------------------------------------------

/// A same-exchange arbitrage: buying both sides locks in a payout below
/// the guaranteed $1 settlement. All amounts in cents per contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub ticker: String,
    pub title: String,
    pub yes_ask: i64,
    pub no_ask: i64,
    /// yes_ask + no_ask + fees.
    pub combined_cost: i64,
    pub fees: i64,
    pub profit_per_contract: i64,
}

impl fmt::Display for ArbitrageOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: YES {}¢ + NO {}¢ + fees {}¢ = {}¢ → +{}¢/contract",
            self.ticker, self.yes_ask, self.no_ask, self.fees, self.combined_cost,
            self.profit_per_contract,
        )
    }
}

/// A directional spread-capture candidate: a resting order inside a wide
/// bid-ask spread, scaled down to an estimated profit per day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOpportunity {
    pub ticker: String,
    pub title: String,
    pub side: Side,
    pub bid: i64,
    pub ask: i64,
    pub spread: i64,
    pub days_to_close: f64,
    /// Estimated dollars per contract per day.
    pub profit_per_day: Decimal,
}

impl fmt::Display for TradeOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} spread {}¢ ({:.1}d) → ${}/day",
            self.ticker, self.side, self.spread, self.days_to_close, self.profit_per_day,
        )
    }
}

// ---------------------------------------------------------------------------
// Scan results
// ---------------------------------------------------------------------------

/// What the scan engine returns for one pass over a market window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    pub arbitrage: Vec<ArbitrageOpportunity>,
    pub trades: Vec<TradeOpportunity>,
    /// Orders successfully placed when auto-execution was requested.
    pub executed_count: u64,
}

/// Per-request snapshot of filter effectiveness and active thresholds.
///
/// The thresholds are the ones read at the start of the scan — a
/// concurrent settings update mid-scan never leaks into this record.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub total_markets_fetched: usize,
    pub markets_after_liquidity_filter: usize,
    pub min_liquidity: i64,
    pub min_profit_per_day: Decimal,
    /// JSON field names of the first fetched market, if any.
    pub sample_market_fields: Vec<String>,
}

/// The combined response of one scan request.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub arbitrage_opportunities: Vec<ArbitrageOpportunity>,
    pub trade_opportunities: Vec<TradeOpportunity>,
    pub executed_count: u64,
    pub debug: DebugInfo,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for KESTREL.
///
/// `Validation` and `RemoteUnavailable` are the only conditions that
/// cross the request boundary; both are converted into structured JSON
/// payloads there, never transport faults.
#[derive(Debug, thiserror::Error)]
pub enum KestrelError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Exchange unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
