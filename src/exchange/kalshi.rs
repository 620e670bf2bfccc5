//! Kalshi Trade API v2 integration.
//!
//! Read endpoints used by the control surface plus order submission for
//! auto-execution. All amounts on the wire are integer cents.
//!
//! Base URL: https://api.elections.kalshi.com/trade-api/v2
//! Auth: `Authorization` header carrying an API key for portfolio
//! endpoints; market data is public.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use super::ExchangeClient;
use crate::config::ExchangeConfig;
use crate::types::{
    ConnectionStatus, ExchangeStatus, Market, Order, OrderConfirmation, OrderRequest, Side,
    WalletSummary,
};

const EXCHANGE_NAME: &str = "kalshi";

/// Orders fetched when deriving the reserved-cash figure.
const RESTING_ORDER_WINDOW: u32 = 200;

// ---------------------------------------------------------------------------
// API response types (Kalshi JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    exchange_active: bool,
    #[serde(default)]
    trading_active: bool,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    /// Available cash in cents.
    balance: i64,
}

#[derive(Debug, Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: Vec<KalshiOrder>,
}

/// Order as listed by `/portfolio/orders`. Only the fields this layer
/// consumes are deserialized.
#[derive(Debug, Deserialize)]
struct KalshiOrder {
    order_id: String,
    ticker: String,
    side: Side,
    #[serde(default)]
    status: String,
    #[serde(default)]
    yes_price: i64,
    #[serde(default)]
    no_price: i64,
    #[serde(default)]
    initial_count: u32,
    #[serde(default)]
    remaining_count: u32,
    #[serde(default)]
    created_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct MarketsResponse {
    #[serde(default)]
    markets: Vec<KalshiMarket>,
}

/// Market as returned by `/markets`.
#[derive(Debug, Deserialize)]
struct KalshiMarket {
    ticker: String,
    #[serde(default)]
    ticker_name: Option<String>,
    title: String,
    #[serde(default)]
    yes_bid: i64,
    #[serde(default)]
    yes_ask: i64,
    #[serde(default)]
    no_bid: i64,
    #[serde(default)]
    no_ask: i64,
    #[serde(default)]
    liquidity: i64,
    #[serde(default)]
    volume_24h: i64,
    #[serde(default)]
    status: String,
    #[serde(default)]
    close_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    order: KalshiOrder,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Kalshi exchange client.
pub struct KalshiClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl KalshiClient {
    /// Create a new client from config. The API key is resolved from the
    /// env var named in the config; portfolio endpoints fail without it.
    pub fn new(cfg: &ExchangeConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).unwrap_or_default();
        Self::with_key(cfg, api_key)
    }

    /// Create a client with an explicit API key (used by tests).
    pub fn with_key(cfg: &ExchangeConfig, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .user_agent("KESTREL/0.1.0 (trading-agent-console)")
            .build()
            .context("Failed to build HTTP client for Kalshi")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key),
        })
    }

    // -- Internal helpers ------------------------------------------------

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "Kalshi GET");

        let resp = self
            .http
            .get(&url)
            .header("Authorization", self.api_key.expose_secret().as_str())
            .send()
            .await
            .context("Kalshi API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Kalshi API error {status}: {body}");
        }

        resp.json::<T>()
            .await
            .context("Failed to parse Kalshi response")
    }

    /// Fetch orders, optionally restricted to a lifecycle status.
    async fn fetch_orders(&self, limit: u32, status: Option<&str>) -> Result<Vec<KalshiOrder>> {
        let mut path = format!("/portfolio/orders?limit={limit}");
        if let Some(s) = status {
            path.push_str("&status=");
            path.push_str(s);
        }
        let resp: OrdersResponse = self.get_json(&path).await?;
        Ok(resp.orders)
    }

    /// Convert a wire order to the domain shape. The listed price is the
    /// one on the order's own side.
    fn to_order(o: KalshiOrder) -> Order {
        let price = match o.side {
            Side::Yes => o.yes_price,
            Side::No => o.no_price,
        };
        Order {
            id: o.order_id,
            ticker: o.ticker,
            side: o.side,
            state: o.status,
            price,
            count: o.initial_count,
            remaining_count: o.remaining_count,
            created_time: o.created_time,
        }
    }

    fn to_market(m: KalshiMarket) -> Market {
        Market {
            ticker: m.ticker,
            ticker_name: m.ticker_name,
            title: m.title,
            yes_bid: m.yes_bid,
            yes_ask: m.yes_ask,
            no_bid: m.no_bid,
            no_ask: m.no_ask,
            liquidity: m.liquidity,
            volume_24h: m.volume_24h,
            status: m.status,
            close_time: m.close_time,
        }
    }

    /// Cents committed to an unfilled order: remaining contracts at the
    /// order's limit price.
    fn reserved_cents(o: &KalshiOrder) -> i64 {
        let price = match o.side {
            Side::Yes => o.yes_price,
            Side::No => o.no_price,
        };
        o.remaining_count as i64 * price
    }
}

// ---------------------------------------------------------------------------
// ExchangeClient trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl ExchangeClient for KalshiClient {
    async fn check_connection(&self) -> Result<ConnectionStatus> {
        let status: StatusResponse = self.get_json("/exchange/status").await?;
        Ok(ConnectionStatus {
            connected: status.exchange_active,
            details: ExchangeStatus {
                exchange_active: status.exchange_active,
                trading_active: status.trading_active,
            },
        })
    }

    /// Wallet summary: available cash from the balance endpoint, reserved
    /// cash derived from resting orders.
    async fn get_wallet_summary(&self) -> Result<WalletSummary> {
        let balance: BalanceResponse = self.get_json("/portfolio/balance").await?;
        let resting = self
            .fetch_orders(RESTING_ORDER_WINDOW, Some("resting"))
            .await?;
        let reserved: i64 = resting.iter().map(Self::reserved_cents).sum();

        Ok(WalletSummary {
            available_cash: balance.balance,
            reserved_cash: reserved,
            total_equity: balance.balance + reserved,
        })
    }

    async fn get_recent_orders(&self, limit: u32) -> Result<Vec<Order>> {
        let orders = self.fetch_orders(limit, None).await?;
        Ok(orders.into_iter().map(Self::to_order).collect())
    }

    async fn get_markets(&self, limit: u32, status: &str) -> Result<Vec<Market>> {
        let path = format!("/markets?limit={limit}&status={status}");
        let resp: MarketsResponse = self.get_json(&path).await?;
        debug!(count = resp.markets.len(), "Kalshi market window fetched");
        Ok(resp.markets.into_iter().map(Self::to_market).collect())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        let url = format!("{}/portfolio/orders", self.base_url);

        // Kalshi expects the limit price under the side-specific key.
        let mut body = serde_json::json!({
            "ticker": request.ticker,
            "client_order_id": request.client_order_id,
            "side": request.side,
            "action": request.action,
            "count": request.count,
            "type": "limit",
        });
        let price_key = match request.side {
            Side::Yes => "yes_price",
            Side::No => "no_price",
        };
        body[price_key] = serde_json::json!(request.price);

        let resp = self
            .http
            .post(&url)
            .header("Authorization", self.api_key.expose_secret().as_str())
            .json(&body)
            .send()
            .await
            .context("Kalshi order request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Kalshi order rejected {status}: {body}");
        }

        let created: CreateOrderResponse = resp
            .json()
            .await
            .context("Failed to parse Kalshi order response")?;

        info!(
            order_id = %created.order.order_id,
            ticker = %request.ticker,
            side = %request.side,
            count = request.count,
            price = request.price,
            "Kalshi order placed"
        );

        let order = Self::to_order(created.order);
        Ok(OrderConfirmation {
            order_id: order.id,
            ticker: order.ticker,
            side: order.side,
            price: order.price,
            count: order.count,
            status: order.state,
        })
    }

    fn name(&self) -> &str {
        EXCHANGE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
