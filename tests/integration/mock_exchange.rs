//! Mock exchange for integration testing.
//!
//! Provides a deterministic `ExchangeClient` implementation that serves
//! known markets, accepts orders, and tracks what was placed — all
//! in-memory with no external dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Mutex;

use kestrel::exchange::ExchangeClient;
use kestrel::types::*;

/// A deterministic in-memory exchange.
///
/// Markets, wallet, and order history are fully controllable from test
/// code; `set_error` makes every subsequent call fail.
pub struct MockExchange {
    markets: Vec<Market>,
    wallet: WalletSummary,
    orders: Vec<Order>,
    placed: Mutex<Vec<OrderRequest>>,
    force_error: Mutex<Option<String>>,
}

impl MockExchange {
    /// A mock with a small default market window.
    pub fn new() -> Self {
        Self::with_markets(Self::default_markets())
    }

    /// A mock serving exactly the given market window.
    pub fn with_markets(markets: Vec<Market>) -> Self {
        Self {
            markets,
            wallet: WalletSummary {
                available_cash: 250_00,
                reserved_cash: 40_00,
                total_equity: 290_00,
            },
            orders: vec![Self::order("ord-1", "PRES24", Side::Yes, 45)],
            placed: Mutex::new(Vec::new()),
            force_error: Mutex::new(None),
        }
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear any forced error.
    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// All orders placed through this mock so far.
    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().unwrap().clone()
    }

    /// Build a market with the given depth and tight fair pricing.
    pub fn market(ticker: &str, title: &str, liquidity: i64) -> Market {
        Market {
            ticker: ticker.to_string(),
            ticker_name: None,
            title: title.to_string(),
            yes_bid: 44,
            yes_ask: 46,
            no_bid: 53,
            no_ask: 55,
            liquidity,
            volume_24h: 1800,
            status: "open".to_string(),
            close_time: Some(Utc::now() + Duration::days(21)),
        }
    }

    /// Build a market priced so both sides together cost less than
    /// settlement — an arbitrage the scanner must find.
    pub fn arbitrage_market(ticker: &str, liquidity: i64) -> Market {
        let mut m = Self::market(ticker, "Mispriced market", liquidity);
        m.yes_bid = 38;
        m.yes_ask = 40;
        m.no_bid = 48;
        m.no_ask = 50;
        m
    }

    fn order(id: &str, ticker: &str, side: Side, price: i64) -> Order {
        Order {
            id: id.to_string(),
            ticker: ticker.to_string(),
            side,
            state: "resting".to_string(),
            price,
            count: 2,
            remaining_count: 2,
            created_time: Some(Utc::now() - Duration::minutes(30)),
        }
    }

    fn default_markets() -> Vec<Market> {
        vec![
            Self::market("PRES24", "2024 Presidential Election", 125_000),
            Self::market("WNYC", "Weather NYC", 500),
            Self::market("CPI-MAR", "CPI above 3% in March?", 30_000),
        ]
    }

    fn check_forced_error(&self) -> Result<()> {
        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }
        Ok(())
    }
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn check_connection(&self) -> Result<ConnectionStatus> {
        self.check_forced_error()?;
        Ok(ConnectionStatus {
            connected: true,
            details: ExchangeStatus {
                exchange_active: true,
                trading_active: true,
            },
        })
    }

    async fn get_wallet_summary(&self) -> Result<WalletSummary> {
        self.check_forced_error()?;
        Ok(self.wallet)
    }

    async fn get_recent_orders(&self, limit: u32) -> Result<Vec<Order>> {
        self.check_forced_error()?;
        Ok(self.orders.iter().take(limit as usize).cloned().collect())
    }

    async fn get_markets(&self, limit: u32, _status: &str) -> Result<Vec<Market>> {
        self.check_forced_error()?;
        Ok(self.markets.iter().take(limit as usize).cloned().collect())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        self.check_forced_error()?;
        self.placed.lock().unwrap().push(request.clone());
        Ok(OrderConfirmation {
            order_id: format!("mock-{}", request.client_order_id),
            ticker: request.ticker.clone(),
            side: request.side,
            price: request.price,
            count: request.count,
            status: "resting".to_string(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_markets() {
        let exchange = MockExchange::new();
        let markets = exchange.get_markets(50, "open").await.unwrap();
        assert_eq!(markets.len(), 3);
        assert!(markets.iter().any(|m| m.ticker == "PRES24"));
    }

    #[tokio::test]
    async fn test_mock_truncates_to_limit() {
        let exchange = MockExchange::new();
        let markets = exchange.get_markets(2, "open").await.unwrap();
        assert_eq!(markets.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_records_placed_orders() {
        let exchange = MockExchange::new();
        let request = OrderRequest::limit_buy("PRES24", Side::Yes, 1, 45);
        let confirmation = exchange.place_order(&request).await.unwrap();
        assert!(confirmation.order_id.starts_with("mock-"));
        assert_eq!(exchange.placed_orders().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_forced_error() {
        let exchange = MockExchange::new();
        exchange.set_error("simulated outage");

        assert!(exchange.check_connection().await.is_err());
        assert!(exchange.get_markets(10, "open").await.is_err());
        assert!(exchange.get_wallet_summary().await.is_err());

        exchange.clear_error();
        assert!(exchange.check_connection().await.is_ok());
    }

    #[tokio::test]
    async fn test_arbitrage_market_is_mispriced() {
        let m = MockExchange::arbitrage_market("ARB-1", 50_000);
        assert!(m.yes_ask + m.no_ask < 100);
    }
}
