//! Exchange integration.
//!
//! Defines the `ExchangeClient` trait — the complete method set this
//! service consumes from the exchange — and provides the Kalshi Trade
//! API v2 implementation. Any backend implementing the trait is
//! substitutable, which is how the test doubles plug in.

pub mod kalshi;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{
    ConnectionStatus, Market, Order, OrderConfirmation, OrderRequest, WalletSummary,
};

/// Abstraction over the remote exchange.
///
/// All methods are potentially blocking I/O; callers must not hold any
/// lock across them. Retry and auth semantics belong to the
/// implementation, never to callers.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Probe exchange connectivity and trading status.
    async fn check_connection(&self) -> Result<ConnectionStatus>;

    /// Fetch the account balance summary.
    async fn get_wallet_summary(&self) -> Result<WalletSummary>;

    /// Fetch the most recent orders, newest first.
    async fn get_recent_orders(&self, limit: u32) -> Result<Vec<Order>>;

    /// Fetch up to `limit` markets with the given status ("open").
    /// Every call is a fresh remote fetch — no caching at any layer.
    async fn get_markets(&self, limit: u32, status: &str) -> Result<Vec<Market>>;

    /// Submit a new order.
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation>;

    /// Exchange name for logging and identification.
    fn name(&self) -> &str;
}
