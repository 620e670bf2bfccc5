//! Same-exchange arbitrage and spread-capture scanner.
//!
//! Detection is pure arithmetic over the fetched window; execution (when
//! requested) goes through the `ExchangeClient` handle. Binary contracts
//! settle at $1, so buying YES and NO together for less than 100¢ plus
//! fees locks in the difference.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::OpportunityScanner;
use crate::exchange::ExchangeClient;
use crate::types::{
    ArbitrageOpportunity, Market, OrderRequest, ScanOutcome, Settings, Side, TradeOpportunity,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Guaranteed settlement value of a binary contract, in cents.
const SETTLEMENT_CENTS: i64 = 100;

/// Minimum bid-ask spread (cents) before a market is worth quoting inside.
const MIN_CAPTURE_SPREAD_CENTS: i64 = 2;

/// Minimum time to close considered for per-day profit scaling (1 hour) —
/// markets closing sooner can't realistically be worked with resting orders.
const MIN_DAYS_TO_CLOSE: f64 = 1.0 / 24.0;

// ---------------------------------------------------------------------------
// Pricing arithmetic
// ---------------------------------------------------------------------------

/// Kalshi taker fee for one contract at price `p` cents:
/// ceil(0.07 · p · (100 − p) / 100), in cents.
pub fn taker_fee_cents(price: i64) -> i64 {
    if price <= 0 || price >= 100 {
        return 0;
    }
    (7 * price * (100 - price) + 9_999) / 10_000
}

/// Detect a both-sides arbitrage on a single market. Requires live asks
/// on both sides and a total cost, fees included, below settlement.
fn detect_arbitrage(market: &Market) -> Option<ArbitrageOpportunity> {
    if market.yes_ask <= 0 || market.no_ask <= 0 {
        return None;
    }

    let fees = taker_fee_cents(market.yes_ask) + taker_fee_cents(market.no_ask);
    let combined_cost = market.yes_ask + market.no_ask + fees;
    if combined_cost >= SETTLEMENT_CENTS {
        return None;
    }

    Some(ArbitrageOpportunity {
        ticker: market.ticker.clone(),
        title: market.title.clone(),
        yes_ask: market.yes_ask,
        no_ask: market.no_ask,
        combined_cost,
        fees,
        profit_per_contract: SETTLEMENT_CENTS - combined_cost,
    })
}

/// Detect a spread-capture candidate: the wider of the two bid-ask
/// spreads, scaled to an estimated half-spread profit per day over the
/// market's remaining life. Markets without a close time are skipped —
/// there is no horizon to scale against.
fn detect_trade(market: &Market, min_profit_per_day: Decimal) -> Option<TradeOpportunity> {
    let yes_spread = live_spread(market.yes_bid, market.yes_ask).unwrap_or(0);
    let no_spread = live_spread(market.no_bid, market.no_ask).unwrap_or(0);

    let (side, bid, ask, spread) = if yes_spread >= no_spread {
        (Side::Yes, market.yes_bid, market.yes_ask, yes_spread)
    } else {
        (Side::No, market.no_bid, market.no_ask, no_spread)
    };

    if spread < MIN_CAPTURE_SPREAD_CENTS {
        return None;
    }

    let remaining = market.time_to_close()?;
    if remaining.num_minutes() <= 0 {
        return None;
    }
    let days = (remaining.num_minutes() as f64 / (60.0 * 24.0)).max(MIN_DAYS_TO_CLOSE);

    // Half the spread, in dollars, spread over the market's remaining days.
    let capture_dollars = Decimal::from(spread) / dec!(2) / dec!(100);
    let days_dec = Decimal::from_f64(days)?;
    let profit_per_day = (capture_dollars / days_dec).round_dp(4);

    if profit_per_day < min_profit_per_day {
        return None;
    }

    Some(TradeOpportunity {
        ticker: market.ticker.clone(),
        title: market.title.clone(),
        side,
        bid,
        ask,
        spread,
        days_to_close: days,
        profit_per_day,
    })
}

/// Bid-ask spread when both quotes are live.
fn live_spread(bid: i64, ask: i64) -> Option<i64> {
    if bid > 0 && ask > 0 && ask > bid {
        Some(ask - bid)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// The production scan engine: arbitrage + spread capture, with paired
/// limit-order execution when auto-execution is requested.
pub struct ArbScanner {
    exchange: Arc<dyn ExchangeClient>,
    /// Contracts per leg for auto-executed orders.
    contracts_per_order: u32,
}

impl ArbScanner {
    pub fn new(exchange: Arc<dyn ExchangeClient>, contracts_per_order: u32) -> Self {
        Self {
            exchange,
            contracts_per_order: contracts_per_order.max(1),
        }
    }

    /// Place paired YES/NO limit buys for each arbitrage. Returns the
    /// number of orders accepted by the exchange. A rejected leg is
    /// logged and skipped — one bad market never aborts the pass.
    async fn execute_arbitrage(&self, opportunities: &[ArbitrageOpportunity]) -> u64 {
        let mut placed = 0u64;

        for opp in opportunities {
            for (side, price) in [(Side::Yes, opp.yes_ask), (Side::No, opp.no_ask)] {
                let request =
                    OrderRequest::limit_buy(&opp.ticker, side, self.contracts_per_order, price);
                match self.exchange.place_order(&request).await {
                    Ok(confirmation) => {
                        placed += 1;
                        info!(
                            order_id = %confirmation.order_id,
                            ticker = %opp.ticker,
                            side = %side,
                            price,
                            "Arbitrage leg placed"
                        );
                    }
                    Err(e) => {
                        warn!(
                            ticker = %opp.ticker,
                            side = %side,
                            error = %e,
                            "Order placement failed, skipping leg"
                        );
                    }
                }
            }
        }

        placed
    }
}

#[async_trait]
impl OpportunityScanner for ArbScanner {
    async fn scan(
        &self,
        markets: &[Market],
        settings: Settings,
        auto_execute: bool,
    ) -> Result<ScanOutcome> {
        let arbitrage: Vec<_> = markets.iter().filter_map(detect_arbitrage).collect();
        let trades: Vec<_> = markets
            .iter()
            .filter_map(|m| detect_trade(m, settings.min_profit_per_day))
            .collect();

        debug!(
            scanned = markets.len(),
            arbitrage = arbitrage.len(),
            trades = trades.len(),
            "Scan pass complete"
        );

        let executed_count = if auto_execute && !arbitrage.is_empty() {
            let placed = self.execute_arbitrage(&arbitrage).await;
            info!(
                opportunities = arbitrage.len(),
                orders_placed = placed,
                exchange = self.exchange.name(),
                "Auto-execution pass complete"
            );
            placed
        } else {
            0
        };

        Ok(ScanOutcome {
            arbitrage,
            trades,
            executed_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
