//! Scan engine — opportunity detection and optional auto-execution.
//!
//! The control layer consumes the engine through the `OpportunityScanner`
//! trait and hands it an already-fetched, already-filtered market window,
//! so the engine and the debug telemetry always see the same markets.

pub mod scanner;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Market, ScanOutcome, Settings};

/// Abstraction over the opportunity-scanning pass.
#[async_trait]
pub trait OpportunityScanner: Send + Sync {
    /// Scan a market window for arbitrage and directional candidates.
    ///
    /// `settings` is the caller's snapshot for this request — the engine
    /// must not re-read shared state. With `auto_execute` set, detected
    /// arbitrage is executed and the placed-order count reported.
    async fn scan(
        &self,
        markets: &[Market],
        settings: Settings,
        auto_execute: bool,
    ) -> Result<ScanOutcome>;
}
