//! End-to-end control-flow scenarios against the mock exchange:
//! scan telemetry, search semantics, settings races, and auto-execution.

use rust_decimal_macros::dec;
use std::sync::Arc;

use kestrel::control::{filter::filter_by_liquidity, ControlService};
use kestrel::engine::scanner::ArbScanner;
use kestrel::types::{KestrelError, Settings, SettingsPatch, Side};

use crate::mock_exchange::MockExchange;

fn default_settings() -> Settings {
    Settings {
        min_liquidity: 10_000,
        min_profit_per_day: dec!(0.10),
    }
}

fn service_over(exchange: Arc<MockExchange>) -> ControlService {
    let scanner = Arc::new(ArbScanner::new(exchange.clone(), 1));
    ControlService::new(exchange, scanner, default_settings())
}

/// 50 fetched, 30 above the 10000¢ threshold → debug reports 50/30.
#[tokio::test]
async fn test_scan_reports_fetch_and_filter_counts() {
    let mut window = Vec::new();
    for i in 0..30 {
        window.push(MockExchange::market(
            &format!("DEEP-{i}"),
            &format!("Deep market {i}"),
            15_000,
        ));
    }
    for i in 0..20 {
        window.push(MockExchange::market(
            &format!("THIN-{i}"),
            &format!("Thin market {i}"),
            5_000,
        ));
    }

    let service = service_over(Arc::new(MockExchange::with_markets(window)));
    let report = service.scan(50, false).await.unwrap();

    assert_eq!(report.debug.total_markets_fetched, 50);
    assert_eq!(report.debug.markets_after_liquidity_filter, 30);
    assert_eq!(report.debug.min_liquidity, 10_000);
    assert_eq!(report.debug.min_profit_per_day, dec!(0.10));
    assert_eq!(report.executed_count, 0);
}

/// The debug thresholds reflect the snapshot taken at scan start, and a
/// subsequent update shows up only in the next scan.
#[tokio::test]
async fn test_scan_threshold_snapshot_per_request() {
    let service = service_over(Arc::new(MockExchange::new()));

    let before = service.scan(50, false).await.unwrap();
    assert_eq!(before.debug.min_liquidity, 10_000);

    service
        .update_settings(SettingsPatch {
            min_liquidity: Some(100),
            min_profit_per_day: None,
        })
        .await
        .unwrap();

    let after = service.scan(50, false).await.unwrap();
    assert_eq!(after.debug.min_liquidity, 100);
    // The looser threshold admits the shallow market too.
    assert!(
        after.debug.markets_after_liquidity_filter
            > before.debug.markets_after_liquidity_filter
    );
}

/// "PRES" matches only the presidential market.
#[tokio::test]
async fn test_search_matches_title_and_ticker() {
    let window = vec![
        MockExchange::market("PRES24", "2024 Presidential Election", 20_000),
        MockExchange::market("WNYC", "Weather NYC", 20_000),
    ];
    let service = service_over(Arc::new(MockExchange::with_markets(window)));

    let hits = service.search("PRES", 100).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].ticker, "PRES24");

    // Title substrings match too, case-insensitively.
    let hits = service.search("weather", 100).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].ticker, "WNYC");
}

#[tokio::test]
async fn test_search_blank_query_is_validation_error() {
    let service = service_over(Arc::new(MockExchange::new()));
    for query in ["", "   "] {
        let err = service.search(query, 100).await.unwrap_err();
        assert!(matches!(err, KestrelError::Validation(_)));
    }
}

/// Exchange failure surfaces as RemoteUnavailable for both scan and
/// search — never a panic or partial result.
#[tokio::test]
async fn test_remote_failure_is_structured() {
    let exchange = Arc::new(MockExchange::new());
    let service = service_over(exchange.clone());
    exchange.set_error("exchange maintenance window");

    let err = service.scan(50, false).await.unwrap_err();
    assert!(matches!(err, KestrelError::RemoteUnavailable(_)));

    let err = service.search("pres", 100).await.unwrap_err();
    assert!(matches!(err, KestrelError::RemoteUnavailable(_)));

    exchange.clear_error();
    assert!(service.scan(50, false).await.is_ok());
}

/// Partial update changes one field; an empty update changes nothing.
#[tokio::test]
async fn test_settings_partial_and_empty_updates() {
    let service = service_over(Arc::new(MockExchange::new()));

    let updated = service
        .update_settings(SettingsPatch {
            min_liquidity: Some(5_000),
            min_profit_per_day: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.min_liquidity, 5_000);
    assert_eq!(updated.min_profit_per_day, dec!(0.10));

    let unchanged = service.update_settings(SettingsPatch::default()).await.unwrap();
    assert_eq!(unchanged, updated);
    let unchanged = service.update_settings(SettingsPatch::default()).await.unwrap();
    assert_eq!(unchanged, updated);
}

/// Two racing whole-record updates must leave one of the two written
/// states — never a mix.
#[tokio::test]
async fn test_settings_update_race_is_atomic() {
    let service = Arc::new(service_over(Arc::new(MockExchange::new())));

    let a = service.clone();
    let b = service.clone();
    let ta = tokio::spawn(async move {
        a.update_settings(SettingsPatch {
            min_liquidity: Some(1),
            min_profit_per_day: Some(dec!(0.01)),
        })
        .await
        .unwrap();
    });
    let tb = tokio::spawn(async move {
        b.update_settings(SettingsPatch {
            min_liquidity: Some(2),
            min_profit_per_day: Some(dec!(0.02)),
        })
        .await
        .unwrap();
    });
    ta.await.unwrap();
    tb.await.unwrap();

    let settings = service.settings().await;
    let is_first = settings.min_liquidity == 1 && settings.min_profit_per_day == dec!(0.01);
    let is_second = settings.min_liquidity == 2 && settings.min_profit_per_day == dec!(0.02);
    assert!(is_first || is_second, "torn settings record: {settings}");
}

/// Auto-execution places paired legs for the detected arbitrage and
/// reports the order count.
#[tokio::test]
async fn test_scan_auto_execute_places_orders() {
    let window = vec![
        MockExchange::arbitrage_market("ARB-1", 50_000),
        MockExchange::market("FAIR-1", "Fairly priced market", 50_000),
    ];
    let exchange = Arc::new(MockExchange::with_markets(window));
    let service = service_over(exchange.clone());

    let report = service.scan(50, true).await.unwrap();

    assert_eq!(report.arbitrage_opportunities.len(), 1);
    assert_eq!(report.executed_count, 2);

    let placed = exchange.placed_orders();
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].ticker, "ARB-1");
    assert_eq!(placed[0].side, Side::Yes);
    assert_eq!(placed[1].side, Side::No);
}

/// Without the flag, the same window places nothing.
#[tokio::test]
async fn test_scan_without_flag_never_executes() {
    let exchange = Arc::new(MockExchange::with_markets(vec![
        MockExchange::arbitrage_market("ARB-1", 50_000),
    ]));
    let service = service_over(exchange.clone());

    let report = service.scan(50, false).await.unwrap();
    assert_eq!(report.arbitrage_opportunities.len(), 1);
    assert_eq!(report.executed_count, 0);
    assert!(exchange.placed_orders().is_empty());
}

/// The filter invariant holds for arbitrary thresholds over the mock
/// window.
#[tokio::test]
async fn test_filter_invariant_over_mock_window() {
    let exchange = MockExchange::new();
    use kestrel::exchange::ExchangeClient;
    let markets = exchange.get_markets(100, "open").await.unwrap();

    for threshold in [0, 400, 500, 501, 30_000, 125_000, i64::MAX] {
        let kept = filter_by_liquidity(markets.clone(), threshold);
        assert!(kept.len() <= markets.len());
        assert!(kept.iter().all(|m| m.liquidity >= threshold));
    }
}

/// Wallet and order pass-throughs deliver the collaborator's values.
#[tokio::test]
async fn test_passthrough_reads() {
    let service = service_over(Arc::new(MockExchange::new()));

    let status = service.connection_status().await.unwrap();
    assert!(status.connected);

    let wallet = service.wallet().await.unwrap();
    assert_eq!(wallet.total_equity, 290_00);

    let orders = service.recent_orders(25).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].ticker, "PRES24");
}
