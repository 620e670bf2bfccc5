//! KESTREL — Control surface for an automated Kalshi trading agent.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the exchange client and scan engine into the control service,
//! and runs the web server with graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use kestrel::config;
use kestrel::control::ControlService;
use kestrel::dashboard;
use kestrel::engine::scanner::ArbScanner;
use kestrel::exchange::kalshi::KalshiClient;
use kestrel::exchange::ExchangeClient;
use kestrel::types::Settings;

const BANNER: &str = r#"
 _  _______ ____ _____ ____  _____ _
| |/ / ____/ ___|_   _|  _ \| ____| |
| ' /|  _| \___ \ | | | |_) |  _| | |
| . \| |___ ___) || | |  _ <| |___| |___
|_|\_\_____|____/ |_| |_| \_\_____|_____|

  Kalshi agent control surface
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        host = %cfg.server.host,
        port = cfg.server.port,
        exchange = %cfg.exchange.base_url,
        min_liquidity = cfg.scan.min_liquidity,
        min_profit_per_day = %cfg.scan.min_profit_per_day,
        "KESTREL starting up"
    );

    // -- Wire components -------------------------------------------------

    let exchange: Arc<dyn ExchangeClient> = Arc::new(KalshiClient::new(&cfg.exchange)?);
    let scanner = Arc::new(ArbScanner::new(
        exchange.clone(),
        cfg.scan.contracts_per_order,
    ));

    let service = Arc::new(ControlService::new(
        exchange,
        scanner,
        Settings {
            min_liquidity: cfg.scan.min_liquidity,
            min_profit_per_day: cfg.scan.min_profit_per_day,
        },
    ));

    // -- Serve -----------------------------------------------------------

    dashboard::serve(service, &cfg.server.host, cfg.server.port).await?;

    info!("KESTREL shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kestrel=info"));

    let json_logging = std::env::var("KESTREL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
