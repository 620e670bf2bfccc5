//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the exchange API key) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub exchange: ExchangeConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeConfig {
    pub base_url: String,
    /// Name of the env var holding the API key (not the key itself).
    pub api_key_env: String,
    pub timeout_secs: u64,
}

/// Seed values for the runtime-tunable thresholds, plus the execution
/// sizing used when a scan is asked to auto-execute.
#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    /// Minimum market depth in cents.
    pub min_liquidity: i64,
    /// Minimum estimated profit in dollars per day.
    pub min_profit_per_day: Decimal,
    /// Contracts per leg for auto-executed orders.
    #[serde(default = "default_contracts_per_order")]
    pub contracts_per_order: u32,
}

fn default_contracts_per_order() -> u32 {
    1
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
