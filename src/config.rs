//! Configuration management
//! Load settings from a .env file and the process environment

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

// Re-export BotConfig for external access
pub use crate::types::BotConfig;
use alloy::primitives::Address;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.dexscreener.io";
pub const DEFAULT_PRICE_API_CHAIN: &str = "base";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FAILURE_WARN_THRESHOLD: u32 = 5;

/// Band half-width in percentage points (0.01 = 0.01%)
pub const DEFAULT_VOLATILITY_PERCENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Load config from `.env` (if present) and the environment
pub fn load_config() -> Result<BotConfig> {
    dotenv::dotenv().ok();
    from_env()
}

/// Load config from a specific env file, then the environment.
/// Variables already set in the environment win over the file.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    let path = path.as_ref();
    dotenv::from_path(path)
        .with_context(|| format!("Failed to load env file: {}", path.display()))?;
    from_env()
}

fn from_env() -> Result<BotConfig> {
    parse_config(|key| std::env::var(key).ok())
}

/// Build a `BotConfig` from a key lookup. Empty values count as unset.
pub fn parse_config<F>(lookup: F) -> Result<BotConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let require = |key: &str| get(key).with_context(|| format!("{} not set", key));

    let rpc_url = require("RPC_URL")?;
    let wallet_address = parse_address("WALLET_ADDRESS", &require("WALLET_ADDRESS")?)?;
    let pool_address = parse_address("POOL_ADDRESS", &require("POOL_ADDRESS")?)?;
    let router_address = get("ROUTER_ADDRESS")
        .map(|v| parse_address("ROUTER_ADDRESS", &v))
        .transpose()?;

    let poll_interval_secs = parse_or("POLL_INTERVAL_SECS", get("POLL_INTERVAL_SECS"), DEFAULT_POLL_INTERVAL_SECS)?;
    if poll_interval_secs == 0 {
        bail!("POLL_INTERVAL_SECS must be greater than zero");
    }

    let request_timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS)?;
    if request_timeout_secs == 0 {
        bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
    }

    let volatility_percent = match get("VOLATILITY_PERCENT") {
        Some(raw) => Decimal::from_str(raw.trim())
            .with_context(|| format!("Invalid VOLATILITY_PERCENT: {}", raw))?,
        None => DEFAULT_VOLATILITY_PERCENT,
    };
    if volatility_percent.is_sign_negative() || volatility_percent >= Decimal::ONE_HUNDRED {
        bail!("VOLATILITY_PERCENT must be in [0, 100), got {}", volatility_percent);
    }

    Ok(BotConfig {
        rpc_url,
        wallet_address,
        private_key: get("PRIVATE_KEY"),
        pool_address,
        router_address,
        price_api_url: get("PRICE_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_PRICE_API_URL.to_string()),
        price_api_chain: get("PRICE_API_CHAIN").unwrap_or_else(|| DEFAULT_PRICE_API_CHAIN.to_string()),
        volatility_percent,
        poll_interval_secs,
        request_timeout_secs,
        failure_warn_threshold: parse_or(
            "FAILURE_WARN_THRESHOLD",
            get("FAILURE_WARN_THRESHOLD"),
            DEFAULT_FAILURE_WARN_THRESHOLD,
        )?,
        log_file: get("LOG_FILE"),
    })
}

/// Host part of the RPC URL, for logging. Paths and query strings often
/// carry API keys, so nothing else is shown.
pub fn rpc_host(rpc_url: &str) -> String {
    reqwest::Url::parse(rpc_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "<unparsable>".to_string())
}

fn parse_address(key: &str, raw: &str) -> Result<Address> {
    Address::from_str(raw.trim()).with_context(|| format!("Invalid {}: {}", key, raw))
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid {}: {}", key, v)),
        None => Ok(default),
    }
}
