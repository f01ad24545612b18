//! Core data structures
//!
//! Values produced fresh each polling cycle (reserves, band, decision)
//! plus the process configuration built once at startup.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Pair reserves as returned by `getReserves()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub reserve0: U256,
    pub reserve1: U256,
    /// Pair contract's own last-update timestamp (uint32 seconds)
    pub block_timestamp_last: u32,
    /// Local wall-clock time of the read
    pub observed_at: DateTime<Utc>,
}

impl ReserveSnapshot {
    pub fn new(reserve0: U256, reserve1: U256, block_timestamp_last: u32) -> Self {
        Self {
            reserve0,
            reserve1,
            block_timestamp_last,
            observed_at: Utc::now(),
        }
    }
}

/// Token identities of the monitored pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTokens {
    pub token0: Address,
    pub token1: Address,
}

/// Tolerance band around a reference price. `lower <= upper` always holds
/// for bands built by `rebalance::compute_band`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    pub lower: Decimal,
    pub upper: Decimal,
}

impl PriceBand {
    /// Whether `price` lies inside the band, bounds included
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.lower && price <= self.upper
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.lower.round_dp(6), self.upper.round_dp(6))
    }
}

/// Outcome of one monitoring cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    InRange,
    OutOfRange,
    /// Some upstream fetch or computation failed this cycle
    Indeterminate,
}

impl Decision {
    pub fn needs_rebalance(&self) -> bool {
        matches!(self, Decision::OutOfRange)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decision::InRange => write!(f, "InRange"),
            Decision::OutOfRange => write!(f, "OutOfRange"),
            Decision::Indeterminate => write!(f, "Indeterminate"),
        }
    }
}

/// Bot configuration
#[derive(Clone)]
pub struct BotConfig {
    // Network
    pub rpc_url: String,

    // Wallet
    pub wallet_address: Address,
    /// Only needed by the liquidity manager
    pub private_key: Option<String>,

    // Contracts
    pub pool_address: Address,
    pub router_address: Option<Address>,

    // Reference price API
    pub price_api_url: String,
    pub price_api_chain: String,

    // Policy
    pub volatility_percent: Decimal,

    // Timing
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub failure_warn_threshold: u32,

    // Logging
    pub log_file: Option<String>,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("rpc_url", &self.rpc_url)
            .field("wallet_address", &self.wallet_address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("pool_address", &self.pool_address)
            .field("router_address", &self.router_address)
            .field("price_api_url", &self.price_api_url)
            .field("price_api_chain", &self.price_api_chain)
            .field("volatility_percent", &self.volatility_percent)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("failure_warn_threshold", &self.failure_warn_threshold)
            .field("log_file", &self.log_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_band_contains_bounds() {
        let band = PriceBand { lower: dec!(99.99), upper: dec!(100.01) };
        assert!(band.contains(dec!(99.99)));
        assert!(band.contains(dec!(100.01)));
        assert!(band.contains(dec!(100)));
        assert!(!band.contains(dec!(100.02)));
    }

    #[test]
    fn test_decision_needs_rebalance() {
        assert!(Decision::OutOfRange.needs_rebalance());
        assert!(!Decision::InRange.needs_rebalance());
        assert!(!Decision::Indeterminate.needs_rebalance());
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = BotConfig {
            rpc_url: "http://localhost:8545".to_string(),
            wallet_address: Address::ZERO,
            private_key: Some("0xdeadbeef".to_string()),
            pool_address: Address::ZERO,
            router_address: None,
            price_api_url: "https://api.dexscreener.io".to_string(),
            price_api_chain: "base".to_string(),
            volatility_percent: dec!(0.01),
            poll_interval_secs: 60,
            request_timeout_secs: 10,
            failure_warn_threshold: 5,
            log_file: None,
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("deadbeef"));
        assert!(rendered.contains("<redacted>"));
    }
}
