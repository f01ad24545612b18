//! LP Range Monitor Library
//!
//! Watches a Uniswap-V2-style pool and decides whether the owner's
//! liquidity position needs rebalancing: the on-chain spot price (from
//! reserves) is compared against a tolerance band built around an
//! external reference price.
//!
//! The polling loop only reports rebalance intent. Router transactions
//! live in [`liquidity`] for callers that want to act on it.

pub mod config;
pub mod contracts;
pub mod error;
pub mod liquidity;
pub mod oracle;
pub mod pool;
pub mod rebalance;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, load_config_from_file};
pub use error::{RebalanceError, Result};
pub use liquidity::{LiquidityManager, RouterLiquidityManager};
pub use oracle::{DexscreenerClient, ReferencePriceSource};
pub use pool::{calculate_price, ChainReader, V2PairReader};
pub use rebalance::{compute_band, is_out_of_range, RebalanceMonitor, Scheduler};
pub use types::{BotConfig, Decision, PoolTokens, PriceBand, ReserveSnapshot};
