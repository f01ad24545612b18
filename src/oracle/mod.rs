//! Reference price module
//!
//! The external market price the pool is compared against.

pub mod dexscreener;

pub use dexscreener::DexscreenerClient;

use crate::error::Result;
use alloy::primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Source of the external reference price for a pool
#[async_trait]
pub trait ReferencePriceSource: Send + Sync {
    /// Price of the pool's base token in a stable quote currency (USD)
    async fn fetch_reference_price(&self, pool: Address) -> Result<Decimal>;
}
