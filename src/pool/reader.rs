//! V2 Pair Reader
//!
//! Reads reserves, token identities and the wallet's LP-token balance
//! from a Uniswap-V2-style pair contract. All V2 forks share this
//! interface, so one reader covers any of them.
//!
//! Every call is bounded by the configured request timeout. An elapsed
//! timeout is reported the same way as an RPC error.

use crate::contracts::IUniswapV2Pair;
use crate::error::{RebalanceError, Result};
use crate::types::{PoolTokens, ReserveSnapshot};
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use async_trait::async_trait;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Read side of the chain, as seen by the rebalance monitor
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current pair reserves (both values come from one `getReserves()` call)
    async fn read_reserves(&self) -> Result<ReserveSnapshot>;

    /// LP-token balance held by `wallet`
    async fn read_lp_balance(&self, wallet: Address) -> Result<U256>;

    /// token0 / token1 of the pair
    async fn read_token_addresses(&self) -> Result<PoolTokens>;
}

/// `ChainReader` backed by an alloy provider
pub struct V2PairReader<P> {
    provider: Arc<P>,
    pool_address: Address,
    timeout: Duration,
}

impl<P: Provider + 'static> V2PairReader<P> {
    pub fn new(provider: Arc<P>, pool_address: Address, timeout: Duration) -> Self {
        Self {
            provider,
            pool_address,
            timeout,
        }
    }

    fn pair(&self) -> IUniswapV2Pair::IUniswapV2PairInstance<Arc<P>> {
        IUniswapV2Pair::new(self.pool_address, Arc::clone(&self.provider))
    }
}

/// Run an RPC future under `limit`, mapping both failure modes to `ChainReadFailure`
async fn bounded<T, E, F>(what: &str, limit: Duration, fut: F) -> Result<T>
where
    F: IntoFuture<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(limit, fut.into_future()).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(RebalanceError::ChainReadFailure(format!("{}: {}", what, e))),
        Err(_) => Err(RebalanceError::ChainReadFailure(format!(
            "{}: timed out after {}s",
            what,
            limit.as_secs()
        ))),
    }
}

#[async_trait]
impl<P: Provider + 'static> ChainReader for V2PairReader<P> {
    async fn read_reserves(&self) -> Result<ReserveSnapshot> {
        let pair = self.pair();
        let reserves = bounded("getReserves", self.timeout, pair.getReserves().call()).await?;

        let snapshot = ReserveSnapshot::new(
            U256::from(reserves.reserve0),
            U256::from(reserves.reserve1),
            reserves.blockTimestampLast,
        );

        debug!(
            "Reserves - Token0: {}, Token1: {}, Timestamp: {}",
            snapshot.reserve0, snapshot.reserve1, snapshot.block_timestamp_last
        );

        Ok(snapshot)
    }

    async fn read_lp_balance(&self, wallet: Address) -> Result<U256> {
        let pair = self.pair();
        bounded("balanceOf", self.timeout, pair.balanceOf(wallet).call()).await
    }

    async fn read_token_addresses(&self) -> Result<PoolTokens> {
        let pair = self.pair();
        let token0 = bounded("token0", self.timeout, pair.token0().call()).await?;
        let token1 = bounded("token1", self.timeout, pair.token1().call()).await?;
        Ok(PoolTokens { token0, token1 })
    }
}
