//! Liquidity Manager
//!
//! Builds and submits Uniswap V2 router `addLiquidity` / `removeLiquidity`
//! transactions for the monitored pair. This is the execution side of a
//! rebalance (withdraw, then re-deposit); the polling loop only logs
//! rebalance intent and never calls it.
//!
//! Transactions use a fixed 300k gas limit at the node's current gas
//! price and are signed with the configured private key.

use crate::contracts::IUniswapV2Router02;
use crate::error::{RebalanceError, Result};
use crate::types::{BotConfig, PoolTokens};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Gas limit for router liquidity calls
pub const LIQUIDITY_GAS_LIMIT: u64 = 300_000;

/// Default deadline window for submitted transactions (5 minutes)
pub const DEFAULT_DEADLINE_SECS: u64 = 300;

const BPS_DENOMINATOR: u64 = 10_000;

/// Arguments of router `addLiquidity`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
}

impl AddLiquidityParams {
    /// Deposit into `tokens` with minimums derived from `slippage_bps`
    pub fn new(
        tokens: PoolTokens,
        amount_a_desired: U256,
        amount_b_desired: U256,
        slippage_bps: u32,
        to: Address,
    ) -> Self {
        Self {
            token_a: tokens.token0,
            token_b: tokens.token1,
            amount_a_desired,
            amount_b_desired,
            amount_a_min: min_amount(amount_a_desired, slippage_bps),
            amount_b_min: min_amount(amount_b_desired, slippage_bps),
            to,
            deadline: deadline_from_now(DEFAULT_DEADLINE_SECS),
        }
    }
}

/// Arguments of router `removeLiquidity`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub liquidity: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
}

impl RemoveLiquidityParams {
    /// Withdraw `liquidity` LP tokens, accepting at least `expected_*` less slippage
    pub fn new(
        tokens: PoolTokens,
        liquidity: U256,
        expected_a: U256,
        expected_b: U256,
        slippage_bps: u32,
        to: Address,
    ) -> Self {
        Self {
            token_a: tokens.token0,
            token_b: tokens.token1,
            liquidity,
            amount_a_min: min_amount(expected_a, slippage_bps),
            amount_b_min: min_amount(expected_b, slippage_bps),
            to,
            deadline: deadline_from_now(DEFAULT_DEADLINE_SECS),
        }
    }
}

/// Unix timestamp `secs` from now, as the router's uint256 deadline
pub fn deadline_from_now(secs: u64) -> U256 {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
    U256::from(now.saturating_add(secs))
}

/// `amount` reduced by `slippage_bps` basis points (capped at 100%)
pub fn min_amount(amount: U256, slippage_bps: u32) -> U256 {
    let bps = u64::from(slippage_bps).min(BPS_DENOMINATOR);
    amount * U256::from(BPS_DENOMINATOR - bps) / U256::from(BPS_DENOMINATOR)
}

/// Write side of the chain for rebalance execution
#[async_trait]
pub trait LiquidityManager: Send + Sync {
    async fn add_liquidity(&self, params: &AddLiquidityParams) -> Result<TxHash>;

    async fn remove_liquidity(&self, params: &RemoveLiquidityParams) -> Result<TxHash>;
}

/// `LiquidityManager` that sends signed router transactions
pub struct RouterLiquidityManager<P> {
    provider: Arc<P>,
    router: Address,
    signer_address: Address,
}

impl<P: Provider + 'static> RouterLiquidityManager<P> {
    /// `provider` must already carry a wallet able to sign for `signer_address`
    pub fn new(provider: Arc<P>, router: Address, signer_address: Address) -> Self {
        Self {
            provider,
            router,
            signer_address,
        }
    }

    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| RebalanceError::TransactionFailure(format!("gas price: {}", e)))
    }
}

impl RouterLiquidityManager<DynProvider> {
    /// Build a signing manager from config. `Ok(None)` when no router or
    /// key is configured; an unparsable key is a startup error.
    pub async fn from_config(config: &BotConfig) -> anyhow::Result<Option<Self>> {
        let (router, key) = match (config.router_address, config.private_key.as_deref()) {
            (Some(router), Some(key)) => (router, key),
            _ => return Ok(None),
        };

        let signer = parse_signer(key)?;
        let signer_address = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect(&config.rpc_url)
            .await
            .context("Failed to connect signing provider")?
            .erased();

        Ok(Some(Self::new(Arc::new(provider), router, signer_address)))
    }
}

/// Parse a hex private key (with or without 0x)
pub fn parse_signer(key: &str) -> anyhow::Result<PrivateKeySigner> {
    key.trim()
        .parse::<PrivateKeySigner>()
        .context("Invalid PRIVATE_KEY")
}

#[async_trait]
impl<P: Provider + 'static> LiquidityManager for RouterLiquidityManager<P> {
    async fn add_liquidity(&self, params: &AddLiquidityParams) -> Result<TxHash> {
        let gas_price = self.gas_price().await?;
        let router = IUniswapV2Router02::new(self.router, Arc::clone(&self.provider));

        debug!(
            "addLiquidity: {} {} / {} {} (min {} / {}), deadline {}",
            params.amount_a_desired, params.token_a, params.amount_b_desired, params.token_b,
            params.amount_a_min, params.amount_b_min, params.deadline
        );

        let pending = router
            .addLiquidity(
                params.token_a,
                params.token_b,
                params.amount_a_desired,
                params.amount_b_desired,
                params.amount_a_min,
                params.amount_b_min,
                params.to,
                params.deadline,
            )
            .from(self.signer_address)
            .gas(LIQUIDITY_GAS_LIMIT)
            .gas_price(gas_price)
            .send()
            .await
            .map_err(|e| RebalanceError::TransactionFailure(format!("addLiquidity: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        info!("Liquidity added: {}", tx_hash);
        Ok(tx_hash)
    }

    async fn remove_liquidity(&self, params: &RemoveLiquidityParams) -> Result<TxHash> {
        let gas_price = self.gas_price().await?;
        let router = IUniswapV2Router02::new(self.router, Arc::clone(&self.provider));

        debug!(
            "removeLiquidity: {} LP (min {} / {}), deadline {}",
            params.liquidity, params.amount_a_min, params.amount_b_min, params.deadline
        );

        let pending = router
            .removeLiquidity(
                params.token_a,
                params.token_b,
                params.liquidity,
                params.amount_a_min,
                params.amount_b_min,
                params.to,
                params.deadline,
            )
            .from(self.signer_address)
            .gas(LIQUIDITY_GAS_LIMIT)
            .gas_price(gas_price)
            .send()
            .await
            .map_err(|e| RebalanceError::TransactionFailure(format!("removeLiquidity: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        info!("Liquidity removed: {}", tx_hash);
        Ok(tx_hash)
    }
}
