//! Rebalance Monitor
//!
//! One polling cycle: LP balance (informational) → reference price →
//! reserves → spot price → band → decision.
//!
//! Each step returns a `Result`; the first failure ends the cycle with
//! `Decision::Indeterminate`. Later steps never run after a failure, so
//! a cycle always compares one price snapshot with one reserve snapshot.
//! The monitor keeps no state between cycles.

use super::range::{compute_band, is_out_of_range};
use crate::error::RebalanceError;
use crate::oracle::ReferencePriceSource;
use crate::pool::{calculate_price, ChainReader};
use crate::types::{BotConfig, Decision, PriceBand, ReserveSnapshot};
use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Fixed inputs of the monitor, taken from config at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub pool_address: Address,
    pub wallet_address: Address,
    pub volatility_percent: Decimal,
}

impl MonitorSettings {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            pool_address: config.pool_address,
            wallet_address: config.wallet_address,
            volatility_percent: config.volatility_percent,
        }
    }
}

/// Everything observed during one cycle. Fields after the failing step stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub decision: Decision,
    pub lp_balance: Option<U256>,
    pub reference_price: Option<Decimal>,
    pub reserves: Option<ReserveSnapshot>,
    pub spot_price: Option<Decimal>,
    pub band: Option<PriceBand>,
    /// The error that made the cycle indeterminate
    pub error: Option<RebalanceError>,
}

impl CycleReport {
    fn new() -> Self {
        Self {
            decision: Decision::Indeterminate,
            lp_balance: None,
            reference_price: None,
            reserves: None,
            spot_price: None,
            band: None,
            error: None,
        }
    }

    fn indeterminate(mut self, step: &str, err: RebalanceError) -> Self {
        error!(step, kind = err.kind(), "Cycle indeterminate: {}", err);
        self.decision = Decision::Indeterminate;
        self.error = Some(err);
        self
    }
}

/// Orchestrates a single monitoring cycle over its two collaborators
pub struct RebalanceMonitor<C, R> {
    chain: C,
    prices: R,
    settings: MonitorSettings,
}

impl<C: ChainReader, R: ReferencePriceSource> RebalanceMonitor<C, R> {
    pub fn new(chain: C, prices: R, settings: MonitorSettings) -> Self {
        Self {
            chain,
            prices,
            settings,
        }
    }

    /// Run one cycle and return only the decision
    pub async fn run_cycle(&self) -> Decision {
        self.evaluate().await.decision
    }

    /// Run one cycle and return the full report
    pub async fn evaluate(&self) -> CycleReport {
        let mut report = CycleReport::new();

        // 1. LP balance, informational only
        match self.chain.read_lp_balance(self.settings.wallet_address).await {
            Ok(balance) => {
                info!("LP Token Balance: {}", balance);
                report.lp_balance = Some(balance);
            }
            Err(e) => {
                warn!(kind = e.kind(), "Error fetching LP token balance: {}", e);
            }
        }

        // 2. Reference price
        let reference_price = match self.prices.fetch_reference_price(self.settings.pool_address).await {
            Ok(price) => price,
            Err(e) => return report.indeterminate("reference_price", e),
        };
        report.reference_price = Some(reference_price);

        // 3. Reserves
        let reserves = match self.chain.read_reserves().await {
            Ok(snapshot) => snapshot,
            Err(e) => return report.indeterminate("reserves", e),
        };
        let (reserve0, reserve1) = (reserves.reserve0, reserves.reserve1);
        report.reserves = Some(reserves);

        // 4. Spot price
        let spot_price = match calculate_price(reserve0, reserve1) {
            Ok(price) => price,
            Err(e) => {
                warn!("Unable to calculate on-chain price");
                return report.indeterminate("spot_price", e);
            }
        };
        info!("On-chain price: {}", spot_price);
        report.spot_price = Some(spot_price);

        // 5. Band
        let band = match compute_band(reference_price, self.settings.volatility_percent) {
            Ok(band) => band,
            Err(e) => return report.indeterminate("band", e),
        };
        report.band = Some(band);

        // 6-7. Classify
        report.decision = if is_out_of_range(spot_price, &band) {
            Decision::OutOfRange
        } else {
            Decision::InRange
        };

        if report.decision.needs_rebalance() {
            info!(
                spot = %spot_price,
                reference = %reference_price,
                band = %band,
                "Price is out of range. Rebalancing..."
            );
        } else {
            info!(
                spot = %spot_price,
                reference = %reference_price,
                band = %band,
                "Price is within range. No action needed."
            );
        }

        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Result;
    use crate::types::PoolTokens;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted chain reader that counts calls
    #[derive(Clone)]
    pub(crate) struct MockChain {
        pub reserves: Result<(u128, u128)>,
        pub lp_balance: Result<u64>,
        pub reserve_calls: Arc<AtomicUsize>,
        pub balance_calls: Arc<AtomicUsize>,
    }

    impl MockChain {
        pub(crate) fn with_reserves(reserve0: u128, reserve1: u128) -> Self {
            Self {
                reserves: Ok((reserve0, reserve1)),
                lp_balance: Ok(1_000),
                reserve_calls: Arc::new(AtomicUsize::new(0)),
                balance_calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ChainReader for MockChain {
        async fn read_reserves(&self) -> Result<ReserveSnapshot> {
            self.reserve_calls.fetch_add(1, Ordering::SeqCst);
            let (r0, r1) = self.reserves.clone()?;
            Ok(ReserveSnapshot::new(U256::from(r0), U256::from(r1), 1_700_000_000))
        }

        async fn read_lp_balance(&self, _wallet: Address) -> Result<U256> {
            self.balance_calls.fetch_add(1, Ordering::SeqCst);
            self.lp_balance.clone().map(U256::from)
        }

        async fn read_token_addresses(&self) -> Result<PoolTokens> {
            Ok(PoolTokens { token0: Address::ZERO, token1: Address::ZERO })
        }
    }

    /// Scripted reference price source
    #[derive(Clone)]
    pub(crate) struct MockPrices {
        pub price: Result<Decimal>,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockPrices {
        pub(crate) fn returning(price: Result<Decimal>) -> Self {
            Self { price, calls: Arc::new(AtomicUsize::new(0)) }
        }
    }

    #[async_trait]
    impl ReferencePriceSource for MockPrices {
        async fn fetch_reference_price(&self, _pool: Address) -> Result<Decimal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.price.clone()
        }
    }

    pub(crate) fn settings() -> MonitorSettings {
        MonitorSettings {
            pool_address: Address::ZERO,
            wallet_address: Address::ZERO,
            volatility_percent: dec!(0.01),
        }
    }

    #[tokio::test]
    async fn test_spot_at_reference_is_in_range() {
        // 100.0 = 10000 / 100
        let monitor = RebalanceMonitor::new(
            MockChain::with_reserves(10_000, 100),
            MockPrices::returning(Ok(dec!(100))),
            settings(),
        );

        let report = monitor.evaluate().await;
        assert_eq!(report.decision, Decision::InRange);
        assert_eq!(report.spot_price, Some(dec!(100)));
        assert_eq!(
            report.band,
            Some(PriceBand { lower: dec!(99.99), upper: dec!(100.01) })
        );
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_spot_above_band_is_out_of_range() {
        // 100.02 = 10002 / 100
        let monitor = RebalanceMonitor::new(
            MockChain::with_reserves(10_002, 100),
            MockPrices::returning(Ok(dec!(100))),
            settings(),
        );

        assert_eq!(monitor.run_cycle().await, Decision::OutOfRange);
    }

    #[tokio::test]
    async fn test_spot_on_upper_bound_is_in_range() {
        // 100.01 = 10001 / 100
        let monitor = RebalanceMonitor::new(
            MockChain::with_reserves(10_001, 100),
            MockPrices::returning(Ok(dec!(100))),
            settings(),
        );

        assert_eq!(monitor.run_cycle().await, Decision::InRange);
    }

    #[tokio::test]
    async fn test_zero_reserve1_is_indeterminate() {
        let monitor = RebalanceMonitor::new(
            MockChain::with_reserves(500, 0),
            MockPrices::returning(Ok(dec!(100))),
            settings(),
        );

        let report = monitor.evaluate().await;
        assert_eq!(report.decision, Decision::Indeterminate);
        assert_eq!(report.error, Some(RebalanceError::DivisionByZero));
        assert!(report.reserves.is_some());
        assert!(report.band.is_none());
    }

    #[tokio::test]
    async fn test_malformed_price_skips_chain_read() {
        let chain = MockChain::with_reserves(10_000, 100);
        let reserve_calls = Arc::clone(&chain.reserve_calls);
        let monitor = RebalanceMonitor::new(
            chain,
            MockPrices::returning(Err(RebalanceError::MalformedResponse(
                "missing priceUsd field".to_string(),
            ))),
            settings(),
        );

        let report = monitor.evaluate().await;
        assert_eq!(report.decision, Decision::Indeterminate);
        assert!(matches!(report.error, Some(RebalanceError::MalformedResponse(_))));
        assert_eq!(reserve_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_network_failure_is_indeterminate() {
        let monitor = RebalanceMonitor::new(
            MockChain::with_reserves(10_000, 100),
            MockPrices::returning(Err(RebalanceError::NetworkFailure("connection refused".to_string()))),
            settings(),
        );

        assert_eq!(monitor.run_cycle().await, Decision::Indeterminate);
    }

    #[tokio::test]
    async fn test_reserve_failure_is_indeterminate() {
        let mut chain = MockChain::with_reserves(0, 0);
        chain.reserves = Err(RebalanceError::ChainReadFailure("getReserves: timed out after 10s".to_string()));
        let monitor = RebalanceMonitor::new(chain, MockPrices::returning(Ok(dec!(100))), settings());

        let report = monitor.evaluate().await;
        assert_eq!(report.decision, Decision::Indeterminate);
        assert_eq!(report.reference_price, Some(dec!(100)));
        assert!(report.spot_price.is_none());
    }

    #[tokio::test]
    async fn test_lp_balance_failure_does_not_change_decision() {
        let mut chain = MockChain::with_reserves(10_000, 100);
        chain.lp_balance = Err(RebalanceError::ChainReadFailure("balanceOf: reverted".to_string()));
        let balance_calls = Arc::clone(&chain.balance_calls);
        let monitor = RebalanceMonitor::new(chain, MockPrices::returning(Ok(dec!(100))), settings());

        let report = monitor.evaluate().await;
        assert_eq!(report.decision, Decision::InRange);
        assert!(report.lp_balance.is_none());
        assert!(report.error.is_none());
        assert_eq!(balance_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_positive_reference_is_indeterminate() {
        let monitor = RebalanceMonitor::new(
            MockChain::with_reserves(10_000, 100),
            MockPrices::returning(Ok(Decimal::ZERO)),
            settings(),
        );

        let report = monitor.evaluate().await;
        assert_eq!(report.decision, Decision::Indeterminate);
        assert!(matches!(report.error, Some(RebalanceError::InvalidReferencePrice(_))));
    }

    #[tokio::test]
    async fn test_cycles_are_idempotent() {
        let chain = MockChain::with_reserves(10_002, 100);
        let prices = MockPrices::returning(Ok(dec!(100)));
        let price_calls = Arc::clone(&prices.calls);
        let monitor = RebalanceMonitor::new(chain, prices, settings());

        let first = monitor.evaluate().await;
        let second = monitor.evaluate().await;
        assert_eq!(first.decision, second.decision);
        assert_eq!(first.spot_price, second.spot_price);
        assert_eq!(first.band, second.band);
        assert_eq!(price_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_wider_volatility_widens_band() {
        let mut wide = settings();
        wide.volatility_percent = dec!(1);
        let monitor = RebalanceMonitor::new(
            MockChain::with_reserves(10_050, 100),
            MockPrices::returning(Ok(dec!(100))),
            wide,
        );

        assert_eq!(monitor.run_cycle().await, Decision::InRange);
    }
}
