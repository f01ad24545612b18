//! Polling Scheduler
//!
//! Runs a monitoring cycle, sleeps for the fixed interval, repeats until
//! the shutdown future resolves. A cycle's failure is already folded into
//! `Decision::Indeterminate`, so the loop itself has nothing to handle.
//!
//! Counters are kept for periodic status logs only. They never change
//! the cadence: no backoff, no circuit breaker.

use super::monitor::RebalanceMonitor;
use crate::oracle::ReferencePriceSource;
use crate::pool::ChainReader;
use crate::types::Decision;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Log a status summary every this many cycles
const SUMMARY_EVERY: u64 = 60;

/// Running totals across cycles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles: u64,
    pub in_range: u64,
    pub out_of_range: u64,
    pub indeterminate: u64,
    pub consecutive_indeterminate: u32,
    /// Times the consecutive-failure warning was logged
    pub failure_warnings: u64,
}

impl SchedulerStats {
    pub fn record(&mut self, decision: Decision) {
        self.cycles += 1;
        match decision {
            Decision::InRange => {
                self.in_range += 1;
                self.consecutive_indeterminate = 0;
            }
            Decision::OutOfRange => {
                self.out_of_range += 1;
                self.consecutive_indeterminate = 0;
            }
            Decision::Indeterminate => {
                self.indeterminate += 1;
                self.consecutive_indeterminate = self.consecutive_indeterminate.saturating_add(1);
            }
        }
    }
}

pub struct Scheduler<C, R> {
    monitor: RebalanceMonitor<C, R>,
    interval: Duration,
    /// Warn once consecutive indeterminate cycles reach this count (0 = never)
    failure_warn_threshold: u32,
}

impl<C: ChainReader, R: ReferencePriceSource> Scheduler<C, R> {
    pub fn new(monitor: RebalanceMonitor<C, R>, interval: Duration, failure_warn_threshold: u32) -> Self {
        Self {
            monitor,
            interval,
            failure_warn_threshold,
        }
    }

    /// Poll until `shutdown` resolves. Returns the final counters.
    pub async fn run<F>(&self, shutdown: F) -> SchedulerStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut stats = SchedulerStats::default();

        info!("Starting monitoring loop (interval: {}s)", self.interval.as_secs());

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                decision = self.monitor.run_cycle() => {
                    stats.record(decision);
                    self.log_progress(&mut stats, decision);
                }
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = sleep(self.interval) => {}
            }
        }

        info!(
            "Shutting down after {} cycles ({} in range, {} out of range, {} indeterminate)",
            stats.cycles, stats.in_range, stats.out_of_range, stats.indeterminate
        );
        stats
    }

    /// True exactly once per failure streak: when it reaches the threshold
    fn failure_streak_hit(&self, stats: &SchedulerStats, decision: Decision) -> bool {
        decision == Decision::Indeterminate
            && self.failure_warn_threshold > 0
            && stats.consecutive_indeterminate == self.failure_warn_threshold
    }

    fn log_progress(&self, stats: &mut SchedulerStats, decision: Decision) {
        info!(cycle = stats.cycles, %decision, "Cycle complete");

        if self.failure_streak_hit(stats, decision) {
            stats.failure_warnings += 1;
            warn!(
                "{} consecutive indeterminate cycles - check RPC and price API connectivity",
                stats.consecutive_indeterminate
            );
        }

        if stats.cycles % SUMMARY_EVERY == 0 {
            info!(
                "Iteration {} | {} in range | {} out of range | {} indeterminate",
                stats.cycles, stats.in_range, stats.out_of_range, stats.indeterminate
            );
        }
    }
}
