//! Rebalance decision module
//!
//! Band computation, the per-cycle monitor, and the polling loop.

pub mod monitor;
pub mod range;
pub mod scheduler;

pub use monitor::{CycleReport, MonitorSettings, RebalanceMonitor};
pub use range::{compute_band, is_out_of_range};
pub use scheduler::{Scheduler, SchedulerStats};
