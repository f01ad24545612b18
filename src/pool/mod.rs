//! Pool module
//!
//! On-chain side of the monitor: reading V2 pair state and turning
//! reserves into a spot price.

pub mod calculator;
pub mod reader;

pub use calculator::calculate_price;
pub use reader::{ChainReader, V2PairReader};
