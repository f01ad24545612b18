//! Error taxonomy for the monitoring cycle
//!
//! Every collaborator returns these as values. The rebalance monitor
//! downgrades each one to `Decision::Indeterminate` at the step where it
//! occurs; none of them terminate the process.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RebalanceError {
    /// Transport-level failure talking to the reference price API
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Price API answered, but the payload was unusable
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Any failure reading pair contract state over RPC
    #[error("chain read failure: {0}")]
    ChainReadFailure(String),

    #[error("division by zero: reserve1 is zero")]
    DivisionByZero,

    #[error("invalid reference price: {0}")]
    InvalidReferencePrice(String),

    #[error("invalid volatility percent: {0}")]
    InvalidVolatility(String),

    /// Reserve ratio does not fit in a Decimal
    #[error("price overflow: {0}")]
    PriceOverflow(String),

    /// Signing or submission failure in the liquidity manager
    #[error("transaction failure: {0}")]
    TransactionFailure(String),
}

impl RebalanceError {
    /// Short taxonomy label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            RebalanceError::NetworkFailure(_) => "network_failure",
            RebalanceError::MalformedResponse(_) => "malformed_response",
            RebalanceError::ChainReadFailure(_) => "chain_read_failure",
            RebalanceError::DivisionByZero => "division_by_zero",
            RebalanceError::InvalidReferencePrice(_) => "invalid_reference_price",
            RebalanceError::InvalidVolatility(_) => "invalid_volatility",
            RebalanceError::PriceOverflow(_) => "price_overflow",
            RebalanceError::TransactionFailure(_) => "transaction_failure",
        }
    }
}

pub type Result<T> = std::result::Result<T, RebalanceError>;
