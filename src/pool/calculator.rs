//! Price Calculator
//!
//! Derives the spot price of a V2 pair from its raw reserves
//! (token0 denominated in token1, no decimal adjustment).
//!
//! Reserves are uint112 and can exceed what a Decimal holds, so the
//! division happens on the integers and only the result is converted.

use crate::error::{RebalanceError, Result};
use alloy::primitives::{U256, U512};
use rust_decimal::Decimal;

/// Largest integer a Decimal can hold without a scale (2^96 - 1)
const MAX_DECIMAL_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;

/// Most fractional digits a Decimal carries
const MAX_DECIMAL_SCALE: u32 = 28;

/// Spot price of token0 in terms of token1: `reserve0 / reserve1`.
///
/// The integer part is divided exactly in U256, then as many fractional
/// digits as still fit the Decimal mantissa are taken from the remainder
/// (truncated, never rounded up).
pub fn calculate_price(reserve0: U256, reserve1: U256) -> Result<Decimal> {
    if reserve1.is_zero() {
        return Err(RebalanceError::DivisionByZero);
    }

    let overflow = || {
        RebalanceError::PriceOverflow(format!("reserve0={} reserve1={}", reserve0, reserve1))
    };

    let (quotient, remainder) = reserve0.div_rem(reserve1);
    let quotient = u128::try_from(quotient)
        .ok()
        .filter(|q| *q <= MAX_DECIMAL_MANTISSA)
        .ok_or_else(overflow)?;

    let scale = fractional_digits(quotient);
    let pow = 10u128.pow(scale);

    // remainder < reserve1 and pow < 2^94, so the product fits in 512 bits
    let fraction = U512::from(remainder) * U512::from(pow) / U512::from(reserve1);
    let fraction = u128::try_from(fraction).map_err(|_| overflow())?;

    let mantissa = quotient
        .checked_mul(pow)
        .and_then(|m| m.checked_add(fraction))
        .and_then(|m| i128::try_from(m).ok())
        .ok_or_else(overflow)?;

    Decimal::try_from_i128_with_scale(mantissa, scale)
        .map(|price| price.normalize())
        .map_err(|_| overflow())
}

/// Largest scale `k <= 28` such that any value in `[q, q + 1)` with `k`
/// fractional digits still fits the mantissa
fn fractional_digits(quotient: u128) -> u32 {
    let mut scale = 0;
    while scale < MAX_DECIMAL_SCALE {
        let fits = 10u128
            .checked_pow(scale + 1)
            .and_then(|pow| (quotient + 1).checked_mul(pow))
            .map(|upper| upper - 1 <= MAX_DECIMAL_MANTISSA)
            .unwrap_or(false);
        if !fits {
            break;
        }
        scale += 1;
    }
    scale
}
