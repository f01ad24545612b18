//! Range Evaluator
//!
//! Builds the tolerance band around a reference price and classifies
//! a spot price against it.
//!
//! Volatility is in percentage points: 0.01 means a ±0.01% band, i.e.
//! a reference price of 100 gives (99.99, 100.01).

use crate::error::{RebalanceError, Result};
use crate::types::PriceBand;
use rust_decimal::Decimal;
use tracing::info;

/// Band `[p * (1 - v/100), p * (1 + v/100)]` around `reference_price`
pub fn compute_band(reference_price: Decimal, volatility_percent: Decimal) -> Result<PriceBand> {
    if reference_price <= Decimal::ZERO {
        return Err(RebalanceError::InvalidReferencePrice(format!(
            "must be positive, got {}",
            reference_price
        )));
    }

    // Negative widths invert the band, >= 100% drives the lower bound to zero or below
    if volatility_percent.is_sign_negative() || volatility_percent >= Decimal::ONE_HUNDRED {
        return Err(RebalanceError::InvalidVolatility(format!(
            "must be in [0, 100), got {}",
            volatility_percent
        )));
    }

    let fraction = volatility_percent / Decimal::ONE_HUNDRED;
    let overflow = || {
        RebalanceError::InvalidReferencePrice(format!(
            "band overflows for reference price {}",
            reference_price
        ))
    };

    let lower = reference_price
        .checked_mul(Decimal::ONE - fraction)
        .ok_or_else(overflow)?;
    let upper = reference_price
        .checked_mul(Decimal::ONE + fraction)
        .ok_or_else(overflow)?;

    info!(
        "Tick range calculated with volatility {}%: {:.6} - {:.6}",
        volatility_percent, lower, upper
    );

    Ok(PriceBand { lower, upper })
}

/// True iff `spot_price` is strictly below `lower` or strictly above `upper`
pub fn is_out_of_range(spot_price: Decimal, band: &PriceBand) -> bool {
    !band.contains(spot_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_band() {
        let band = compute_band(dec!(100), dec!(0.01)).unwrap();
        assert_eq!(band.lower, dec!(99.99));
        assert_eq!(band.upper, dec!(100.01));
    }

    #[test]
    fn test_in_range_at_reference() {
        let band = compute_band(dec!(100), dec!(0.01)).unwrap();
        assert!(!is_out_of_range(dec!(100.0), &band));
    }

    #[test]
    fn test_out_of_range_above_and_below() {
        let band = compute_band(dec!(100), dec!(0.01)).unwrap();
        assert!(is_out_of_range(dec!(100.02), &band));
        assert!(is_out_of_range(dec!(99.98), &band));
    }

    #[test]
    fn test_bounds_are_in_range() {
        let band = compute_band(dec!(100), dec!(0.01)).unwrap();
        assert!(!is_out_of_range(band.lower, &band));
        assert!(!is_out_of_range(band.upper, &band));
    }

    #[test]
    fn test_band_contains_reference_for_many_inputs() {
        let prices = [dec!(0.000001), dec!(0.35), dec!(1), dec!(3012.45), dec!(95000), dec!(1000000000)];
        let vols = [dec!(0), dec!(0.01), dec!(0.5), dec!(5), dec!(50), dec!(99.99)];
        for p in prices {
            for v in vols {
                let band = compute_band(p, v).unwrap();
                assert!(band.lower <= p && p <= band.upper, "p={} v={} band={}", p, v, band);
                assert!(band.lower > Decimal::ZERO, "p={} v={} lower not positive", p, v);
            }
        }
    }

    #[test]
    fn test_zero_volatility_is_point_band() {
        let band = compute_band(dec!(42.5), Decimal::ZERO).unwrap();
        assert_eq!(band.lower, dec!(42.5));
        assert_eq!(band.upper, dec!(42.5));
        assert!(!is_out_of_range(dec!(42.5), &band));
        assert!(is_out_of_range(dec!(42.5000001), &band));
    }

    #[test]
    fn test_non_positive_reference_rejected() {
        assert!(matches!(
            compute_band(Decimal::ZERO, dec!(0.01)),
            Err(RebalanceError::InvalidReferencePrice(_))
        ));
        assert!(matches!(
            compute_band(dec!(-5), dec!(0.01)),
            Err(RebalanceError::InvalidReferencePrice(_))
        ));
    }

    #[test]
    fn test_volatility_out_of_bounds_rejected() {
        assert!(matches!(
            compute_band(dec!(100), dec!(-0.01)),
            Err(RebalanceError::InvalidVolatility(_))
        ));
        assert!(matches!(
            compute_band(dec!(100), dec!(100)),
            Err(RebalanceError::InvalidVolatility(_))
        ));
    }

    #[test]
    fn test_overflow_reported_as_invalid_reference() {
        assert!(matches!(
            compute_band(Decimal::MAX, dec!(1)),
            Err(RebalanceError::InvalidReferencePrice(_))
        ));
    }
}
