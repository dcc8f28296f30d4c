//! Common utility functions for schedule calculations.
//!
//! This module provides shared functionality used across the evaluators and
//! analysis pipelines, including currency rounding, decimal conversion and
//! evenly spaced sampling grids.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a decimal bound or rate to `f64` for the numerical routines.
///
/// Every `Decimal` fits in an `f64` (with rounding), so the NaN fallback is
/// never reached in practice.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Returns `count` evenly spaced values from `start` to `end` inclusive.
///
/// The last value is exactly `end`. A count of one yields `[start]` and a count
/// of zero yields an empty vector.
///
/// # Examples
///
/// ```
/// use tax_core::calculations::common::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
pub fn linspace(
    start: f64,
    end: f64,
    count: usize,
) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            values[count - 1] = end;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    #[test]
    fn round_half_up_handles_zero() {
        let result = round_half_up(dec!(0.00));

        assert_eq!(result, dec!(0.00));
    }

    // =========================================================================
    // to_f64 tests
    // =========================================================================

    #[test]
    fn to_f64_converts_rates_and_bounds() {
        assert_eq!(to_f64(dec!(0.37)), 0.37);
        assert_eq!(to_f64(dec!(110400)), 110_400.0);
    }

    // =========================================================================
    // linspace tests
    // =========================================================================

    #[test]
    fn linspace_includes_both_ends() {
        let values = linspace(1.0, 500_000.0, 2000);

        assert_eq!(values.len(), 2000);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1999], 500_000.0);
    }

    #[test]
    fn linspace_is_evenly_spaced() {
        let values = linspace(3000.0, 10_500.0, 4);

        assert_eq!(values, vec![3000.0, 5500.0, 8000.0, 10_500.0]);
    }

    #[test]
    fn linspace_handles_degenerate_counts() {
        assert_eq!(linspace(2.0, 5.0, 0), Vec::<f64>::new());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
    }
}
