//! Schedule evaluators built from band tables.
//!
//! Two evaluators cover the Zambian schedules:
//!
//! - [`RateSchedule`] looks up the rate of the band containing a value. The
//!   copper royalty and the PAYE effective-rate lookup are rate schedules.
//! - [`ProgressiveSchedule`] accumulates `rate × slice` over every bracket below
//!   an income, which is how PAYE tax owed is computed.
//!
//! Both implement [`Schedule`], the `f64 → f64` view used by the smoother,
//! differentiator and root finder. Exact currency amounts are available
//! through the `Decimal` methods.
//!
//! # Example
//!
//! ```
//! use approx::assert_relative_eq;
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{ProgressiveSchedule, Schedule};
//! use tax_core::tables::paye_brackets_2025;
//!
//! let paye = ProgressiveSchedule::new(paye_brackets_2025());
//!
//! // 61,200 × 0% + 24,000 × 20%
//! assert_eq!(paye.tax_owed(dec!(85200)), dec!(4800.00));
//! assert_relative_eq!(paye.evaluate(85_200.0), 4_800.0, epsilon = 1e-9);
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::{round_half_up, to_f64};
use crate::models::BandTable;

/// A pure mapping from income or price to a tax amount or rate.
pub trait Schedule {
    fn evaluate(
        &self,
        value: f64,
    ) -> f64;

    /// Evaluates the schedule at every point of `values`.
    fn sample(
        &self,
        values: &[f64],
    ) -> Vec<f64> {
        values.iter().map(|&value| self.evaluate(value)).collect()
    }
}

impl<S: Schedule + ?Sized> Schedule for &S {
    fn evaluate(
        &self,
        value: f64,
    ) -> f64 {
        (**self).evaluate(value)
    }
}

/// `(upper, rate)` pairs in `f64`, the unbounded band carrying `+∞`.
fn numeric_bands(table: &BandTable) -> Vec<(f64, f64)> {
    table
        .bands()
        .iter()
        .map(|band| {
            let upper = band.upper.map_or(f64::INFINITY, to_f64);
            (upper, to_f64(band.rate))
        })
        .collect()
}

/// Rate lookup: the rate of the first band containing the value.
#[derive(Debug, Clone)]
pub struct RateSchedule {
    table: BandTable,
    bands: Vec<(f64, f64)>,
}

impl RateSchedule {
    pub fn new(table: BandTable) -> Self {
        let bands = numeric_bands(&table);
        Self { table, bands }
    }

    pub fn table(&self) -> &BandTable {
        &self.table
    }

    /// Rate of the band containing `value`.
    ///
    /// Values beyond every finite bound (or NaN) fall back to the last band.
    /// Values below zero fall in the first band.
    pub fn rate(
        &self,
        value: f64,
    ) -> f64 {
        let bound = self.table.upper_bound();
        self.bands
            .iter()
            .find(|&&(upper, _)| bound.contains(value, upper))
            .or(self.bands.last())
            .map_or(0.0, |&(_, rate)| rate)
    }

    /// Exact rate of the band containing `value`.
    pub fn rate_at(
        &self,
        value: Decimal,
    ) -> Decimal {
        let bound = self.table.upper_bound();
        self.table
            .bands()
            .iter()
            .find(|band| band.upper.is_none_or(|upper| bound.contains(value, upper)))
            .map_or(Decimal::ZERO, |band| band.rate)
    }
}

impl Schedule for RateSchedule {
    fn evaluate(
        &self,
        value: f64,
    ) -> f64 {
        self.rate(value)
    }
}

/// Progressive marginal-bracket tax: each bracket taxes only the slice of
/// income that falls inside it.
#[derive(Debug, Clone)]
pub struct ProgressiveSchedule {
    table: BandTable,
    bands: Vec<(f64, f64)>,
}

impl ProgressiveSchedule {
    pub fn new(table: BandTable) -> Self {
        let bands = numeric_bands(&table);
        Self { table, bands }
    }

    pub fn table(&self) -> &BandTable {
        &self.table
    }

    /// Tax owed on `income`. Non-positive income owes nothing.
    pub fn tax(
        &self,
        income: f64,
    ) -> f64 {
        if income <= 0.0 {
            return 0.0;
        }

        let mut tax = 0.0;
        let mut previous = 0.0;
        for &(limit, rate) in &self.bands {
            if income > limit {
                tax += (limit - previous) * rate;
                previous = limit;
            } else {
                tax += (income - previous) * rate;
                break;
            }
        }
        tax
    }

    /// Exact tax owed on `income`, rounded half-up to two decimal places.
    pub fn tax_owed(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut tax = Decimal::ZERO;
        let mut previous = Decimal::ZERO;
        for band in self.table.bands() {
            match band.upper {
                Some(limit) if income > limit => {
                    tax += (limit - previous) * band.rate;
                    previous = limit;
                }
                _ => {
                    tax += (income - previous) * band.rate;
                    break;
                }
            }
        }
        round_half_up(tax)
    }

    /// Average rate, `tax / income`, zero for non-positive income.
    pub fn effective_rate(
        &self,
        income: f64,
    ) -> f64 {
        if income > 0.0 {
            self.tax(income) / income
        } else {
            0.0
        }
    }

    /// Statutory rate applied to the next unit of `income`.
    pub fn marginal_rate(
        &self,
        income: f64,
    ) -> f64 {
        self.bands
            .iter()
            .find(|&&(limit, _)| income <= limit)
            .or(self.bands.last())
            .map_or(0.0, |&(_, rate)| rate)
    }
}

impl Schedule for ProgressiveSchedule {
    fn evaluate(
        &self,
        value: f64,
    ) -> f64 {
        self.tax(value)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::tables::{copper_royalty_bands, paye_brackets_2025, paye_effective_rates};

    fn paye() -> ProgressiveSchedule {
        ProgressiveSchedule::new(paye_brackets_2025())
    }

    fn copper() -> RateSchedule {
        RateSchedule::new(copper_royalty_bands())
    }

    // =========================================================================
    // ProgressiveSchedule::tax_owed tests
    // =========================================================================

    #[test]
    fn tax_owed_is_zero_at_zero_income() {
        assert_eq!(paye().tax_owed(dec!(0)), dec!(0));
    }

    #[test]
    fn tax_owed_is_zero_inside_exempt_band() {
        assert_eq!(paye().tax_owed(dec!(61200)), dec!(0.00));
    }

    #[test]
    fn tax_owed_at_second_bracket_boundary() {
        // 61,200 × 0 + 24,000 × 0.20
        assert_eq!(paye().tax_owed(dec!(85200)), dec!(4800.00));
    }

    #[test]
    fn tax_owed_at_third_bracket_boundary() {
        // 4,800 + 25,200 × 0.30
        assert_eq!(paye().tax_owed(dec!(110400)), dec!(12360.00));
    }

    #[test]
    fn tax_owed_in_top_bracket() {
        // 12,360 + 89,600 × 0.37 = 12,360 + 33,152
        assert_eq!(paye().tax_owed(dec!(200000)), dec!(45512.00));
    }

    #[test]
    fn tax_owed_rounds_to_ngwee() {
        // 0.01 × 0.20 = 0.002 → 0.00
        assert_eq!(paye().tax_owed(dec!(61200.01)), dec!(0.00));
        // 0.03 × 0.20 = 0.006 → 0.01
        assert_eq!(paye().tax_owed(dec!(61200.03)), dec!(0.01));
    }

    #[test]
    fn tax_owed_is_zero_for_negative_income() {
        assert_eq!(paye().tax_owed(dec!(-500)), dec!(0));
    }

    // =========================================================================
    // ProgressiveSchedule::tax tests
    // =========================================================================

    #[test]
    fn tax_matches_decimal_at_boundaries() {
        let paye = paye();

        assert_relative_eq!(paye.tax(85_200.0), 4_800.0, epsilon = 1e-9);
        assert_relative_eq!(paye.tax(110_400.0), 12_360.0, epsilon = 1e-9);
        assert_relative_eq!(paye.tax(200_000.0), 45_512.0, epsilon = 1e-9);
    }

    #[test]
    fn tax_is_continuous_across_bracket_edges() {
        let paye = paye();

        for edge in [61_200.0, 85_200.0, 110_400.0] {
            let below = paye.tax(edge - 1e-6);
            let above = paye.tax(edge + 1e-6);
            assert_relative_eq!(above, below, epsilon = 1e-5);
        }
    }

    #[test]
    fn effective_rate_approaches_top_rate() {
        let paye = paye();

        assert_eq!(paye.effective_rate(0.0), 0.0);
        assert_relative_eq!(paye.effective_rate(200_000.0), 0.22756, epsilon = 1e-9);
        assert!(paye.effective_rate(1e9) < 0.37);
    }

    #[test]
    fn marginal_rate_uses_inclusive_bounds() {
        let paye = paye();

        assert_eq!(paye.marginal_rate(61_200.0), 0.0);
        assert_eq!(paye.marginal_rate(61_200.5), 0.20);
        assert_eq!(paye.marginal_rate(1e7), 0.37);
    }

    // =========================================================================
    // RateSchedule tests
    // =========================================================================

    #[test]
    fn copper_rate_switches_at_band_edge() {
        let copper = copper();

        assert_eq!(copper.rate(4_500.0), 0.065);
        assert_eq!(copper.rate(4_499.99), 0.055);
    }

    #[test]
    fn copper_rate_matches_every_band() {
        let copper = copper();

        assert_eq!(copper.rate(0.0), 0.055);
        assert_eq!(copper.rate(5_999.0), 0.065);
        assert_eq!(copper.rate(6_000.0), 0.075);
        assert_eq!(copper.rate(7_500.0), 0.085);
        assert_eq!(copper.rate(9_000.0), 0.10);
    }

    #[test]
    fn copper_rate_falls_back_to_last_band() {
        let copper = copper();

        assert_eq!(copper.rate(1e12), 0.10);
        assert_eq!(copper.rate(f64::INFINITY), 0.10);
    }

    #[test]
    fn rate_at_is_exact() {
        let copper = copper();

        assert_eq!(copper.rate_at(dec!(4499.99)), dec!(0.055));
        assert_eq!(copper.rate_at(dec!(4500)), dec!(0.065));
        assert_eq!(copper.rate_at(dec!(20000)), dec!(0.10));
    }

    #[test]
    fn paye_lookup_uses_inclusive_bounds() {
        let lookup = RateSchedule::new(paye_effective_rates());

        assert_eq!(lookup.rate(61_200.0), 0.0);
        assert_eq!(lookup.rate(61_200.01), 0.10);
        assert_eq!(lookup.rate(248_000.0), 0.25);
        assert_eq!(lookup.rate(248_000.5), 0.30);
    }

    #[test]
    fn sample_evaluates_each_point() {
        let copper = copper();

        assert_eq!(copper.sample(&[3_000.0, 9_500.0]), vec![0.055, 0.10]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn income_strategy() -> impl Strategy<Value = f64> {
            0.0..1e6
        }

        // Copper band edges paired with the rates just below and from the edge up.
        fn copper_edge_strategy() -> impl Strategy<Value = (f64, f64, f64)> {
            prop::sample::select(vec![
                (4_500.0, 0.055, 0.065),
                (6_000.0, 0.065, 0.075),
                (7_500.0, 0.075, 0.085),
                (9_000.0, 0.085, 0.10),
            ])
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(1000))]

            #[test]
            fn test_tax_is_lipschitz_in_top_rate(
                income in income_strategy(),
                step in 0.0..1e-3f64
            ) {
                let paye = paye();
                let change = (paye.tax(income + step) - paye.tax(income)).abs();

                assert!(
                    change <= 0.37 * step + 1e-6,
                    "tax jumps by {} over [{}, {}]",
                    change,
                    income,
                    income + step
                );
            }

            #[test]
            fn test_tax_is_non_decreasing(
                a in income_strategy(),
                b in income_strategy()
            ) {
                let paye = paye();
                let (low, high) = (a.min(b), a.max(b));

                assert!(
                    paye.tax(low) <= paye.tax(high) + 1e-9,
                    "tax({}) = {} exceeds tax({}) = {}",
                    low,
                    paye.tax(low),
                    high,
                    paye.tax(high)
                );
            }

            #[test]
            fn test_copper_rate_steps_at_band_edges(
                (edge, below, above) in copper_edge_strategy(),
                delta in 1e-6..100.0f64
            ) {
                let copper = copper();

                prop_assert_eq!(copper.rate(edge - delta), below);
                prop_assert_eq!(copper.rate(edge), above);
                prop_assert_eq!(copper.rate(edge + delta), above);
            }
        }
    }
}
