//! Copper royalty revenue analysis.
//!
//! The statutory royalty is a step function of the copper price. The analysis
//! samples it over a price grid, Gaussian-smooths the sampled rates into a
//! continuous schedule, and compares the royalty revenue `production × price ×
//! rate` under both. The point of interest is the price at which revenue under
//! the smoothed schedule peaks.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::{AnalysisError, BandSpan, SampleGrid, band_spans};
use crate::calculations::{RateSchedule, Schedule, SmoothingError, gaussian_filter};
use crate::models::{BandTable, SampleCurve};

/// Raised for a production volume outside the supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("copper production must be between {min} and {max} tonnes, got {tonnes}")]
pub struct ProductionError {
    pub tonnes: u32,
    pub min: u32,
    pub max: u32,
}

/// Annual copper production in tonnes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Production(u32);

impl Production {
    pub const MIN: u32 = 10_000;
    pub const MAX: u32 = 1_000_000;

    /// Increment between the volumes offered to users.
    pub const STEP: u32 = 10_000;

    pub fn new(tonnes: u32) -> Result<Self, ProductionError> {
        if (Self::MIN..=Self::MAX).contains(&tonnes) {
            Ok(Self(tonnes))
        } else {
            Err(ProductionError {
                tonnes,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn tonnes(self) -> u32 {
        self.0
    }
}

impl Default for Production {
    fn default() -> Self {
        Self(50_000)
    }
}

impl TryFrom<u32> for Production {
    type Error = ProductionError;

    fn try_from(tonnes: u32) -> Result<Self, Self::Error> {
        Self::new(tonnes)
    }
}

impl From<Production> for u32 {
    fn from(production: Production) -> Self {
        production.0
    }
}

impl fmt::Display for Production {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} t", self.0)
    }
}

/// Settings for [`RoyaltyAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoyaltyAnalysisConfig {
    /// Copper prices (USD/tonne) at which the schedule is sampled.
    pub price_grid: SampleGrid,

    /// Standard deviation of the Gaussian smoothing, in grid samples.
    pub sigma: f64,
}

impl Default for RoyaltyAnalysisConfig {
    fn default() -> Self {
        Self {
            price_grid: SampleGrid::new(3_000.0, 10_500.0, 1_000),
            sigma: 20.0,
        }
    }
}

impl RoyaltyAnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.price_grid.validate()?;
        if !(self.sigma >= 0.0 && self.sigma.is_finite()) {
            return Err(SmoothingError::InvalidSigma(self.sigma).into());
        }
        Ok(())
    }
}

/// Price at which smoothed royalty revenue is highest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenuePeak {
    pub price: f64,
    pub revenue: f64,
}

/// Curves and revenue peak produced by [`RoyaltyAnalysis::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoyaltyAnalysisResult {
    pub production: Production,

    /// Statutory step rate against price.
    pub step_rate: SampleCurve,

    /// Gaussian-smoothed rate against price.
    pub smoothed_rate: SampleCurve,

    pub step_revenue: SampleCurve,
    pub smoothed_revenue: SampleCurve,

    /// `None` only when every smoothed revenue sample is NaN.
    pub peak: Option<RevenuePeak>,

    /// Royalty bands clipped to the price grid.
    pub bands: Vec<BandSpan>,
}

/// Royalty revenue analysis over a copper royalty band table.
#[derive(Debug, Clone)]
pub struct RoyaltyAnalysis {
    royalty: RateSchedule,
    config: RoyaltyAnalysisConfig,
}

impl RoyaltyAnalysis {
    pub fn new(
        royalty_bands: BandTable,
        config: RoyaltyAnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            royalty: RateSchedule::new(royalty_bands),
            config,
        })
    }

    pub fn config(&self) -> &RoyaltyAnalysisConfig {
        &self.config
    }

    /// Samples both schedules and revenues for `production` and finds the peak.
    pub fn run(
        &self,
        production: Production,
    ) -> Result<RoyaltyAnalysisResult, AnalysisError> {
        let prices = self.config.price_grid.points();
        let tonnes = f64::from(production.tonnes());
        debug!(%production, sigma = self.config.sigma, "sampling copper royalty");

        let step_rates = self.royalty.sample(&prices);
        let smoothed_rates = gaussian_filter(&step_rates, self.config.sigma)?;

        let revenue = |rates: &[f64]| -> Vec<f64> {
            prices
                .iter()
                .zip(rates)
                .map(|(price, rate)| tonnes * price * rate)
                .collect()
        };
        let step_revenue = SampleCurve::new(prices.clone(), revenue(&step_rates))?;
        let smoothed_revenue = SampleCurve::new(prices.clone(), revenue(&smoothed_rates))?;

        let peak = smoothed_revenue.argmax().map(|index| RevenuePeak {
            price: smoothed_revenue.x()[index],
            revenue: smoothed_revenue.y()[index],
        });
        if let Some(peak) = &peak {
            info!(price = peak.price, revenue = peak.revenue, "royalty revenue peak");
        }

        Ok(RoyaltyAnalysisResult {
            production,
            step_rate: SampleCurve::new(prices.clone(), step_rates)?,
            smoothed_rate: SampleCurve::new(prices, smoothed_rates)?,
            step_revenue,
            smoothed_revenue,
            peak,
            bands: band_spans(self.royalty.table(), self.config.price_grid.end),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tables::copper_royalty_bands;

    fn analysis() -> RoyaltyAnalysis {
        RoyaltyAnalysis::new(copper_royalty_bands(), RoyaltyAnalysisConfig::default()).unwrap()
    }

    // =========================================================================
    // Production tests
    // =========================================================================

    #[test]
    fn production_accepts_bounds() {
        assert_eq!(Production::new(10_000).unwrap().tonnes(), 10_000);
        assert_eq!(Production::new(1_000_000).unwrap().tonnes(), 1_000_000);
        assert_eq!(Production::default().tonnes(), 50_000);
    }

    #[test]
    fn production_rejects_out_of_range() {
        assert_eq!(
            Production::new(9_999),
            Err(ProductionError {
                tonnes: 9_999,
                min: 10_000,
                max: 1_000_000,
            })
        );
        assert!(Production::try_from(1_000_001).is_err());
    }

    #[test]
    fn production_displays_tonnes() {
        assert_eq!(Production::new(250_000).unwrap().to_string(), "250000 t");
    }

    // =========================================================================
    // RoyaltyAnalysisConfig tests
    // =========================================================================

    #[test]
    fn config_rejects_negative_sigma() {
        let config = RoyaltyAnalysisConfig {
            sigma: -1.0,
            ..RoyaltyAnalysisConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(AnalysisError::Smoothing(SmoothingError::InvalidSigma(-1.0)))
        );
    }

    // =========================================================================
    // RoyaltyAnalysis tests
    // =========================================================================

    #[test]
    fn peak_sits_at_top_of_price_range() {
        let production = Production::new(50_000).unwrap();

        let result = analysis().run(production).unwrap();
        let peak = result.peak.unwrap();

        // The top band is 10% well beyond the kernel radius, so revenue keeps rising.
        assert_eq!(peak.price, 10_500.0);
        assert_relative_eq!(peak.revenue, 50_000.0 * 10_500.0 * 0.10, epsilon = 1e-3);
    }

    #[test]
    fn revenue_scales_with_production() {
        let small = analysis().run(Production::new(10_000).unwrap()).unwrap();
        let large = analysis().run(Production::new(20_000).unwrap()).unwrap();

        for (a, b) in small.step_revenue.y().iter().zip(large.step_revenue.y()) {
            assert_relative_eq!(2.0 * a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn smoothed_rate_stays_within_band_rates() {
        let result = analysis().run(Production::default()).unwrap();

        assert_eq!(result.smoothed_rate.len(), 1_000);
        for &rate in result.smoothed_rate.y() {
            assert!((0.055 - 1e-12..=0.10 + 1e-12).contains(&rate));
        }
        // Gaussian smoothing blurs the 4,500 step.
        let near_edge = result
            .smoothed_rate
            .points()
            .find(|&(price, _)| price >= 4_500.0)
            .map(|(_, rate)| rate)
            .unwrap();
        assert!(near_edge > 0.055 && near_edge < 0.065);
    }

    #[test]
    fn step_rate_matches_schedule() {
        let result = analysis().run(Production::default()).unwrap();

        assert_eq!(result.step_rate.y()[0], 0.055);
        assert_eq!(result.step_rate.y()[999], 0.10);
        assert_eq!(result.bands.len(), 5);
        assert_eq!(result.bands[4].upper, 10_500.0);
    }
}
