//! End-to-end analyses of the Zambian schedules.
//!
//! Each analysis follows the same shape: a serde-friendly config with defaults
//! and a `validate` method, an analysis value built from a band table and the
//! config, and a `run` method returning plain sample curves plus the located
//! point of interest. The results carry no presentation concerns; charting and
//! formatting are left to consumers such as the `zambia-tax` binary.
//!
//! | Analysis | Input table | Point of interest |
//! |----------|-------------|-------------------|
//! | [`PayeAnalysis`] | PAYE marginal brackets | root of the smoothed marginal condition |
//! | [`DiscretePayeAnalysis`] | PAYE effective-rate lookup | slope downturn above a threshold |
//! | [`RoyaltyAnalysis`] | copper royalty bands | peak of smoothed royalty revenue |

pub mod paye;
pub mod royalty;

pub use paye::{
    DiscretePayeAnalysis, DiscretePayeConfig, DiscretePayeResult, PayeAnalysis,
    PayeAnalysisConfig, PayeAnalysisResult, PayeMarginalPoint,
};
pub use royalty::{
    Production, ProductionError, RevenuePeak, RoyaltyAnalysis, RoyaltyAnalysisConfig,
    RoyaltyAnalysisResult,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{linspace, to_f64};
use crate::calculations::{SmoothingError, SolverError};
use crate::models::{BandTable, CurveError};

/// Errors raised while configuring or running an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AnalysisError {
    #[error("sample grid [{start}, {end}] with {samples} samples is invalid")]
    InvalidGrid { start: f64, end: f64, samples: usize },

    #[error("derivative step must be positive, got {0}")]
    InvalidStep(f64),

    #[error("{name} must be a finite income, got {value}")]
    NonFiniteIncome { name: &'static str, value: f64 },

    #[error(transparent)]
    Smoothing(#[from] SmoothingError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Curve(#[from] CurveError),
}

/// Rejects a NaN or infinite income setting.
fn check_finite(
    name: &'static str,
    value: f64,
) -> Result<(), AnalysisError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnalysisError::NonFiniteIncome { name, value })
    }
}

/// Evenly spaced sample points from `start` to `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleGrid {
    pub start: f64,
    pub end: f64,
    pub samples: usize,
}

impl SampleGrid {
    pub fn new(
        start: f64,
        end: f64,
        samples: usize,
    ) -> Self {
        Self {
            start,
            end,
            samples,
        }
    }

    /// A grid needs finite, increasing ends and at least two samples.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let ends_ok = self.start.is_finite() && self.end.is_finite() && self.start < self.end;
        if !ends_ok || self.samples < 2 {
            return Err(AnalysisError::InvalidGrid {
                start: self.start,
                end: self.end,
                samples: self.samples,
            });
        }
        Ok(())
    }

    pub fn points(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.samples)
    }
}

/// Horizontal extent and height of one band, ready for shading on a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandSpan {
    pub lower: f64,
    pub upper: f64,
    pub rate: f64,
}

/// Band spans with the unbounded top band (and any band reaching past the axis)
/// clipped to `ceiling`. Bands starting at or above the ceiling are dropped.
pub fn band_spans(
    table: &BandTable,
    ceiling: f64,
) -> Vec<BandSpan> {
    table
        .intervals()
        .map(|interval| BandSpan {
            lower: to_f64(interval.lower),
            upper: interval.upper.map_or(ceiling, |upper| to_f64(upper).min(ceiling)),
            rate: to_f64(interval.rate),
        })
        .filter(|span| span.lower < ceiling)
        .collect()
}
