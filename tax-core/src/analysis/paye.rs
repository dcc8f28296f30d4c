//! PAYE analyses: the smoothed marginal-bracket pipeline and the discrete
//! effective-rate lookup pipeline.
//!
//! # Smoothed pipeline
//!
//! The statutory brackets are evaluated through a [`LocalSmoother`] so the
//! kinks at each bracket edge are rounded off. Over the income grid the
//! analysis reports tax `T(y)`, the effective rate `E(y) = T(y) / y`, and the
//! slope `E'(y)`. The marginal point is the lowest income above the exemption
//! ceiling where `y·E'(y) = E(y)`.
//!
//! For the 2025 brackets, `y·E'(y) − E(y) = (y·T'(y) − 2·T(y)) / y`, which is
//! positive through the 20% and 30% brackets and crosses zero inside the 37%
//! bracket at `56,976 / 0.37 ≈ 153,989`.
//!
//! # Example
//!
//! ```
//! use tax_core::analysis::{PayeAnalysis, PayeAnalysisConfig};
//! use tax_core::tables::paye_brackets_2025;
//!
//! let analysis = PayeAnalysis::new(paye_brackets_2025(), PayeAnalysisConfig::default()).unwrap();
//! let point = analysis.marginal_point().unwrap().unwrap();
//!
//! assert!(point.income > 110_400.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::{AnalysisError, BandSpan, SampleGrid, band_spans, check_finite};
use crate::calculations::common::to_f64;
use crate::calculations::{
    BracketingSolver, BracketingSolverConfig, DEFAULT_STEP, DEFAULT_THRESHOLD, DownturnFallback,
    LocalSmoother, ProgressiveSchedule, RateSchedule, Schedule, Smoothed, locate_marginal_point,
    marginal_condition,
};
use crate::models::{BandTable, SampleCurve};

/// Upper end of the income zoom around the exemption band.
pub const EXEMPTION_ZOOM_CEILING: f64 = 85_200.0;

/// A located PAYE marginal point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayeMarginalPoint {
    pub income: f64,
    pub effective_rate: f64,
    pub tax: f64,
}

// =============================================================================
// Smoothed pipeline
// =============================================================================

/// Settings for [`PayeAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayeAnalysisConfig {
    /// Incomes at which the curves are sampled.
    pub income_grid: SampleGrid,

    /// Local smoothing applied to the bracket schedule.
    pub smoother: LocalSmoother,

    /// Root search settings for the marginal point.
    pub solver: BracketingSolverConfig,

    /// Half-step of the central difference inside the marginal condition.
    pub derivative_step: f64,

    /// Lowest income searched. Defaults to the table's exemption ceiling, or the
    /// start of the income grid for a table without a zero-rate band.
    pub search_floor: Option<f64>,

    /// Highest income searched.
    pub search_ceiling: f64,
}

impl Default for PayeAnalysisConfig {
    fn default() -> Self {
        Self {
            income_grid: SampleGrid::new(1.0, 500_000.0, 2_000),
            smoother: LocalSmoother::default(),
            solver: BracketingSolverConfig::default(),
            derivative_step: DEFAULT_STEP,
            search_floor: None,
            search_ceiling: 1_500_000.0,
        }
    }
}

impl PayeAnalysisConfig {
    /// Validates the grid, smoother, solver and derivative step.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.income_grid.validate()?;
        self.smoother.validate()?;
        self.solver.validate()?;
        if !(self.derivative_step > 0.0 && self.derivative_step.is_finite()) {
            return Err(AnalysisError::InvalidStep(self.derivative_step));
        }
        if let Some(floor) = self.search_floor {
            check_finite("search_floor", floor)?;
        }
        check_finite("search_ceiling", self.search_ceiling)
    }
}

/// Curves and marginal point produced by [`PayeAnalysis::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayeAnalysisResult {
    /// Smoothed tax owed against income.
    pub tax: SampleCurve,

    /// Smoothed effective rate against income.
    pub effective_rate: SampleCurve,

    /// Slope of the effective rate against income.
    pub effective_rate_slope: SampleCurve,

    /// `None` when the marginal condition never changes sign.
    pub marginal_point: Option<PayeMarginalPoint>,

    /// Bracket spans clipped to the income grid.
    pub bands: Vec<BandSpan>,
}

/// The smoothed PAYE analysis over a set of marginal brackets.
#[derive(Debug, Clone)]
pub struct PayeAnalysis {
    schedule: Smoothed<ProgressiveSchedule>,
    solver: BracketingSolver,
    config: PayeAnalysisConfig,
}

impl PayeAnalysis {
    /// Builds the analysis for `brackets` after validating `config`.
    pub fn new(
        brackets: BandTable,
        config: PayeAnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        let schedule = Smoothed::new(ProgressiveSchedule::new(brackets), config.smoother)?;
        let solver = BracketingSolver::new(config.solver)?;

        Ok(Self {
            schedule,
            solver,
            config,
        })
    }

    pub fn config(&self) -> &PayeAnalysisConfig {
        &self.config
    }

    /// Smoothed tax owed on `income`.
    pub fn tax(
        &self,
        income: f64,
    ) -> f64 {
        self.schedule.evaluate(income)
    }

    /// Smoothed effective rate, zero for non-positive income.
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

    /// The `[lo, hi]` income interval searched for the marginal point.
    pub fn search_interval(&self) -> (f64, f64) {
        let floor = self.config.search_floor.unwrap_or_else(|| {
            self.schedule
                .inner()
                .table()
                .exemption_ceiling()
                .map_or(self.config.income_grid.start, to_f64)
        });
        (floor, self.config.search_ceiling)
    }

    /// Lowest income in the search interval where `y·E'(y) = E(y)`.
    ///
    /// A table whose exemption ceiling reaches `search_ceiling` leaves nothing
    /// to search and has no marginal point.
    pub fn marginal_point(&self) -> Result<Option<PayeMarginalPoint>, AnalysisError> {
        let (lo, hi) = self.search_interval();
        if lo >= hi {
            debug!(lo, hi, "empty marginal point search interval");
            return Ok(None);
        }
        let step = self.config.derivative_step;

        let root = self.solver.find_root(
            |income| marginal_condition(|y| self.effective_rate(y), income, step),
            lo,
            hi,
        )?;

        Ok(root.map(|income| PayeMarginalPoint {
            income,
            effective_rate: self.effective_rate(income),
            tax: self.tax(income),
        }))
    }

    /// Samples every curve over the income grid and locates the marginal point.
    pub fn run(&self) -> Result<PayeAnalysisResult, AnalysisError> {
        let grid = self.config.income_grid;
        let incomes = grid.points();
        debug!(
            start = grid.start,
            end = grid.end,
            samples = grid.samples,
            "sampling smoothed PAYE"
        );

        let tax = SampleCurve::new(incomes.clone(), self.schedule.sample(&incomes))?;
        let rates = tax
            .points()
            .map(|(income, tax)| if income > 0.0 { tax / income } else { 0.0 })
            .collect();
        let effective_rate = SampleCurve::new(incomes.clone(), rates)?;
        let effective_rate_slope = SampleCurve::new(incomes, effective_rate.gradient()?)?;

        let marginal_point = self.marginal_point()?;
        match &marginal_point {
            Some(point) => info!(
                income = point.income,
                effective_rate = point.effective_rate,
                "PAYE marginal point located"
            ),
            None => info!("no PAYE marginal point in search interval"),
        }

        Ok(PayeAnalysisResult {
            tax,
            effective_rate,
            effective_rate_slope,
            marginal_point,
            bands: band_spans(self.schedule.inner().table(), grid.end),
        })
    }
}

// =============================================================================
// Discrete pipeline
// =============================================================================

/// Settings for [`DiscretePayeAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscretePayeConfig {
    pub income_grid: SampleGrid,

    /// Only incomes above this take part in the marginal point search.
    pub threshold: f64,

    /// Upper end of the zoomed view around the exemption band.
    pub zoom_ceiling: f64,

    pub fallback: DownturnFallback,
}

impl Default for DiscretePayeConfig {
    fn default() -> Self {
        Self {
            income_grid: SampleGrid::new(0.0, 500_000.0, 5_000),
            threshold: DEFAULT_THRESHOLD,
            zoom_ceiling: EXEMPTION_ZOOM_CEILING,
            fallback: DownturnFallback::default(),
        }
    }
}

impl DiscretePayeConfig {
    /// Validates the grid and requires finite threshold and zoom ceiling.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.income_grid.validate()?;
        check_finite("threshold", self.threshold)?;
        check_finite("zoom_ceiling", self.zoom_ceiling)
    }
}

/// Curves and marginal point produced by [`DiscretePayeAnalysis::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscretePayeResult {
    /// Looked-up effective rate against income.
    pub effective_rate: SampleCurve,

    /// `income × effective rate` against income.
    pub effective_tax: SampleCurve,

    /// Effective rate for incomes up to the zoom ceiling.
    pub zoomed: SampleCurve,

    pub marginal_point: Option<PayeMarginalPoint>,
}

/// The PAYE analysis over a flat effective-rate lookup table.
#[derive(Debug, Clone)]
pub struct DiscretePayeAnalysis {
    lookup: RateSchedule,
    config: DiscretePayeConfig,
}

impl DiscretePayeAnalysis {
    pub fn new(
        effective_rates: BandTable,
        config: DiscretePayeConfig,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            lookup: RateSchedule::new(effective_rates),
            config,
        })
    }

    pub fn config(&self) -> &DiscretePayeConfig {
        &self.config
    }

    pub fn run(&self) -> Result<DiscretePayeResult, AnalysisError> {
        let incomes = self.config.income_grid.points();
        let effective_rate = SampleCurve::new(incomes.clone(), self.lookup.sample(&incomes))?;
        let taxes = effective_rate.points().map(|(income, rate)| income * rate).collect();
        let effective_tax = SampleCurve::new(incomes, taxes)?;

        let zoom_ceiling = self.config.zoom_ceiling;
        let zoomed = effective_rate.filter_x(|income| income <= zoom_ceiling);

        let located = locate_marginal_point(
            effective_rate.x(),
            effective_rate.y(),
            self.config.threshold,
            self.config.fallback,
        )?;
        let marginal_point = located.map(|point| PayeMarginalPoint {
            income: point.x,
            effective_rate: point.y,
            tax: point.x * point.y,
        });
        debug!(?marginal_point, threshold = self.config.threshold, "discrete PAYE analysed");

        Ok(DiscretePayeResult {
            effective_rate,
            effective_tax,
            zoomed,
            marginal_point,
        })
    }
}
