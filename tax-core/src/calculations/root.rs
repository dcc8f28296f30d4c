//! Sign-change bracketing with bisection refinement.
//!
//! The conditions solved here are themselves built from smoothed schedules and
//! finite differences, so each evaluation is comparatively expensive and
//! slightly noisy. The solver therefore scans a coarse grid for the first
//! bracket and bisects inside it; it never differentiates the condition.
//!
//! # Example
//!
//! ```
//! use approx::assert_relative_eq;
//! use tax_core::calculations::BracketingSolver;
//!
//! let solver = BracketingSolver::with_defaults();
//!
//! let root = solver.find_root(|x| x - 100.0, 0.0, 200.0).unwrap();
//! assert_relative_eq!(root.unwrap(), 100.0, epsilon = 1e-4);
//!
//! let none = solver.find_root(|x| x + 1.0, 0.0, 10.0).unwrap();
//! assert_eq!(none, None);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::calculations::common::linspace;
use crate::calculations::derivative::central_difference;

/// Errors raised for solver settings or search intervals that cannot work.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolverError {
    #[error("search interval [{lo}, {hi}] is empty or not finite")]
    InvalidInterval { lo: f64, hi: f64 },

    #[error("at least 2 scan steps are required, got {0}")]
    TooFewSteps(usize),

    #[error("tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
}

/// Settings for [`BracketingSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketingSolverConfig {
    /// Number of evenly spaced points scanned for a sign change.
    pub steps: usize,

    /// Upper limit on bisection halvings inside the first bracket.
    pub max_bisections: usize,

    /// Bisection stops early once `|condition(mid)|` falls below this.
    pub tolerance: f64,
}

impl Default for BracketingSolverConfig {
    fn default() -> Self {
        Self {
            steps: 3_000,
            max_bisections: 40,
            tolerance: 1e-6,
        }
    }
}

impl BracketingSolverConfig {
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.steps < 2 {
            return Err(SolverError::TooFewSteps(self.steps));
        }
        if !(self.tolerance > 0.0) {
            return Err(SolverError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Finds the lowest root of a condition over an interval.
#[derive(Debug, Clone)]
pub struct BracketingSolver {
    config: BracketingSolverConfig,
}

impl BracketingSolver {
    /// Creates a solver after validating `config`.
    pub fn new(config: BracketingSolverConfig) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates a solver with the default 3,000-step scan and 40 bisections.
    pub fn with_defaults() -> Self {
        Self {
            config: BracketingSolverConfig::default(),
        }
    }

    pub fn config(&self) -> &BracketingSolverConfig {
        &self.config
    }

    /// Finds the lowest `x` in `[lo, hi]` where `condition` crosses zero.
    ///
    /// The interval is scanned left to right; the first pair of samples where
    /// the left value is exactly zero or the two values differ in sign is
    /// refined by bisection and every later bracket is ignored.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(x))` - approximate root
    /// * `Ok(None)` - the condition never changes sign on the scan grid
    /// * `Err(SolverError::InvalidInterval)` - `lo >= hi` or a bound is not finite
    pub fn find_root<F>(
        &self,
        condition: F,
        lo: f64,
        hi: f64,
    ) -> Result<Option<f64>, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(SolverError::InvalidInterval { lo, hi });
        }

        let mut grid = linspace(lo, hi, self.config.steps).into_iter();
        let Some(mut left) = grid.next() else {
            return Ok(None);
        };
        let mut f_left = condition(left);

        for right in grid {
            let f_right = condition(right);
            if f_left == 0.0 || f_left * f_right < 0.0 {
                debug!(left, right, f_left, f_right, "sign change bracketed");
                return Ok(Some(self.bisect(&condition, left, right, f_left)));
            }
            left = right;
            f_left = f_right;
        }

        debug!(lo, hi, steps = self.config.steps, "no sign change found");
        Ok(None)
    }

    fn bisect<F>(
        &self,
        condition: &F,
        mut a: f64,
        mut b: f64,
        mut f_a: f64,
    ) -> f64
    where
        F: Fn(f64) -> f64,
    {
        for iteration in 0..self.config.max_bisections {
            let mid = (a + b) / 2.0;
            let f_mid = condition(mid);
            trace!(iteration, a, b, mid, f_mid, "bisection step");

            if f_mid.abs() < self.config.tolerance {
                return mid;
            }
            if f_a * f_mid <= 0.0 {
                b = mid;
            } else {
                a = mid;
                f_a = f_mid;
            }
        }
        (a + b) / 2.0
    }
}

/// `x·f'(x) − f(x)`: zero where the marginal value of `f` equals its average.
///
/// `f'` is estimated with [`central_difference`] using half-step `h`.
pub fn marginal_condition<F>(
    f: F,
    x: f64,
    h: f64,
) -> f64
where
    F: Fn(f64) -> f64,
{
    x * central_difference(&f, x, h) - f(x)
}
