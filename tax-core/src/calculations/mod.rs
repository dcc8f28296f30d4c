//! Numerical routines over tax and royalty schedules.
//!
//! The modules build on each other from the bottom up: schedules are evaluated
//! from band tables, smoothed, differentiated, and finally searched for roots or
//! slope inflections.

pub mod common;
pub mod derivative;
pub mod marginal;
pub mod root;
pub mod schedule;
pub mod smoothing;

pub use derivative::{DEFAULT_STEP, central_difference, gradient};
pub use marginal::{DEFAULT_THRESHOLD, DownturnFallback, locate_marginal_point};
pub use root::{BracketingSolver, BracketingSolverConfig, SolverError, marginal_condition};
pub use schedule::{ProgressiveSchedule, RateSchedule, Schedule};
pub use smoothing::{LocalSmoother, Smoothed, SmoothingError, gaussian_filter, moving_average};
