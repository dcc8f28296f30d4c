//! Smoothing of step schedules into continuous approximations.
//!
//! Two smoothers are provided:
//!
//! - [`LocalSmoother`] re-samples a function on a fresh window around each query
//!   point and runs a uniform moving average over the samples. Wrapping a
//!   schedule in [`Smoothed`] gives a [`Schedule`] that the differentiator and
//!   root finder can work on without tripping over bracket kinks.
//! - [`gaussian_filter`] convolves an already-sampled series with a truncated
//!   Gaussian kernel, reflecting the series at both ends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::linspace;
use crate::calculations::schedule::Schedule;

/// Width of the uniform moving-average kernel used by [`LocalSmoother`].
pub const MOVING_AVERAGE_WIDTH: usize = 10;

/// The Gaussian kernel is cut off this many standard deviations from its centre.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Errors raised for invalid smoothing settings.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SmoothingError {
    #[error("smoothing window must be positive, got {0}")]
    InvalidWindow(f64),

    #[error("moving-average kernel width must be at least 1")]
    ZeroKernelWidth,

    #[error("{samples} samples cannot fill a moving-average kernel of width {kernel_width}")]
    TooFewSamples { samples: usize, kernel_width: usize },

    #[error("domain floor must be positive, got {0}")]
    InvalidFloor(f64),

    #[error("gaussian sigma must be finite and non-negative, got {0}")]
    InvalidSigma(f64),
}

/// Moving-average smoothing over a local window around each query point.
///
/// For a query `x` the wrapped function is sampled at `samples` evenly spaced
/// points in `[max(floor, x - window), x + window]`, the samples are passed
/// through [`moving_average`] and the value at the middle index is returned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSmoother {
    /// Half-width of the sampling window.
    pub window: f64,

    /// Number of samples taken across the window.
    pub samples: usize,

    /// Width of the uniform moving-average kernel.
    pub kernel_width: usize,

    /// Lowest point ever sampled; keeps the window off zero and negative income.
    pub floor: f64,
}

impl Default for LocalSmoother {
    fn default() -> Self {
        Self {
            window: 2_000.0,
            samples: 120,
            kernel_width: MOVING_AVERAGE_WIDTH,
            floor: 1.0,
        }
    }
}

impl LocalSmoother {
    /// Validates the smoother settings.
    ///
    /// # Errors
    ///
    /// Returns [`SmoothingError`] if the window or floor is not positive, the
    /// kernel width is zero, or there are fewer samples than the kernel is wide.
    pub fn validate(&self) -> Result<(), SmoothingError> {
        if !(self.window > 0.0 && self.window.is_finite()) {
            return Err(SmoothingError::InvalidWindow(self.window));
        }
        if self.kernel_width == 0 {
            return Err(SmoothingError::ZeroKernelWidth);
        }
        if self.samples < self.kernel_width {
            return Err(SmoothingError::TooFewSamples {
                samples: self.samples,
                kernel_width: self.kernel_width,
            });
        }
        if !(self.floor > 0.0 && self.floor.is_finite()) {
            return Err(SmoothingError::InvalidFloor(self.floor));
        }
        Ok(())
    }

    /// Smoothed value of `f` at `x`.
    pub fn smooth_one<F>(
        &self,
        f: F,
        x: f64,
    ) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let low = (x - self.window).max(self.floor);
        let high = x + self.window;

        let values: Vec<f64> = linspace(low, high, self.samples)
            .into_iter()
            .map(&f)
            .collect();
        let smoothed = moving_average(&values, self.kernel_width);

        smoothed
            .get(smoothed.len() / 2)
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Smoothed values of `f` at every point of `xs`.
    pub fn smooth_many<F>(
        &self,
        f: F,
        xs: &[f64],
    ) -> Vec<f64>
    where
        F: Fn(f64) -> f64,
    {
        xs.iter().map(|&x| self.smooth_one(&f, x)).collect()
    }
}

/// A schedule evaluated through a [`LocalSmoother`].
#[derive(Debug, Clone)]
pub struct Smoothed<S> {
    schedule: S,
    smoother: LocalSmoother,
}

impl<S: Schedule> Smoothed<S> {
    pub fn new(
        schedule: S,
        smoother: LocalSmoother,
    ) -> Result<Self, SmoothingError> {
        smoother.validate()?;
        Ok(Self { schedule, smoother })
    }

    pub fn inner(&self) -> &S {
        &self.schedule
    }

    pub fn smoother(&self) -> &LocalSmoother {
        &self.smoother
    }
}

impl<S: Schedule> Schedule for Smoothed<S> {
    fn evaluate(
        &self,
        value: f64,
    ) -> f64 {
        self.smoother
            .smooth_one(|x| self.schedule.evaluate(x), value)
    }
}

/// Uniform moving average with output the same length as the input.
///
/// Output `k` averages inputs `k - width/2 .. k - width/2 + width`. Positions
/// outside the input contribute zero while the divisor stays `width`, so the
/// first and last few outputs are pulled towards zero.
pub fn moving_average(
    values: &[f64],
    width: usize,
) -> Vec<f64> {
    if width == 0 {
        return values.to_vec();
    }

    let len = values.len();
    let offset = width / 2;
    (0..len)
        .map(|k| {
            let start = k.saturating_sub(offset);
            let end = (k + width).saturating_sub(offset).min(len);
            values[start..end].iter().sum::<f64>() / width as f64
        })
        .collect()
}

/// Gaussian smoothing of a sampled series.
///
/// `sigma` is the kernel's standard deviation in samples. The kernel reaches
/// `⌊4σ + 0.5⌋` samples either side, is normalised to sum to one, and the series
/// is mirrored at both ends (`d c b a | a b c d | d c b a`). A `sigma` of zero
/// returns the series unchanged.
///
/// The radius never exceeds [`GAUSSIAN_TRUNCATE`] times the series length. The
/// mirrored series repeats every `2 × len` samples, so a wider kernel only
/// revisits the same values; a very large `sigma` tends to a flat average.
///
/// # Errors
///
/// Returns [`SmoothingError::InvalidSigma`] for a negative or non-finite sigma.
///
/// # Example
///
/// ```
/// use tax_core::calculations::gaussian_filter;
///
/// let smoothed = gaussian_filter(&[0.0, 0.0, 1.0, 0.0, 0.0], 1.0).unwrap();
///
/// assert_eq!(smoothed.len(), 5);
/// assert!(smoothed[2] < 1.0 && smoothed[1] > 0.0);
/// ```
pub fn gaussian_filter(
    series: &[f64],
    sigma: f64,
) -> Result<Vec<f64>, SmoothingError> {
    if !(sigma >= 0.0 && sigma.is_finite()) {
        return Err(SmoothingError::InvalidSigma(sigma));
    }

    let len = series.len();
    let max_radius = GAUSSIAN_TRUNCATE * len as f64;
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5).min(max_radius) as usize;
    let kernel = gaussian_kernel(sigma, radius);

    Ok((0..len)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(j, weight)| {
                    let position = i as isize + j as isize - radius as isize;
                    weight * series[reflect_index(position, len)]
                })
                .sum()
        })
        .collect())
}

fn gaussian_kernel(
    sigma: f64,
    radius: usize,
) -> Vec<f64> {
    if radius == 0 {
        return vec![1.0];
    }

    let variance = sigma * sigma;
    let radius = radius as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|k| (-0.5 * (k * k) as f64 / variance).exp())
        .collect();
    let total: f64 = weights.iter().sum();

    weights.into_iter().map(|w| w / total).collect()
}

/// Maps any index onto `0..len` by half-sample symmetric reflection.
fn reflect_index(
    index: isize,
    len: usize,
) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let wrapped = index.rem_euclid(period);

    if wrapped < len {
        wrapped as usize
    } else {
        (period - 1 - wrapped) as usize
    }
}
