//! Numerical differentiation of schedules and sampled curves.

use crate::models::{CurveError, check_samples};

/// Default half-step for [`central_difference`], in income/price units.
pub const DEFAULT_STEP: f64 = 5.0;

/// Central-difference estimate of `f'(x)` with a fixed half-step `h`.
///
/// The caller is responsible for `f` being defined and reasonably smooth on
/// `[x - h, x + h]`.
///
/// # Example
///
/// ```
/// use approx::assert_relative_eq;
/// use tax_core::calculations::central_difference;
///
/// let slope = central_difference(|x| x * x, 3.0, 0.5);
///
/// assert_relative_eq!(slope, 6.0, epsilon = 1e-12);
/// ```
pub fn central_difference<F>(
    f: F,
    x: f64,
    h: f64,
) -> f64
where
    F: Fn(f64) -> f64,
{
    (f(x + h) - f(x - h)) / (2.0 * h)
}

/// Derivative of a sampled curve `y(x)` at every sample.
///
/// Interior points use the second-order central difference for uneven
/// spacing; the two end points use one-sided first differences.
///
/// # Errors
///
/// Returns [`CurveError`] if the slices differ in length, hold fewer than two
/// samples, or `x` is not strictly increasing.
pub fn gradient(
    x: &[f64],
    y: &[f64],
) -> Result<Vec<f64>, CurveError> {
    check_samples(x, y)?;

    let n = x.len();
    if n < 2 {
        return Err(CurveError::TooFewSamples {
            required: 2,
            actual: n,
        });
    }

    let mut slopes = vec![0.0; n];
    slopes[0] = (y[1] - y[0]) / (x[1] - x[0]);
    slopes[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let before = x[i] - x[i - 1];
        let after = x[i + 1] - x[i];
        slopes[i] = (before * before * y[i + 1] - after * after * y[i - 1]
            + (after * after - before * before) * y[i])
            / (before * after * (before + after));
    }

    Ok(slopes)
}
