//! Slope-inflection search on a discretely sampled effective-rate curve.
//!
//! Above a threshold income the sampled curve is differentiated, the steepest
//! slope is located, and the marginal point is the last sample before the slope
//! starts to fall again.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::derivative::gradient;
use crate::models::{CurveError, MarginalPoint, argmax, check_samples};

/// Income above which the discrete PAYE search starts.
pub const DEFAULT_THRESHOLD: f64 = 110_400.0;

/// What to report when the slope never falls after its peak.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownturnFallback {
    /// No marginal point.
    #[default]
    NotFound,

    /// The last sample above the threshold.
    LastSample,
}

/// Finds the marginal point of the sampled curve `(x, y)`.
///
/// Only samples with `x > threshold` take part. Their gradient is computed, the
/// first index of its maximum is taken, and the search moves right to the first
/// `i` where `gradient[i + 1] < gradient[i]`; `(x[i], y[i])` is returned.
///
/// # Returns
///
/// * `Ok(Some(point))` - a downturn was found, or `fallback` supplied a point
/// * `Ok(None)` - fewer than two samples lie above the threshold, or no
///   downturn follows the peak under [`DownturnFallback::NotFound`]
///
/// # Errors
///
/// Returns [`CurveError`] if the slices differ in length or `x` is not strictly
/// increasing.
pub fn locate_marginal_point(
    x: &[f64],
    y: &[f64],
    threshold: f64,
    fallback: DownturnFallback,
) -> Result<Option<MarginalPoint>, CurveError> {
    check_samples(x, y)?;

    let start = x.partition_point(|&value| value <= threshold);
    let (x, y) = (&x[start..], &y[start..]);
    if x.len() < 2 {
        debug!(threshold, samples = x.len(), "too few samples above threshold");
        return Ok(None);
    }

    let slopes = gradient(x, y)?;
    let Some(peak) = argmax(&slopes) else {
        return Ok(None);
    };

    let downturn = (peak..slopes.len() - 1).find(|&i| slopes[i + 1] < slopes[i]);
    match (downturn, fallback) {
        (Some(i), _) => {
            debug!(index = i, x = x[i], y = y[i], "marginal point located");
            Ok(Some(MarginalPoint::new(x[i], y[i])))
        }
        (None, DownturnFallback::NotFound) => {
            debug!(peak, "slope never falls after its peak");
            Ok(None)
        }
        (None, DownturnFallback::LastSample) => {
            let last = x.len() - 1;
            warn!(peak, x = x[last], "no slope downturn, falling back to last sample");
            Ok(Some(MarginalPoint::new(x[last], y[last])))
        }
    }
}
