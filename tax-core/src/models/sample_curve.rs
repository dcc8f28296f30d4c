use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::derivative::gradient;

/// Errors raised for malformed sampled curves.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CurveError {
    #[error("x has {x} samples but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("at least {required} samples are required, got {actual}")]
    TooFewSamples { required: usize, actual: usize },

    #[error("x must be strictly increasing: x[{index}] = {value} follows {previous}")]
    NonIncreasing {
        index: usize,
        value: f64,
        previous: f64,
    },
}

/// Checks that `x` and `y` line up and that `x` is strictly increasing.
pub(crate) fn check_samples(
    x: &[f64],
    y: &[f64],
) -> Result<(), CurveError> {
    if x.len() != y.len() {
        return Err(CurveError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }

    for (index, pair) in x.windows(2).enumerate() {
        // NaN compares as unordered and is rejected here too.
        if pair[1].partial_cmp(&pair[0]) != Some(Ordering::Greater) {
            return Err(CurveError::NonIncreasing {
                index: index + 1,
                value: pair[1],
                previous: pair[0],
            });
        }
    }

    Ok(())
}

/// A function sampled at strictly increasing points.
///
/// Deserialized curves go through [`SampleCurve::new`] and are checked the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSampleCurve")]
pub struct SampleCurve {
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Deserialize)]
struct RawSampleCurve {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TryFrom<RawSampleCurve> for SampleCurve {
    type Error = CurveError;

    fn try_from(raw: RawSampleCurve) -> Result<Self, Self::Error> {
        Self::new(raw.x, raw.y)
    }
}

impl SampleCurve {
    pub fn new(
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> Result<Self, CurveError> {
        check_samples(&x, &y)?;
        Ok(Self { x, y })
    }

    /// Samples `f` at every point of `x`.
    pub fn from_fn<F>(
        x: Vec<f64>,
        f: F,
    ) -> Result<Self, CurveError>
    where
        F: Fn(f64) -> f64,
    {
        let y = x.iter().map(|&xi| f(xi)).collect();
        Self::new(x, y)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Derivative of `y` with respect to `x` at every sample.
    pub fn gradient(&self) -> Result<Vec<f64>, CurveError> {
        gradient(&self.x, &self.y)
    }

    /// Keeps the samples whose `x` satisfies `keep`.
    pub fn filter_x<P>(
        &self,
        keep: P,
    ) -> SampleCurve
    where
        P: Fn(f64) -> bool,
    {
        let (x, y) = self.points().filter(|&(x, _)| keep(x)).unzip();
        // A subsequence of a strictly increasing sequence stays strictly increasing.
        SampleCurve { x, y }
    }

    /// Index of the first maximum of `y`, ignoring NaN.
    pub fn argmax(&self) -> Option<usize> {
        argmax(&self.y)
    }
}

/// Index of the first maximum, ignoring NaN. `None` for an empty or all-NaN slice.
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
