mod band;
mod marginal_point;
mod sample_curve;

pub use band::{Band, BandInterval, BandTable, BandTableError, UpperBound};
pub use marginal_point::MarginalPoint;
pub(crate) use sample_curve::check_samples;
pub use sample_curve::{CurveError, SampleCurve, argmax};
