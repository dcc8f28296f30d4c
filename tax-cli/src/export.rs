//! CSV export of analysis curves for external charting.
//!
//! Curves are written in long form, one sample per row:
//!
//! ```csv
//! series,x,y
//! tax,1.0,0.0
//! effective_rate,1.0,0.0
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tax_core::SampleCurve;
use tax_core::analysis::{DiscretePayeResult, PayeAnalysisResult, RoyaltyAnalysisResult};

#[derive(Debug, Serialize)]
struct CurveRow<'a> {
    series: &'a str,
    x: f64,
    y: f64,
}

/// A curve and the series name it is exported under.
pub type NamedCurve<'a> = (&'static str, &'a SampleCurve);

pub fn paye_curves(result: &PayeAnalysisResult) -> Vec<NamedCurve<'_>> {
    vec![
        ("tax", &result.tax),
        ("effective_rate", &result.effective_rate),
        ("effective_rate_slope", &result.effective_rate_slope),
    ]
}

pub fn paye_discrete_curves(result: &DiscretePayeResult) -> Vec<NamedCurve<'_>> {
    vec![
        ("effective_rate", &result.effective_rate),
        ("effective_tax", &result.effective_tax),
        ("zoomed_effective_rate", &result.zoomed),
    ]
}

pub fn royalty_curves(result: &RoyaltyAnalysisResult) -> Vec<NamedCurve<'_>> {
    vec![
        ("step_rate", &result.step_rate),
        ("smoothed_rate", &result.smoothed_rate),
        ("step_revenue", &result.step_revenue),
        ("smoothed_revenue", &result.smoothed_revenue),
    ]
}

/// Writes every curve to `writer` and returns the number of data rows.
pub fn write_curves<W: Write>(
    writer: W,
    curves: &[NamedCurve<'_>],
) -> Result<usize, csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for &(series, curve) in curves {
        for (x, y) in curve.points() {
            csv_writer.serialize(CurveRow { series, x, y })?;
            rows += 1;
        }
    }

    csv_writer.flush()?;
    Ok(rows)
}

/// Creates (or truncates) `path` and writes the curves to it.
pub fn write_curves_to_file(
    path: &Path,
    curves: &[NamedCurve<'_>],
) -> Result<usize, csv::Error> {
    let file = File::create(path)?;
    write_curves(file, curves)
}
