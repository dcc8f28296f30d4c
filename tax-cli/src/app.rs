//! Glue between the command line and the analysis pipelines: loading settings
//! and band tables, running an analysis, and rendering its summary.

use std::path::Path;

use anyhow::{Context, Result};
use tax_core::{BandTable, UpperBound};
use tax_core::analysis::{
    BandSpan, DiscretePayeAnalysis, DiscretePayeResult, PayeAnalysis, PayeAnalysisResult,
    Production, RoyaltyAnalysis, RoyaltyAnalysisResult,
};
use tax_core::calculations::common::to_f64;
use tax_core::tables::{COPPER_ROYALTY, PAYE_BRACKETS, PAYE_EFFECTIVE};
use tax_data::{BandTableLoader, BandTables};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::export::{NamedCurve, write_curves_to_file};
use crate::utils::{format_percent, format_usd, format_zmw, group_thousands};

// ─── loading ─────────────────────────────────────────────────────────────────

/// Reads the analysis settings, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            let config = AnalysisConfig::load(path)
                .with_context(|| format!("failed to load settings from '{}'", path.display()))?;
            info!(path = %path.display(), "loaded analysis settings");
            Ok(config)
        }
        None => {
            debug!("no settings file given, using defaults");
            Ok(AnalysisConfig::default())
        }
    }
}

/// The statutory band tables, overridden by any schedule in the CSV at `path`.
pub fn load_tables(path: Option<&Path>) -> Result<BandTables> {
    let mut tables = BandTables::statutory();

    if let Some(path) = path {
        let overrides = BandTableLoader::load_from_file(path)
            .with_context(|| format!("failed to load band tables from '{}'", path.display()))?;
        info!(
            path = %path.display(),
            schedules = overrides.len(),
            "loaded band table overrides"
        );
        tables.merge(overrides);
    }

    Ok(tables)
}

fn table(
    tables: &BandTables,
    schedule: &str,
) -> Result<BandTable> {
    Ok(tables.require(schedule)?.clone())
}

// ─── analyses ────────────────────────────────────────────────────────────────

pub fn run_paye(
    config: &AnalysisConfig,
    tables: &BandTables,
) -> Result<PayeAnalysisResult> {
    let analysis = PayeAnalysis::new(table(tables, PAYE_BRACKETS)?, config.paye)
        .context("invalid smoothed PAYE settings")?;
    analysis.run().context("smoothed PAYE analysis failed")
}

pub fn run_paye_discrete(
    config: &AnalysisConfig,
    tables: &BandTables,
) -> Result<DiscretePayeResult> {
    let analysis = DiscretePayeAnalysis::new(table(tables, PAYE_EFFECTIVE)?, config.paye_discrete)
        .context("invalid discrete PAYE settings")?;
    analysis.run().context("discrete PAYE analysis failed")
}

pub fn run_royalty(
    config: &AnalysisConfig,
    tables: &BandTables,
    production: Production,
) -> Result<RoyaltyAnalysisResult> {
    let analysis = RoyaltyAnalysis::new(table(tables, COPPER_ROYALTY)?, config.royalty)
        .context("invalid royalty settings")?;
    analysis
        .run(production)
        .with_context(|| format!("royalty analysis failed for {production}"))
}

/// Writes `curves` to `path` as CSV.
pub fn export(
    path: &Path,
    curves: &[NamedCurve<'_>],
) -> Result<()> {
    let rows = write_curves_to_file(path, curves)
        .with_context(|| format!("failed to write curves to '{}'", path.display()))?;
    info!(path = %path.display(), rows, "exported curves");
    Ok(())
}

// ─── summaries ───────────────────────────────────────────────────────────────

fn span_label(span: &BandSpan) -> String {
    format!(
        "{} to {}: {}",
        group_thousands(span.lower),
        group_thousands(span.upper),
        format_percent(span.rate)
    )
}

pub fn paye_summary(result: &PayeAnalysisResult) -> String {
    let mut lines = vec!["Smoothed PAYE brackets:".to_string()];
    lines.extend(result.bands.iter().map(|span| format!("  {}", span_label(span))));

    match &result.marginal_point {
        Some(point) => {
            lines.push(format!(
                "True marginal point occurs at income: {} with effective rate {}",
                format_zmw(point.income),
                format_percent(point.effective_rate)
            ));
            lines.push(format!("Smoothed tax at that income: {}", format_zmw(point.tax)));
        }
        None => lines.push("No marginal point found in the search interval".to_string()),
    }

    lines.join("\n")
}

pub fn paye_discrete_summary(result: &DiscretePayeResult) -> String {
    match &result.marginal_point {
        Some(point) => format!(
            "Discrete marginal point occurs at income: {} with effective rate {}",
            format_zmw(point.income),
            format_percent(point.effective_rate)
        ),
        None => "No discrete marginal point above the threshold".to_string(),
    }
}

pub fn royalty_summary(result: &RoyaltyAnalysisResult) -> String {
    let production = group_thousands(f64::from(result.production.tonnes()));
    let mut lines = vec![format!("Copper royalty bands (production: {production} tonnes):")];
    lines.extend(result.bands.iter().map(|span| {
        format!(
            "  {} to {}: {}",
            format_usd(span.lower),
            format_usd(span.upper),
            format_percent(span.rate)
        )
    }));

    match &result.peak {
        Some(peak) => lines.push(format!(
            "Peak revenue occurs at copper price: {}, revenue: {}",
            format_usd(peak.price),
            format_zmw(peak.revenue)
        )),
        None => lines.push("No revenue peak on an empty price grid".to_string()),
    }

    lines.join("\n")
}

fn bound_label(bound: UpperBound) -> &'static str {
    match bound {
        UpperBound::Inclusive => "inclusive",
        UpperBound::Exclusive => "exclusive",
    }
}

/// Lists every loaded table with its resolved intervals.
pub fn bands_summary(tables: &BandTables) -> String {
    let mut lines = Vec::new();

    for (schedule, table) in tables.iter() {
        lines.push(format!("{schedule} ({} upper bounds)", bound_label(table.upper_bound())));
        for interval in table.intervals() {
            let lower = group_thousands(to_f64(interval.lower));
            let rate = format_percent(to_f64(interval.rate));
            match interval.upper {
                Some(upper) => lines.push(format!(
                    "  {lower} to {}: {rate}",
                    group_thousands(to_f64(upper))
                )),
                None => lines.push(format!("  {lower} and above: {rate}")),
            }
        }
    }

    lines.join("\n")
}
