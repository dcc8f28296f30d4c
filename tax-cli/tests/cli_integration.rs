//! Integration tests for the CLI glue, driven by the files under tests/fixtures/.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_cli::{app, export};
use tax_core::analysis::{Production, SampleGrid};
use tax_core::calculations::DownturnFallback;
use tax_core::tables::{COPPER_ROYALTY, PAYE_BRACKETS, paye_brackets_2025};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

#[test]
fn test_fixture_settings_override_defaults() {
    let config = app::load_config(Some(&fixture("analysis.toml"))).unwrap();

    assert_eq!(config.paye.income_grid, SampleGrid::new(1.0, 300_000.0, 600));
    assert_eq!(config.paye.search_ceiling, 1_000_000.0);
    assert_eq!(config.paye.solver.steps, 2_000);
    assert_eq!(config.paye.solver.max_bisections, 40);
    assert_eq!(config.paye_discrete.fallback, DownturnFallback::LastSample);
    assert_eq!(config.royalty.sigma, 10.0);
}

#[test]
fn test_band_overrides_replace_only_named_schedules() {
    let tables = app::load_tables(Some(&fixture("bands.csv"))).unwrap();

    let copper = tables.require(COPPER_ROYALTY).unwrap();
    assert_eq!(copper.bands().len(), 3);
    assert_eq!(copper.bands()[0].rate, dec!(0.04));
    assert_eq!(tables.get(PAYE_BRACKETS), Some(&paye_brackets_2025()));
}

#[test]
fn test_royalty_with_overridden_bands() {
    let config = app::load_config(Some(&fixture("analysis.toml"))).unwrap();
    let tables = app::load_tables(Some(&fixture("bands.csv"))).unwrap();

    let result = app::run_royalty(&config, &tables, Production::default()).unwrap();
    let summary = app::royalty_summary(&result);

    assert_eq!(result.step_rate.len(), 501);
    assert!(
        summary.ends_with("Peak revenue occurs at copper price: $10,500, revenue: ZMW 42,000,000"),
        "summary: {summary}"
    );
}

#[test]
fn test_paye_with_fixture_settings_finds_top_bracket_point() {
    let config = app::load_config(Some(&fixture("analysis.toml"))).unwrap();
    let tables = app::load_tables(None).unwrap();

    let result = app::run_paye(&config, &tables).unwrap();

    let point = result.marginal_point.expect("marginal point");
    assert!((153_000.0..155_000.0).contains(&point.income), "income: {}", point.income);
    assert_eq!(result.tax.len(), 600);
}

#[test]
fn test_export_writes_every_curve() {
    let config = app::load_config(Some(&fixture("analysis.toml"))).unwrap();
    let tables = app::load_tables(None).unwrap();
    let result = app::run_royalty(&config, &tables, Production::new(100_000).unwrap()).unwrap();
    let path = std::env::temp_dir().join(format!("royalty-curves-{}.csv", std::process::id()));

    app::export(&path, &export::royalty_curves(&result)).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("series,x,y"));
    assert_eq!(lines.count(), 4 * 501);
    assert!(contents.contains("\nsmoothed_revenue,10500.0,"));
}
