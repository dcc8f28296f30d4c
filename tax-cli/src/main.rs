use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use tax_cli::{app, export, logging, utils};
use tax_core::analysis::Production;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Zambian PAYE and copper royalty analysis.
///
/// Runs one analysis over the statutory band tables (optionally overridden
/// from a CSV file), prints a summary, and can export the sampled curves.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// TOML file with analysis settings. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// CSV file of band tables that replace the statutory ones by schedule name.
    #[arg(long, global = true)]
    bands: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tax_core=trace`. Overrides `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Smoothed PAYE schedule and its marginal point.
    Paye {
        /// Write the sampled curves to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Flat effective-rate PAYE lookup and its slope inflection.
    PayeDiscrete {
        /// Write the sampled curves to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Copper royalty revenue under stepwise and smoothed rates.
    Royalty {
        /// Annual copper production in tonnes (10,000 to 1,000,000).
        #[arg(long, default_value = "50000", value_parser = utils::parse_production)]
        production: Production,

        /// Write the sampled curves to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the loaded band tables.
    Bands,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;
    debug!(?cli, "parsed arguments");

    let config = app::load_config(cli.config.as_deref())?;
    let tables = app::load_tables(cli.bands.as_deref())?;

    match cli.command {
        Command::Paye { output } => {
            let result = app::run_paye(&config, &tables)?;
            println!("{}", app::paye_summary(&result));
            if let Some(path) = output {
                app::export(&path, &export::paye_curves(&result))?;
            }
        }
        Command::PayeDiscrete { output } => {
            let result = app::run_paye_discrete(&config, &tables)?;
            println!("{}", app::paye_discrete_summary(&result));
            if let Some(path) = output {
                app::export(&path, &export::paye_discrete_curves(&result))?;
            }
        }
        Command::Royalty { production, output } => {
            let result = app::run_royalty(&config, &tables, production)?;
            println!("{}", app::royalty_summary(&result));
            if let Some(path) = output {
                app::export(&path, &export::royalty_curves(&result))?;
            }
        }
        Command::Bands => println!("{}", app::bands_summary(&tables)),
    }

    Ok(())
}
