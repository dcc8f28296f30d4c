use std::num::ParseIntError;

use tax_core::analysis::{Production, ProductionError};
use thiserror::Error;

/// Error returned when a command-line production volume is unusable.
#[derive(Debug, Error)]
pub enum ParseProductionError {
    #[error("invalid tonnage '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    OutOfRange(#[from] ProductionError),
}

/// Normalizes numeric input: trims whitespace and removes commas (thousands separator).
fn normalize_numeric_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a copper production volume in tonnes, e.g. `"250,000"`.
pub fn parse_production(s: &str) -> Result<Production, ParseProductionError> {
    let tonnes: u32 = normalize_numeric_input(s).parse().map_err(|source| {
        tracing::error!(input = %s, "invalid production volume");
        ParseProductionError::Invalid {
            input: s.to_string(),
            source,
        }
    })?;
    Ok(Production::new(tonnes)?)
}

/// Rounds to a whole number and inserts comma thousands separators.
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if value < 0.0 && grouped.chars().any(|c| c != '0' && c != ',') {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats a kwacha amount, e.g. `ZMW 153,989`.
pub fn format_zmw(amount: f64) -> String {
    format!("ZMW {}", group_thousands(amount))
}

/// Formats a copper price, e.g. `$10,500`.
pub fn format_usd(price: f64) -> String {
    format!("${}", group_thousands(price))
}

/// Formats a rate as a percentage with two decimals, e.g. `18.50%`.
pub fn format_percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}
