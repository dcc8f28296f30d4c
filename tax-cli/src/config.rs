//! Analysis settings loaded from a TOML file.
//!
//! Every section and key is optional; anything left out keeps its default.
//!
//! ```toml
//! [paye]
//! derivative_step = 5.0
//! search_ceiling = 1500000.0
//!
//! [paye.smoother]
//! window = 2000.0
//! samples = 120
//!
//! [paye_discrete]
//! threshold = 110400.0
//! fallback = "last-sample"
//!
//! [royalty]
//! sigma = 20.0
//! price_grid = { start = 3000.0, end = 10500.0, samples = 1000 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tax_core::analysis::{AnalysisError, DiscretePayeConfig, PayeAnalysisConfig, RoyaltyAnalysisConfig};
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid analysis settings: {0}")]
    Invalid(#[from] AnalysisError),
}

/// Settings for every analysis the CLI can run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub paye: PayeAnalysisConfig,
    pub paye_discrete: DiscretePayeConfig,
    pub royalty: RoyaltyAnalysisConfig,
}

impl AnalysisConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.paye.validate()?;
        self.paye_discrete.validate()?;
        self.royalty.validate()
    }
}
