use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::tables::{
    COPPER_ROYALTY, PAYE_BRACKETS, PAYE_EFFECTIVE, copper_royalty_bands, paye_brackets_2025,
    paye_effective_rates,
};
use tax_core::{Band, BandTable, BandTableError, UpperBound};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading band tables.
#[derive(Debug, Error)]
pub enum BandTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("schedule '{0}' mixes inclusive and exclusive upper bounds")]
    MixedBoundKinds(String),

    #[error("schedule '{schedule}' is not a valid band table: {source}")]
    Table {
        schedule: String,
        #[source]
        source: BandTableError,
    },

    #[error("schedule '{0}' not found")]
    MissingSchedule(String),

    #[error("failed to read band file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for BandTableLoaderError {
    fn from(err: csv::Error) -> Self {
        BandTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a band CSV file.
///
/// - `schedule`: name of the table the band belongs to (e.g. `paye-brackets`)
/// - `upper_bound`: upper edge of the band, empty for the unbounded top band
/// - `upper_inclusive`: `true` when a value equal to the bound is inside the band
/// - `rate`: the band's rate as a decimal (e.g. `0.37` for 37%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BandRecord {
    pub schedule: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub upper_inclusive: bool,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Named band tables, keyed by schedule name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandTables {
    tables: BTreeMap<String, BandTable>,
}

impl BandTables {
    /// The three statutory Zambian tables under their well-known names.
    pub fn statutory() -> Self {
        let mut tables = Self::default();
        tables.insert(PAYE_BRACKETS, paye_brackets_2025());
        tables.insert(PAYE_EFFECTIVE, paye_effective_rates());
        tables.insert(COPPER_ROYALTY, copper_royalty_bands());
        tables
    }

    pub fn insert(
        &mut self,
        schedule: impl Into<String>,
        table: BandTable,
    ) -> Option<BandTable> {
        self.tables.insert(schedule.into(), table)
    }

    /// Replaces or adds every table from `other`.
    pub fn merge(
        &mut self,
        other: BandTables,
    ) {
        self.tables.extend(other.tables);
    }

    pub fn get(
        &self,
        schedule: &str,
    ) -> Option<&BandTable> {
        self.tables.get(schedule)
    }

    /// Like [`BandTables::get`], but a missing schedule is an error.
    pub fn require(
        &self,
        schedule: &str,
    ) -> Result<&BandTable, BandTableLoaderError> {
        self.get(schedule)
            .ok_or_else(|| BandTableLoaderError::MissingSchedule(schedule.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BandTable)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Loader for band tables from CSV files.
///
/// Rows are grouped by `schedule`; within a schedule, rows keep their file
/// order, which must be ascending by upper bound with the unbounded band last.
pub struct BandTableLoader;

impl BandTableLoader {
    /// Parse band records from a CSV reader.
    ///
    /// Returns a vector of parsed records. The reader can be any type that
    /// implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BandRecord>, BandTableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BandRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build validated band tables from parsed records.
    ///
    /// # Errors
    ///
    /// * [`BandTableLoaderError::MixedBoundKinds`] - rows of one schedule
    ///   disagree on `upper_inclusive`
    /// * [`BandTableLoaderError::Table`] - a schedule breaks a band table
    ///   invariant (for example bounds out of order or a bounded last band)
    pub fn build(records: &[BandRecord]) -> Result<BandTables, BandTableLoaderError> {
        let mut grouped: BTreeMap<&str, Vec<&BandRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.schedule.as_str()).or_default().push(record);
        }

        let mut tables = BandTables::default();
        for (schedule, rows) in grouped {
            let inclusive = rows[0].upper_inclusive;
            if rows.iter().any(|row| row.upper_inclusive != inclusive) {
                return Err(BandTableLoaderError::MixedBoundKinds(schedule.to_string()));
            }

            let upper_bound = if inclusive {
                UpperBound::Inclusive
            } else {
                UpperBound::Exclusive
            };
            let bands = rows
                .iter()
                .map(|row| Band {
                    upper: row.upper_bound,
                    rate: row.rate,
                })
                .collect();

            let table = BandTable::new(upper_bound, bands).map_err(|source| {
                BandTableLoaderError::Table {
                    schedule: schedule.to_string(),
                    source,
                }
            })?;
            debug!(schedule, bands = rows.len(), "band table loaded");
            tables.insert(schedule, table);
        }

        Ok(tables)
    }

    /// Convenience wrapper: read a file from disk, parse it, and build tables.
    pub fn load_from_file(path: &Path) -> Result<BandTables, BandTableLoaderError> {
        let file = std::fs::File::open(path)?;
        let records = Self::parse(file)?;
        Self::build(&records)
    }
}
