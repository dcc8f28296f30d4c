//! Band table data loading.
//!
//! Band tables are read from CSV so that schedules can be revised without a
//! rebuild. See [`BandTableLoader`] for the file format.

mod loader;

pub use loader::{BandRecord, BandTableLoader, BandTableLoaderError, BandTables};
