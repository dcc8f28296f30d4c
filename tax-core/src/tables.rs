//! Statutory band tables for Zambia.
//!
//! Each function builds a fresh [`BandTable`] value; nothing here is shared
//! state, so callers are free to substitute their own tables (for example ones
//! loaded from CSV by the `tax-data` crate).
//!
//! | Table | Bounds | Bands |
//! |-------|--------|-------|
//! | PAYE effective-rate lookup | `≤` | 61,200 → 0%, 85,200 → 10%, 110,400 → 15%, 248,000 → 25%, above → 30% |
//! | PAYE marginal brackets (2025) | `≤` | 61,200 → 0%, 85,200 → 20%, 110,400 → 30%, above → 37% |
//! | Copper royalty (USD/tonne) | `<` | 4,500 → 5.5%, 6,000 → 6.5%, 7,500 → 7.5%, 9,000 → 8.5%, above → 10% |

use rust_decimal::Decimal;

use crate::models::{Band, BandTable, UpperBound};

/// Schedule name of [`paye_brackets_2025`] in band CSV files.
pub const PAYE_BRACKETS: &str = "paye-brackets";
/// Schedule name of [`paye_effective_rates`] in band CSV files.
pub const PAYE_EFFECTIVE: &str = "paye-effective";
/// Schedule name of [`copper_royalty_bands`] in band CSV files.
pub const COPPER_ROYALTY: &str = "copper-royalty";

/// PAYE marginal brackets for 2025, applied cumulatively.
pub fn paye_brackets_2025() -> BandTable {
    BandTable::from_validated(
        UpperBound::Inclusive,
        vec![
            Band::bounded(Decimal::new(61_200, 0), Decimal::ZERO),
            Band::bounded(Decimal::new(85_200, 0), Decimal::new(20, 2)),
            Band::bounded(Decimal::new(110_400, 0), Decimal::new(30, 2)),
            Band::unbounded(Decimal::new(37, 2)),
        ],
    )
}

/// PAYE effective-rate lookup: a flat rate applied to the whole income.
pub fn paye_effective_rates() -> BandTable {
    BandTable::from_validated(
        UpperBound::Inclusive,
        vec![
            Band::bounded(Decimal::new(61_200, 0), Decimal::ZERO),
            Band::bounded(Decimal::new(85_200, 0), Decimal::new(10, 2)),
            Band::bounded(Decimal::new(110_400, 0), Decimal::new(15, 2)),
            Band::bounded(Decimal::new(248_000, 0), Decimal::new(25, 2)),
            Band::unbounded(Decimal::new(30, 2)),
        ],
    )
}

/// Copper mineral royalty rate keyed to the copper price, `[low, high)` bands.
pub fn copper_royalty_bands() -> BandTable {
    BandTable::from_validated(
        UpperBound::Exclusive,
        vec![
            Band::bounded(Decimal::new(4_500, 0), Decimal::new(55, 3)),
            Band::bounded(Decimal::new(6_000, 0), Decimal::new(65, 3)),
            Band::bounded(Decimal::new(7_500, 0), Decimal::new(75, 3)),
            Band::bounded(Decimal::new(9_000, 0), Decimal::new(85, 3)),
            Band::unbounded(Decimal::new(10, 2)),
        ],
    )
}
