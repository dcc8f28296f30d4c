use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a band treats a value sitting exactly on its upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpperBound {
    /// `value <= bound` belongs to the band (PAYE tables).
    #[default]
    Inclusive,
    /// `value < bound` belongs to the band, i.e. `[low, high)` (royalty tables).
    Exclusive,
}

impl UpperBound {
    /// Returns `true` when `value` lies below `bound` under this convention.
    pub fn contains<T: PartialOrd>(
        self,
        value: T,
        bound: T,
    ) -> bool {
        match self {
            Self::Inclusive => value <= bound,
            Self::Exclusive => value < bound,
        }
    }
}

/// A single band: everything above the previous band's bound, up to `upper`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Upper bound of the band, `None` for the final unbounded band.
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl Band {
    pub fn bounded(
        upper: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            upper: Some(upper),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self { upper: None, rate }
    }
}

/// A band with its lower bound resolved, as yielded by [`BandTable::intervals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandInterval {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl BandInterval {
    /// Upper edge of the band clipped to `ceiling`, for drawing bands over a
    /// finite axis.
    pub fn clipped_upper(
        &self,
        ceiling: Decimal,
    ) -> Decimal {
        self.upper.map_or(ceiling, |upper| upper.min(ceiling))
    }
}

/// Errors raised when a band table violates its structural invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BandTableError {
    #[error("band table has no bands")]
    Empty,

    #[error("band {index} upper bound {bound} must be positive")]
    NonPositiveBound { index: usize, bound: Decimal },

    #[error("band {index} upper bound {bound} does not exceed previous bound {previous}")]
    NonIncreasingBound {
        index: usize,
        bound: Decimal,
        previous: Decimal,
    },

    #[error("band {index} is unbounded but is not the last band")]
    UnboundedBeforeLast { index: usize },

    #[error("last band must be unbounded, found upper bound {0}")]
    BoundedLastBand(Decimal),

    #[error("band {index} has negative rate {rate}")]
    NegativeRate { index: usize, rate: Decimal },
}

/// An ordered, gap-free partition of `[0, ∞)` into rated bands.
///
/// The first band starts at zero and every later band starts where the
/// previous one ends, so only upper bounds are stored. The final band is
/// always unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandTable {
    upper_bound: UpperBound,
    bands: Vec<Band>,
}

impl BandTable {
    /// Builds a table after checking that bounds are positive and strictly
    /// increasing, that only the last band is unbounded, and that no rate is
    /// negative.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::{Band, BandTable, UpperBound};
    ///
    /// let table = BandTable::new(
    ///     UpperBound::Inclusive,
    ///     vec![Band::bounded(dec!(1000), dec!(0)), Band::unbounded(dec!(0.2))],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.exemption_ceiling(), Some(dec!(1000)));
    /// ```
    pub fn new(
        upper_bound: UpperBound,
        bands: Vec<Band>,
    ) -> Result<Self, BandTableError> {
        validate(&bands)?;
        Ok(Self { upper_bound, bands })
    }

    /// Builds a table from bands already known to be valid (the statutory
    /// tables in [`crate::tables`]).
    pub(crate) fn from_validated(
        upper_bound: UpperBound,
        bands: Vec<Band>,
    ) -> Self {
        debug_assert_eq!(validate(&bands), Ok(()));
        Self { upper_bound, bands }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn upper_bound(&self) -> UpperBound {
        self.upper_bound
    }

    /// Iterates the bands with their lower bounds filled in.
    pub fn intervals(&self) -> impl Iterator<Item = BandInterval> + '_ {
        let lowers = std::iter::once(Decimal::ZERO)
            .chain(self.bands.iter().filter_map(|band| band.upper));

        lowers.zip(&self.bands).map(|(lower, band)| BandInterval {
            lower,
            upper: band.upper,
            rate: band.rate,
        })
    }

    /// Upper bound of the leading run of zero-rate bands, if there is one.
    ///
    /// Income at or below this ceiling is tax-free.
    pub fn exemption_ceiling(&self) -> Option<Decimal> {
        self.bands
            .iter()
            .take_while(|band| band.rate.is_zero())
            .last()
            .and_then(|band| band.upper)
    }
}

fn validate(bands: &[Band]) -> Result<(), BandTableError> {
    let Some(last) = bands.last() else {
        return Err(BandTableError::Empty);
    };
    if let Some(bound) = last.upper {
        return Err(BandTableError::BoundedLastBand(bound));
    }

    let mut previous: Option<Decimal> = None;
    for (index, band) in bands.iter().enumerate() {
        if band.rate < Decimal::ZERO {
            return Err(BandTableError::NegativeRate {
                index,
                rate: band.rate,
            });
        }

        let Some(bound) = band.upper else {
            if index + 1 != bands.len() {
                return Err(BandTableError::UnboundedBeforeLast { index });
            }
            continue;
        };

        if bound <= Decimal::ZERO {
            return Err(BandTableError::NonPositiveBound { index, bound });
        }
        if let Some(previous) = previous {
            if bound <= previous {
                return Err(BandTableError::NonIncreasingBound {
                    index,
                    bound,
                    previous,
                });
            }
        }
        previous = Some(bound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn three_bands() -> Vec<Band> {
        vec![
            Band::bounded(dec!(100), dec!(0)),
            Band::bounded(dec!(200), dec!(0.10)),
            Band::unbounded(dec!(0.20)),
        ]
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn new_accepts_well_formed_table() {
        let table = BandTable::new(UpperBound::Inclusive, three_bands()).unwrap();

        assert_eq!(table.bands().len(), 3);
        assert_eq!(table.upper_bound(), UpperBound::Inclusive);
    }

    #[test]
    fn new_rejects_empty_table() {
        let result = BandTable::new(UpperBound::Inclusive, vec![]);

        assert_eq!(result, Err(BandTableError::Empty));
    }

    #[test]
    fn new_rejects_bounded_last_band() {
        let bands = vec![Band::bounded(dec!(100), dec!(0.1))];

        let result = BandTable::new(UpperBound::Inclusive, bands);

        assert_eq!(result, Err(BandTableError::BoundedLastBand(dec!(100))));
    }

    #[test]
    fn new_rejects_unbounded_band_before_last() {
        let bands = vec![Band::unbounded(dec!(0.1)), Band::unbounded(dec!(0.2))];

        let result = BandTable::new(UpperBound::Inclusive, bands);

        assert_eq!(result, Err(BandTableError::UnboundedBeforeLast { index: 0 }));
    }

    #[test]
    fn new_rejects_non_increasing_bounds() {
        let bands = vec![
            Band::bounded(dec!(200), dec!(0.1)),
            Band::bounded(dec!(200), dec!(0.2)),
            Band::unbounded(dec!(0.3)),
        ];

        let result = BandTable::new(UpperBound::Exclusive, bands);

        assert_eq!(
            result,
            Err(BandTableError::NonIncreasingBound {
                index: 1,
                bound: dec!(200),
                previous: dec!(200),
            })
        );
    }

    #[test]
    fn new_rejects_zero_first_bound() {
        let bands = vec![Band::bounded(dec!(0), dec!(0.1)), Band::unbounded(dec!(0.2))];

        let result = BandTable::new(UpperBound::Exclusive, bands);

        assert_eq!(
            result,
            Err(BandTableError::NonPositiveBound {
                index: 0,
                bound: dec!(0),
            })
        );
    }

    #[test]
    fn new_rejects_negative_rate() {
        let bands = vec![Band::bounded(dec!(10), dec!(-0.1)), Band::unbounded(dec!(0.2))];

        let result = BandTable::new(UpperBound::Inclusive, bands);

        assert_eq!(
            result,
            Err(BandTableError::NegativeRate {
                index: 0,
                rate: dec!(-0.1),
            })
        );
    }

    // =========================================================================
    // interval tests
    // =========================================================================

    #[test]
    fn intervals_chain_lower_bounds_from_zero() {
        let table = BandTable::new(UpperBound::Inclusive, three_bands()).unwrap();

        let intervals: Vec<_> = table.intervals().collect();

        assert_eq!(
            intervals,
            vec![
                BandInterval {
                    lower: dec!(0),
                    upper: Some(dec!(100)),
                    rate: dec!(0),
                },
                BandInterval {
                    lower: dec!(100),
                    upper: Some(dec!(200)),
                    rate: dec!(0.10),
                },
                BandInterval {
                    lower: dec!(200),
                    upper: None,
                    rate: dec!(0.20),
                },
            ]
        );
    }

    #[test]
    fn clipped_upper_caps_unbounded_band() {
        let interval = BandInterval {
            lower: dec!(9000),
            upper: None,
            rate: dec!(0.10),
        };

        assert_eq!(interval.clipped_upper(dec!(10500)), dec!(10500));
    }

    #[test]
    fn clipped_upper_keeps_bound_below_ceiling() {
        let interval = BandInterval {
            lower: dec!(0),
            upper: Some(dec!(4500)),
            rate: dec!(0.055),
        };

        assert_eq!(interval.clipped_upper(dec!(10500)), dec!(4500));
    }

    // =========================================================================
    // exemption_ceiling tests
    // =========================================================================

    #[test]
    fn exemption_ceiling_is_last_leading_zero_band() {
        let bands = vec![
            Band::bounded(dec!(100), dec!(0)),
            Band::bounded(dec!(150), dec!(0)),
            Band::unbounded(dec!(0.2)),
        ];
        let table = BandTable::new(UpperBound::Inclusive, bands).unwrap();

        assert_eq!(table.exemption_ceiling(), Some(dec!(150)));
    }

    #[test]
    fn exemption_ceiling_is_none_without_zero_band() {
        let bands = vec![Band::bounded(dec!(100), dec!(0.05)), Band::unbounded(dec!(0.2))];
        let table = BandTable::new(UpperBound::Exclusive, bands).unwrap();

        assert_eq!(table.exemption_ceiling(), None);
    }

    // =========================================================================
    // UpperBound tests
    // =========================================================================

    #[test]
    fn inclusive_bound_contains_its_edge() {
        assert!(UpperBound::Inclusive.contains(100.0, 100.0));
        assert!(!UpperBound::Exclusive.contains(100.0, 100.0));
        assert!(UpperBound::Exclusive.contains(99.99, 100.0));
    }
}
