//! Severity lookup tables.
//!
//! Every table is an ascending list of lower edges. A value falls into the last band
//! whose edge is `<=` the value, so each boundary belongs to the band above it.
//! Values below the first edge land in the first band.

use crate::error::SpineError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band<S> {
    pub from: f64,
    pub grade: S,
}

/// Serialized as the bare band list; loading sorts it and rejects NaN edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Band<S>>", into = "Vec<Band<S>>")]
#[serde(bound(serialize = "S: Serialize + Clone", deserialize = "S: Deserialize<'de>"))]
pub struct ThresholdTable<S> {
    bands: Vec<Band<S>>,
}

impl<S> TryFrom<Vec<Band<S>>> for ThresholdTable<S> {
    type Error = SpineError;

    fn try_from(mut bands: Vec<Band<S>>) -> Result<Self, SpineError> {
        if bands.iter().any(|band| band.from.is_nan()) {
            return Err(SpineError::InvalidConfig("threshold edge is NaN"));
        }
        bands.sort_by(|a, b| a.from.total_cmp(&b.from));
        Ok(Self { bands })
    }
}

impl<S> From<ThresholdTable<S>> for Vec<Band<S>> {
    fn from(table: ThresholdTable<S>) -> Self {
        table.bands
    }
}

impl<S: Copy> ThresholdTable<S> {
    pub fn new(bands: impl IntoIterator<Item = (f64, S)>) -> Self {
        let mut bands: Vec<Band<S>> = bands
            .into_iter()
            .map(|(from, grade)| Band { from, grade })
            .collect();
        bands.sort_by(|a, b| a.from.total_cmp(&b.from));
        Self { bands }
    }

    /// Ascending by lower edge.
    pub fn bands(&self) -> &[Band<S>] {
        &self.bands
    }

    /// `None` only for an empty table or a NaN value.
    pub fn classify(&self, value: f64) -> Option<S> {
        if value.is_nan() {
            return None;
        }
        let first = self.bands.first()?;
        let band = self
            .bands
            .iter()
            .rev()
            .find(|band| value >= band.from)
            .unwrap_or(first);
        Some(band.grade)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MeyerdingGrade {
    I,
    II,
    III,
    IV,
    V,
}

impl MeyerdingGrade {
    pub fn label(self) -> &'static str {
        match self {
            Self::I => "Grade I (0-25%)",
            Self::II => "Grade II (25-50%)",
            Self::III => "Grade III (50-75%)",
            Self::IV => "Grade IV (75-100%)",
            Self::V => "Grade V (>100%)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StenosisSeverity {
    Severe,
    Moderate,
    Mild,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CurveSeverity {
    Normal,
    Mild,
    Moderate,
    Severe,
    VerySevere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrunkShiftSeverity {
    Minimal,
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SagittalBalance {
    NegativeImbalance,
    Balanced,
    PositiveImbalance,
}

/// Any family's grade, for consumers that only display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", content = "grade", rename_all = "snake_case")]
pub enum Classification {
    Meyerding(MeyerdingGrade),
    Stenosis(StenosisSeverity),
    Curve(CurveSeverity),
    TrunkShift(TrunkShiftSeverity),
    Sagittal(SagittalBalance),
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Meyerding(g) => f.write_str(g.label()),
            Classification::Stenosis(s) => write!(f, "{s:?}"),
            Classification::Curve(CurveSeverity::VerySevere) => f.write_str("Very Severe"),
            Classification::Curve(s) => write!(f, "{s:?}"),
            Classification::TrunkShift(s) => write!(f, "{s:?}"),
            Classification::Sagittal(SagittalBalance::Balanced) => f.write_str("Balanced"),
            Classification::Sagittal(SagittalBalance::PositiveImbalance) => {
                f.write_str("Positive imbalance")
            }
            Classification::Sagittal(SagittalBalance::NegativeImbalance) => {
                f.write_str("Negative imbalance")
            }
        }
    }
}

pub fn meyerding_table() -> ThresholdTable<MeyerdingGrade> {
    ThresholdTable::new([
        (0.0, MeyerdingGrade::I),
        (25.0, MeyerdingGrade::II),
        (50.0, MeyerdingGrade::III),
        (75.0, MeyerdingGrade::IV),
        (100.0, MeyerdingGrade::V),
    ])
}

pub fn stenosis_table() -> ThresholdTable<StenosisSeverity> {
    ThresholdTable::new([
        (f64::MIN, StenosisSeverity::Severe),
        (100.0, StenosisSeverity::Moderate),
        (200.0, StenosisSeverity::Mild),
        (300.0, StenosisSeverity::Normal),
    ])
}

pub fn cobb_table() -> ThresholdTable<CurveSeverity> {
    ThresholdTable::new([
        (f64::MIN, CurveSeverity::Normal),
        (10.0, CurveSeverity::Mild),
        (25.0, CurveSeverity::Moderate),
        (40.0, CurveSeverity::Severe),
        (50.0, CurveSeverity::VerySevere),
    ])
}

pub fn trunk_shift_table() -> ThresholdTable<TrunkShiftSeverity> {
    ThresholdTable::new([
        (f64::MIN, TrunkShiftSeverity::Minimal),
        (10.0, TrunkShiftSeverity::Mild),
        (20.0, TrunkShiftSeverity::Moderate),
        (30.0, TrunkShiftSeverity::Severe),
    ])
}

/// Symmetric limit on a signed offset: `>= limit` is positive, `<= -limit` negative imbalance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceLimit {
    pub limit: f64,
}

impl BalanceLimit {
    pub const fn new(limit: f64) -> Self {
        Self { limit }
    }

    pub fn classify(&self, offset: f64) -> Option<SagittalBalance> {
        if offset.is_nan() {
            return None;
        }
        let balance = if offset >= self.limit {
            SagittalBalance::PositiveImbalance
        } else if offset <= -self.limit {
            SagittalBalance::NegativeImbalance
        } else {
            SagittalBalance::Balanced
        };
        Some(balance)
    }
}

/// One-sided table for angles that are never negative.
pub fn angle_balance_table(limit: f64) -> ThresholdTable<SagittalBalance> {
    ThresholdTable::new([
        (f64::MIN, SagittalBalance::Balanced),
        (limit, SagittalBalance::PositiveImbalance),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_edge_belongs_to_upper_band() {
        let table = trunk_shift_table();
        assert_eq!(Some(TrunkShiftSeverity::Minimal), table.classify(9.99));
        assert_eq!(Some(TrunkShiftSeverity::Mild), table.classify(10.0));
        assert_eq!(Some(TrunkShiftSeverity::Severe), table.classify(300.0));
    }

    #[test]
    fn both_balance_edges_are_imbalanced() {
        let sva = BalanceLimit::new(50.0);
        assert_eq!(Some(SagittalBalance::PositiveImbalance), sva.classify(50.0));
        assert_eq!(Some(SagittalBalance::NegativeImbalance), sva.classify(-50.0));
        assert_eq!(Some(SagittalBalance::Balanced), sva.classify(-49.9));
        assert_eq!(None, sva.classify(f64::NAN));
    }

    #[test]
    fn values_below_first_edge_use_first_band() {
        assert_eq!(Some(MeyerdingGrade::I), meyerding_table().classify(-3.0));
        assert_eq!(None, meyerding_table().classify(f64::NAN));
    }
}
