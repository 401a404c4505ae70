use thiserror::Error;

use super::codes::{HlaAllele, TreatmentCategory, TumorStage, TumorType};
use super::signature::SlotType;

/// One decoded parameter value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Param {
    Integer(i64),
    Double(f64),
    String(String),
    ManyStrings(Vec<String>),
    TreatmentCategory(TreatmentCategory),
    TumorType(TumorType),
    TumorStage(TumorStage),
    HlaAllele(HlaAllele),
}

impl Param {
    /// The slot type this value fills.
    #[must_use]
    pub fn slot_type(&self) -> SlotType {
        match self {
            Param::Integer(_) => SlotType::Integer,
            Param::Double(_) => SlotType::Double,
            Param::String(_) => SlotType::String,
            Param::ManyStrings(_) => SlotType::ManyStrings,
            Param::TreatmentCategory(_) => SlotType::TreatmentCategory,
            Param::TumorType(_) => SlotType::TumorType,
            Param::TumorStage(_) => SlotType::TumorStage,
            Param::HlaAllele(_) => SlotType::HlaAllele,
        }
    }
}

/// Raised by a rule factory that reads a slot with the wrong accessor.
///
/// Only reachable when a custom factory disagrees with the signature the
/// parameters were resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter {index}: expected {expected}")]
pub struct ParameterError {
    pub index: usize,
    pub expected: SlotType,
}

/// Typed values decoded from a leaf's literal arguments, one per signature slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedParameters {
    values: Vec<Param>,
}

macro_rules! accessor {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $slot:ident, $out:ty, |$v:ident| $conv:expr) => {
        $(#[$meta])*
        pub fn $name(&self, index: usize) -> Result<$out, ParameterError> {
            match self.values.get(index) {
                Some(Param::$variant($v)) => Ok($conv),
                _ => Err(ParameterError {
                    index,
                    expected: SlotType::$slot,
                }),
            }
        }
    };
}

impl ResolvedParameters {
    #[must_use]
    pub fn new(values: Vec<Param>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[Param] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    accessor!(
        /// The integer at `index`.
        ///
        /// # Errors
        ///
        /// Returns [`ParameterError`] if slot `index` does not hold an integer.
        integer, Integer, Integer, i64, |v| *v
    );
    accessor!(
        /// The double at `index`.
        ///
        /// # Errors
        ///
        /// Returns [`ParameterError`] if slot `index` does not hold a double.
        double, Double, Double, f64, |v| *v
    );
    accessor!(
        /// # Errors
        ///
        /// Returns [`ParameterError`] if slot `index` does not hold a string.
        string, String, String, &str, |v| v.as_str()
    );
    accessor!(
        /// The values of a many-strings slot, in literal order.
        ///
        /// # Errors
        ///
        /// Returns [`ParameterError`] if slot `index` is not a many-strings slot.
        strings, ManyStrings, ManyStrings, &[String], |v| v.as_slice()
    );
    accessor!(
        /// # Errors
        ///
        /// Returns [`ParameterError`] on a slot type mismatch.
        treatment, TreatmentCategory, TreatmentCategory, TreatmentCategory, |v| *v
    );
    accessor!(
        /// # Errors
        ///
        /// Returns [`ParameterError`] on a slot type mismatch.
        tumor_type, TumorType, TumorType, TumorType, |v| *v
    );
    accessor!(
        /// # Errors
        ///
        /// Returns [`ParameterError`] on a slot type mismatch.
        tumor_stage, TumorStage, TumorStage, TumorStage, |v| *v
    );
    accessor!(
        /// # Errors
        ///
        /// Returns [`ParameterError`] on a slot type mismatch.
        hla, HlaAllele, HlaAllele, HlaAllele, |v| *v
    );
}
