use std::collections::HashMap;
use std::fmt;

use super::rule_id::RuleId;

/// Type of one parameter slot of a leaf rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotType {
    Integer,
    Double,
    String,
    /// Several strings in one literal, separated by `;`.
    ManyStrings,
    TreatmentCategory,
    TumorType,
    TumorStage,
    HlaAllele,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotType::Integer => "integer",
            SlotType::Double => "double",
            SlotType::String => "string",
            SlotType::ManyStrings => "many strings",
            SlotType::TreatmentCategory => "treatment category",
            SlotType::TumorType => "tumor type",
            SlotType::TumorStage => "tumor stage",
            SlotType::HlaAllele => "HLA allele",
        };
        f.write_str(name)
    }
}

/// Ordered parameter shape of a leaf rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSignature {
    slots: &'static [SlotType],
}

impl InputSignature {
    pub const NONE: InputSignature = InputSignature::new(&[]);

    #[must_use]
    pub const fn new(slots: &'static [SlotType]) -> Self {
        Self { slots }
    }

    #[must_use]
    pub fn slots(&self) -> &'static [SlotType] {
        self.slots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// A signature may contain at most one many-strings slot.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.slots
            .iter()
            .filter(|slot| **slot == SlotType::ManyStrings)
            .count()
            <= 1
    }
}

impl fmt::Display for InputSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{slot}")?;
        }
        write!(f, "]")
    }
}

/// Maps every leaf rule to its parameter shape.
///
/// Built once and never mutated afterwards; completeness against the
/// catalogue is checked by [`RuleRegistry::verify`](crate::RuleRegistry::verify).
#[derive(Debug, Clone, Default)]
pub struct SignatureRegistry {
    signatures: HashMap<RuleId, InputSignature>,
}

impl SignatureRegistry {
    /// A registry with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The signatures of every leaf rule in the catalogue.
    #[must_use]
    pub fn standard() -> Self {
        let signatures = RuleId::leaves()
            .filter_map(|rule| standard_signature(rule).map(|sig| (rule, sig)))
            .collect();
        Self { signatures }
    }

    /// Add or replace the signature for `rule`.
    #[must_use]
    pub fn with(mut self, rule: RuleId, signature: InputSignature) -> Self {
        self.signatures.insert(rule, signature);
        self
    }

    /// Remove the signature for `rule`.
    #[must_use]
    pub fn without(mut self, rule: RuleId) -> Self {
        self.signatures.remove(&rule);
        self
    }

    #[must_use]
    pub fn get(&self, rule: RuleId) -> Option<&InputSignature> {
        self.signatures.get(&rule)
    }

    #[must_use]
    pub fn contains(&self, rule: RuleId) -> bool {
        self.signatures.contains_key(&rule)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// The built-in parameter shape of each rule; `None` for the composite operators.
#[must_use]
pub fn standard_signature(rule: RuleId) -> Option<InputSignature> {
    use SlotType::{
        Double, HlaAllele, Integer, ManyStrings, String, TreatmentCategory, TumorStage, TumorType,
    };

    let slots: &'static [SlotType] = match rule {
        RuleId::And | RuleId::Or | RuleId::Not | RuleId::WarnIf => return None,

        RuleId::IsMale
        | RuleId::IsFemale
        | RuleId::IsPregnant
        | RuleId::IsBreastfeeding
        | RuleId::IsAbleAndWillingToGiveAdequateInformedConsent
        | RuleId::HasActiveInfection
        | RuleId::HasLocallyAdvancedCancer
        | RuleId::HasMetastaticCancer
        | RuleId::HasBrainMetastases
        | RuleId::HasActiveBrainMetastases
        | RuleId::HasLiverMetastases
        | RuleId::HasMeasurableDisease
        | RuleId::HasBiopsyAmenableLesion
        | RuleId::MolecularResultsMustBeAvailable
        | RuleId::MsiSignature => &[],

        RuleId::IsAtLeastXYearsOld
        | RuleId::IsYoungerThanXYearsOld
        | RuleId::HasWhoStatusOfAtMostX
        | RuleId::HasWhoStatusOfExactlyX
        | RuleId::HasKarnofskyScoreOfAtLeastX
        | RuleId::HasHadAtLeastXSystemicTreatmentLines
        | RuleId::HasHadAtMostXSystemicTreatmentLines
        | RuleId::HasHadSurgeryWithinLastXWeeks
        | RuleId::HasToxicityCtcaeOfAtLeastGradeX => &[Integer],

        RuleId::HasInrUlnAtMostX
        | RuleId::HasPtUlnAtMostX
        | RuleId::HasApttUlnAtMostX
        | RuleId::HasAsatUlnAtMostX
        | RuleId::HasAlatUlnAtMostX
        | RuleId::HasTotalBilirubinUlnAtMostX
        | RuleId::HasCreatinineUlnAtMostX
        | RuleId::HasHemoglobinGPerDlOfAtLeastX
        | RuleId::HasNeutrophilsAbsOfAtLeastX
        | RuleId::HasThrombocytesAbsOfAtLeastX
        | RuleId::HasAlbuminGPerDlOfAtLeastX
        | RuleId::HasQtcfOfAtMostX
        | RuleId::HasLvefOfAtLeastX
        | RuleId::HasCumulativeAnthracyclineExposureOfAtMostXMgPerM2
        | RuleId::TmbOfAtLeastX => &[Double],

        RuleId::PatientWillBeParticipatingInCountryX
        | RuleId::CurrentlyGetsCypXInhibitingMedication
        | RuleId::IsEligibleForOnLabelTreatmentX
        | RuleId::HasPrimaryTumorBelongingToDoidTermX
        | RuleId::HasHadOtherConditionWithDoidTermX
        | RuleId::ActivationOrAmplificationOfGeneX
        | RuleId::InactivationOfGeneX
        | RuleId::FusionInGeneX => &[String],

        RuleId::CurrentlyGetsMedicationOfNameX | RuleId::HasHadTreatmentWithAnyDrugX => {
            &[ManyStrings]
        }

        RuleId::HasLabValueXOfAtLeastY => &[String, Double],
        RuleId::HasHadTreatmentWithCategoryX => &[TreatmentCategory],
        RuleId::HasHadCategoryXTreatmentOfTypesY
        | RuleId::HasHadCategoryXTreatmentIgnoringTypesY => &[TreatmentCategory, ManyStrings],
        RuleId::HasHadCategoryXTreatmentWithinYWeeks => &[TreatmentCategory, Integer],
        RuleId::HasHadTreatmentWithAnyDrugXWithinYWeeks => &[ManyStrings, Integer],
        RuleId::HasCancerOfTumorTypeX => &[TumorType],
        RuleId::HasTumorStageX => &[TumorStage],
        RuleId::MutationInGeneXOfAnyProteinImpactsY => &[String, ManyStrings],
        RuleId::AmplificationOfGeneXOfAtLeastYCopies
        | RuleId::ExpressionOfProteinXByIhcOfAtLeastY => &[String, Integer],
        RuleId::HasHlaTypeX => &[HlaAllele],
        RuleId::HasToxicityCtcaeOfAtLeastGradeXIgnoringY => &[Integer, ManyStrings],
    };
    Some(InputSignature::new(slots))
}
