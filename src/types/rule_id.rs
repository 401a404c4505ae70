use std::fmt;

macro_rules! rule_catalogue {
    ($($variant:ident => $name:literal,)+) => {
        /// Identifier of every rule a criterion may name, including the four
        /// composite operators.
        ///
        /// The catalogue is append-only: the textual names are persisted in trial
        /// definitions, so renaming or removing a variant breaks existing criteria.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        #[cfg_attr(feature = "serde", serde(into = "&'static str"))]
        pub enum RuleId {
            $($variant,)+
        }

        impl RuleId {
            /// Every identifier in catalogue order.
            pub const ALL: &'static [RuleId] = &[$(RuleId::$variant,)+];

            /// The name used for this rule in criterion text.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(RuleId::$variant => $name,)+
                }
            }

            /// Look up a rule by its exact (case-sensitive) criterion name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<RuleId> {
                match name {
                    $($name => Some(RuleId::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

rule_catalogue! {
    And => "AND",
    Or => "OR",
    Not => "NOT",
    WarnIf => "WARN_IF",

    // General
    IsAtLeastXYearsOld => "IS_AT_LEAST_X_YEARS_OLD",
    IsYoungerThanXYearsOld => "IS_YOUNGER_THAN_X_YEARS_OLD",
    IsMale => "IS_MALE",
    IsFemale => "IS_FEMALE",
    IsPregnant => "IS_PREGNANT",
    IsBreastfeeding => "IS_BREASTFEEDING",
    IsAbleAndWillingToGiveAdequateInformedConsent => "IS_ABLE_AND_WILLING_TO_GIVE_ADEQUATE_INFORMED_CONSENT",
    PatientWillBeParticipatingInCountryX => "PATIENT_WILL_BE_PARTICIPATING_IN_COUNTRY_X",
    HasWhoStatusOfAtMostX => "HAS_WHO_STATUS_OF_AT_MOST_X",
    HasWhoStatusOfExactlyX => "HAS_WHO_STATUS_OF_EXACTLY_X",
    HasKarnofskyScoreOfAtLeastX => "HAS_KARNOFSKY_SCORE_OF_AT_LEAST_X",
    HasActiveInfection => "HAS_ACTIVE_INFECTION",
    CurrentlyGetsMedicationOfNameX => "CURRENTLY_GETS_MEDICATION_OF_NAME_X",
    CurrentlyGetsCypXInhibitingMedication => "CURRENTLY_GETS_CYP_X_INHIBITING_MEDICATION",

    // Laboratory and cardiac function
    HasInrUlnAtMostX => "HAS_INR_ULN_AT_MOST_X",
    HasPtUlnAtMostX => "HAS_PT_ULN_AT_MOST_X",
    HasApttUlnAtMostX => "HAS_APTT_ULN_AT_MOST_X",
    HasAsatUlnAtMostX => "HAS_ASAT_ULN_AT_MOST_X",
    HasAlatUlnAtMostX => "HAS_ALAT_ULN_AT_MOST_X",
    HasTotalBilirubinUlnAtMostX => "HAS_TOTAL_BILIRUBIN_ULN_AT_MOST_X",
    HasCreatinineUlnAtMostX => "HAS_CREATININE_ULN_AT_MOST_X",
    HasHemoglobinGPerDlOfAtLeastX => "HAS_HEMOGLOBIN_G_PER_DL_OF_AT_LEAST_X",
    HasNeutrophilsAbsOfAtLeastX => "HAS_NEUTROPHILS_ABS_OF_AT_LEAST_X",
    HasThrombocytesAbsOfAtLeastX => "HAS_THROMBOCYTES_ABS_OF_AT_LEAST_X",
    HasAlbuminGPerDlOfAtLeastX => "HAS_ALBUMIN_G_PER_DL_OF_AT_LEAST_X",
    HasLabValueXOfAtLeastY => "HAS_LAB_VALUE_X_OF_AT_LEAST_Y",
    HasQtcfOfAtMostX => "HAS_QTCF_OF_AT_MOST_X",
    HasLvefOfAtLeastX => "HAS_LVEF_OF_AT_LEAST_X",

    // Treatment history
    HasHadAtLeastXSystemicTreatmentLines => "HAS_HAD_AT_LEAST_X_SYSTEMIC_TREATMENT_LINES",
    HasHadAtMostXSystemicTreatmentLines => "HAS_HAD_AT_MOST_X_SYSTEMIC_TREATMENT_LINES",
    HasHadTreatmentWithCategoryX => "HAS_HAD_TREATMENT_WITH_CATEGORY_X",
    HasHadCategoryXTreatmentOfTypesY => "HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y",
    HasHadCategoryXTreatmentIgnoringTypesY => "HAS_HAD_CATEGORY_X_TREATMENT_IGNORING_TYPES_Y",
    HasHadCategoryXTreatmentWithinYWeeks => "HAS_HAD_CATEGORY_X_TREATMENT_WITHIN_Y_WEEKS",
    HasHadTreatmentWithAnyDrugX => "HAS_HAD_TREATMENT_WITH_ANY_DRUG_X",
    HasHadTreatmentWithAnyDrugXWithinYWeeks => "HAS_HAD_TREATMENT_WITH_ANY_DRUG_X_WITHIN_Y_WEEKS",
    HasCumulativeAnthracyclineExposureOfAtMostXMgPerM2 => "HAS_CUMULATIVE_ANTHRACYCLINE_EXPOSURE_OF_AT_MOST_X_MG_PER_M2",
    HasHadSurgeryWithinLastXWeeks => "HAS_HAD_SURGERY_WITHIN_LAST_X_WEEKS",
    IsEligibleForOnLabelTreatmentX => "IS_ELIGIBLE_FOR_ON_LABEL_TREATMENT_X",

    // Tumor and comorbidities
    HasPrimaryTumorBelongingToDoidTermX => "HAS_PRIMARY_TUMOR_BELONGING_TO_DOID_TERM_X",
    HasCancerOfTumorTypeX => "HAS_CANCER_OF_TUMOR_TYPE_X",
    HasTumorStageX => "HAS_TUMOR_STAGE_X",
    HasLocallyAdvancedCancer => "HAS_LOCALLY_ADVANCED_CANCER",
    HasMetastaticCancer => "HAS_METASTATIC_CANCER",
    HasBrainMetastases => "HAS_BRAIN_METASTASES",
    HasActiveBrainMetastases => "HAS_ACTIVE_BRAIN_METASTASES",
    HasLiverMetastases => "HAS_LIVER_METASTASES",
    HasMeasurableDisease => "HAS_MEASURABLE_DISEASE",
    HasBiopsyAmenableLesion => "HAS_BIOPSY_AMENABLE_LESION",
    HasHadOtherConditionWithDoidTermX => "HAS_HAD_OTHER_CONDITION_WITH_DOID_TERM_X",

    // Molecular
    MolecularResultsMustBeAvailable => "MOLECULAR_RESULTS_MUST_BE_AVAILABLE",
    ActivationOrAmplificationOfGeneX => "ACTIVATION_OR_AMPLIFICATION_OF_GENE_X",
    InactivationOfGeneX => "INACTIVATION_OF_GENE_X",
    MutationInGeneXOfAnyProteinImpactsY => "MUTATION_IN_GENE_X_OF_ANY_PROTEIN_IMPACTS_Y",
    AmplificationOfGeneXOfAtLeastYCopies => "AMPLIFICATION_OF_GENE_X_OF_AT_LEAST_Y_COPIES",
    FusionInGeneX => "FUSION_IN_GENE_X",
    MsiSignature => "MSI_SIGNATURE",
    TmbOfAtLeastX => "TMB_OF_AT_LEAST_X",
    HasHlaTypeX => "HAS_HLA_TYPE_X",
    ExpressionOfProteinXByIhcOfAtLeastY => "EXPRESSION_OF_PROTEIN_X_BY_IHC_OF_AT_LEAST_Y",

    // Toxicities
    HasToxicityCtcaeOfAtLeastGradeX => "HAS_TOXICITY_CTCAE_OF_AT_LEAST_GRADE_X",
    HasToxicityCtcaeOfAtLeastGradeXIgnoringY => "HAS_TOXICITY_CTCAE_OF_AT_LEAST_GRADE_X_IGNORING_Y",
}

impl RuleId {
    /// The composite operator this identifier stands for, if any.
    #[must_use]
    pub fn as_composite(self) -> Option<CompositeOp> {
        match self {
            RuleId::And => Some(CompositeOp::And),
            RuleId::Or => Some(CompositeOp::Or),
            RuleId::Not => Some(CompositeOp::Not),
            RuleId::WarnIf => Some(CompositeOp::WarnIf),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_composite(self) -> bool {
        self.as_composite().is_some()
    }

    /// Every non-composite identifier, i.e. the rules that need a signature and a factory.
    pub fn leaves() -> impl Iterator<Item = RuleId> {
        RuleId::ALL.iter().copied().filter(|rule| !rule.is_composite())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RuleId> for &'static str {
    fn from(rule: RuleId) -> Self {
        rule.as_str()
    }
}

/// Boolean composition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeOp {
    And,
    Or,
    Not,
    WarnIf,
}

/// Number of nested expressions a composite operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    #[must_use]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

impl CompositeOp {
    pub const ALL: [CompositeOp; 4] = [
        CompositeOp::And,
        CompositeOp::Or,
        CompositeOp::Not,
        CompositeOp::WarnIf,
    ];

    #[must_use]
    pub fn rule_id(self) -> RuleId {
        match self {
            CompositeOp::And => RuleId::And,
            CompositeOp::Or => RuleId::Or,
            CompositeOp::Not => RuleId::Not,
            CompositeOp::WarnIf => RuleId::WarnIf,
        }
    }

    #[must_use]
    pub fn arity(self) -> Arity {
        match self {
            CompositeOp::And | CompositeOp::Or => Arity::AtLeast(2),
            CompositeOp::Not | CompositeOp::WarnIf => Arity::Exactly(1),
        }
    }
}

impl fmt::Display for CompositeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule_id().as_str())
    }
}
