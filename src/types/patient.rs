//! Read contract for patient data, plus an in-memory record.
//!
//! The engine only reads through [`PatientRecord`]. How a record is populated
//! (feeds, curation, unit normalisation) is outside this crate; [`Patient`] is
//! a plain builder-style implementation for tests, demos and simple callers.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::codes::{HlaAllele, TreatmentCategory, TumorStage};

/// Laboratory codes read by the standard lab rules.
pub mod lab {
    pub const INR: &str = "INR";
    pub const PT: &str = "PT";
    pub const APTT: &str = "APTT";
    pub const ASAT: &str = "ASAT";
    pub const ALAT: &str = "ALAT";
    pub const TOTAL_BILIRUBIN: &str = "TBIL";
    pub const CREATININE: &str = "CREA";
    /// g/dL
    pub const HEMOGLOBIN: &str = "HB";
    /// 10^9/L
    pub const NEUTROPHILS: &str = "NEUTRO";
    /// 10^9/L
    pub const THROMBOCYTES: &str = "THROMBO";
    /// g/dL
    pub const ALBUMIN: &str = "ALB";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

/// One measured lab value with its reference range, if known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabValue {
    pub value: f64,
    pub upper_limit: Option<f64>,
    pub lower_limit: Option<f64>,
}

impl LabValue {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            upper_limit: None,
            lower_limit: None,
        }
    }

    #[must_use]
    pub fn with_upper_limit(mut self, limit: f64) -> Self {
        self.upper_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_lower_limit(mut self, limit: f64) -> Self {
        self.lower_limit = Some(limit);
        self
    }
}

/// One line of prior anti-cancer treatment.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorTreatment {
    pub name: String,
    pub category: TreatmentCategory,
    pub types: Vec<String>,
    pub drugs: Vec<String>,
    pub start_date: Option<NaiveDate>,
    /// Cumulative anthracycline dose in mg/m², when recorded.
    pub cumulative_dose_mg_per_m2: Option<f64>,
}

impl PriorTreatment {
    #[must_use]
    pub fn new(name: impl Into<String>, category: TreatmentCategory) -> Self {
        Self {
            name: name.into(),
            category,
            types: Vec::new(),
            drugs: Vec::new(),
            start_date: None,
            cumulative_dose_mg_per_m2: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, treatment_type: impl Into<String>) -> Self {
        self.types.push(treatment_type.into());
        self
    }

    #[must_use]
    pub fn with_drug(mut self, drug: impl Into<String>) -> Self {
        self.drugs.push(drug.into());
        self
    }

    #[must_use]
    pub fn started(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_cumulative_dose(mut self, mg_per_m2: f64) -> Self {
        self.cumulative_dose_mg_per_m2 = Some(mg_per_m2);
        self
    }

    /// Whether this treatment counts as a systemic line.
    #[must_use]
    pub fn is_systemic(&self) -> bool {
        self.category.is_systemic()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surgery {
    pub name: String,
    pub date: Option<NaiveDate>,
}

/// Primary tumor details and lesion sites.
///
/// Lesion flags are `None` when the site was not assessed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TumorDetails {
    pub doids: Vec<String>,
    pub stage: Option<TumorStage>,
    pub has_brain_lesions: Option<bool>,
    pub has_active_brain_lesions: Option<bool>,
    pub has_liver_lesions: Option<bool>,
    pub has_measurable_disease: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneEvent {
    Activation { gene: String },
    Amplification { gene: String, copies: u32 },
    Inactivation { gene: String },
    Mutation { gene: String, protein_impact: String },
    Fusion { five_prime: String, three_prime: String },
}

impl GeneEvent {
    /// Whether this event involves `gene` (either partner for fusions).
    #[must_use]
    pub fn involves(&self, gene: &str) -> bool {
        match self {
            GeneEvent::Activation { gene: g }
            | GeneEvent::Amplification { gene: g, .. }
            | GeneEvent::Inactivation { gene: g }
            | GeneEvent::Mutation { gene: g, .. } => g == gene,
            GeneEvent::Fusion {
                five_prime,
                three_prime,
            } => five_prime == gene || three_prime == gene,
        }
    }
}

/// Results of molecular testing. Absent on a patient means no test was done.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MolecularRecord {
    pub events: Vec<GeneEvent>,
    pub microsatellite_unstable: Option<bool>,
    /// Mutations per megabase.
    pub tumor_mutational_burden: Option<f64>,
    pub hla_alleles: Vec<HlaAllele>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toxicity {
    pub name: String,
    /// CTCAE grade; `None` when recorded without a grade.
    pub grade: Option<u8>,
}

/// Read-only access to one patient's clinical data.
///
/// `None` means the data point is unknown; leaves answer UNDETERMINED for it.
/// Implementations must be shareable across threads so a bound trial can
/// evaluate patients in parallel.
pub trait PatientRecord: Send + Sync {
    fn birth_year(&self) -> Option<i32>;
    fn sex(&self) -> Option<Sex>;
    fn is_pregnant(&self) -> Option<bool>;
    fn who_status(&self) -> Option<u8>;
    fn lab_value(&self, code: &str) -> Option<LabValue>;
    /// QTcF interval in ms.
    fn qtcf(&self) -> Option<f64>;
    /// Left ventricular ejection fraction in percent.
    fn lvef(&self) -> Option<f64>;
    fn prior_treatments(&self) -> &[PriorTreatment];
    fn surgeries(&self) -> &[Surgery];
    fn tumor(&self) -> Option<&TumorDetails>;
    fn molecular(&self) -> Option<&MolecularRecord>;
    fn toxicities(&self) -> &[Toxicity];
    /// DOIDs of other (non-tumor) conditions.
    fn condition_doids(&self) -> &[String];
    fn has_active_infection(&self) -> Option<bool>;
    /// Current medication names; `None` when the medication list is unknown.
    fn medications(&self) -> Option<&[String]>;
}

/// An in-memory [`PatientRecord`] built with `with_*` setters.
#[derive(Debug, Clone, Default)]
pub struct Patient {
    birth_year: Option<i32>,
    sex: Option<Sex>,
    pregnant: Option<bool>,
    who_status: Option<u8>,
    labs: HashMap<String, LabValue>,
    qtcf: Option<f64>,
    lvef: Option<f64>,
    treatments: Vec<PriorTreatment>,
    surgeries: Vec<Surgery>,
    tumor: Option<TumorDetails>,
    molecular: Option<MolecularRecord>,
    toxicities: Vec<Toxicity>,
    conditions: Vec<String>,
    active_infection: Option<bool>,
    medications: Option<Vec<String>>,
}

impl Patient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    #[must_use]
    pub fn with_pregnancy(mut self, pregnant: bool) -> Self {
        self.pregnant = Some(pregnant);
        self
    }

    #[must_use]
    pub fn with_who_status(mut self, status: u8) -> Self {
        self.who_status = Some(status);
        self
    }

    #[must_use]
    pub fn with_lab(mut self, code: impl Into<String>, value: LabValue) -> Self {
        self.labs.insert(code.into(), value);
        self
    }

    #[must_use]
    pub fn with_qtcf(mut self, ms: f64) -> Self {
        self.qtcf = Some(ms);
        self
    }

    #[must_use]
    pub fn with_lvef(mut self, percent: f64) -> Self {
        self.lvef = Some(percent);
        self
    }

    #[must_use]
    pub fn with_treatment(mut self, treatment: PriorTreatment) -> Self {
        self.treatments.push(treatment);
        self
    }

    #[must_use]
    pub fn with_surgery(mut self, name: impl Into<String>, date: Option<NaiveDate>) -> Self {
        self.surgeries.push(Surgery {
            name: name.into(),
            date,
        });
        self
    }

    #[must_use]
    pub fn with_tumor(mut self, tumor: TumorDetails) -> Self {
        self.tumor = Some(tumor);
        self
    }

    #[must_use]
    pub fn with_molecular(mut self, molecular: MolecularRecord) -> Self {
        self.molecular = Some(molecular);
        self
    }

    #[must_use]
    pub fn with_toxicity(mut self, name: impl Into<String>, grade: Option<u8>) -> Self {
        self.toxicities.push(Toxicity {
            name: name.into(),
            grade,
        });
        self
    }

    #[must_use]
    pub fn with_condition(mut self, doid: impl Into<String>) -> Self {
        self.conditions.push(doid.into());
        self
    }

    #[must_use]
    pub fn with_active_infection(mut self, active: bool) -> Self {
        self.active_infection = Some(active);
        self
    }

    /// Record a current medication; the first call marks the list as known.
    #[must_use]
    pub fn with_medication(mut self, name: impl Into<String>) -> Self {
        self.medications.get_or_insert_with(Vec::new).push(name.into());
        self
    }

    /// Mark the medication list as known and empty.
    #[must_use]
    pub fn with_no_medications(mut self) -> Self {
        self.medications.get_or_insert_with(Vec::new);
        self
    }
}

impl PatientRecord for Patient {
    fn birth_year(&self) -> Option<i32> {
        self.birth_year
    }

    fn sex(&self) -> Option<Sex> {
        self.sex
    }

    fn is_pregnant(&self) -> Option<bool> {
        self.pregnant
    }

    fn who_status(&self) -> Option<u8> {
        self.who_status
    }

    fn lab_value(&self, code: &str) -> Option<LabValue> {
        self.labs.get(code).copied()
    }

    fn qtcf(&self) -> Option<f64> {
        self.qtcf
    }

    fn lvef(&self) -> Option<f64> {
        self.lvef
    }

    fn prior_treatments(&self) -> &[PriorTreatment] {
        &self.treatments
    }

    fn surgeries(&self) -> &[Surgery] {
        &self.surgeries
    }

    fn tumor(&self) -> Option<&TumorDetails> {
        self.tumor.as_ref()
    }

    fn molecular(&self) -> Option<&MolecularRecord> {
        self.molecular.as_ref()
    }

    fn toxicities(&self) -> &[Toxicity] {
        &self.toxicities
    }

    fn condition_doids(&self) -> &[String] {
        &self.conditions
    }

    fn has_active_infection(&self) -> Option<bool> {
        self.active_infection
    }

    fn medications(&self) -> Option<&[String]> {
        self.medications.as_deref()
    }
}
