//! Enumerated parameter values with fixed display-name tables.
//!
//! Criterion literals for these slots are matched exactly (case-sensitive)
//! against the display names listed here.

use std::fmt;

macro_rules! display_table {
    ($(#[$meta:meta])* $ty:ident { $($variant:ident => $name:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $ty {
            $($variant,)+
        }

        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant,)+];

            #[must_use]
            pub fn display_name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }

            #[must_use]
            pub fn from_display_name(name: &str) -> Option<$ty> {
                match name {
                    $($name => Some($ty::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display_name())
            }
        }
    };
}

display_table! {
    /// Category of an anti-cancer (or supportive) treatment.
    TreatmentCategory {
        Chemotherapy => "CHEMOTHERAPY",
        TargetedTherapy => "TARGETED_THERAPY",
        Immunotherapy => "IMMUNOTHERAPY",
        HormoneTherapy => "HORMONE_THERAPY",
        Radiotherapy => "RADIOTHERAPY",
        Surgery => "SURGERY",
        Transplantation => "TRANSPLANTATION",
        Ablation => "ABLATION",
        CarT => "CAR_T",
        TcrT => "TCR_T",
        GeneTherapy => "GENE_THERAPY",
        AntiviralTherapy => "ANTIVIRAL_THERAPY",
        SupportiveTreatment => "SUPPORTIVE_TREATMENT",
    }
}

impl TreatmentCategory {
    /// Whether a treatment of this category counts as a systemic treatment line.
    #[must_use]
    pub fn is_systemic(self) -> bool {
        matches!(
            self,
            TreatmentCategory::Chemotherapy
                | TreatmentCategory::TargetedTherapy
                | TreatmentCategory::Immunotherapy
                | TreatmentCategory::HormoneTherapy
                | TreatmentCategory::CarT
                | TreatmentCategory::TcrT
                | TreatmentCategory::GeneTherapy
        )
    }
}

display_table! {
    /// Histological tumor type, each anchored to a disease-ontology term.
    TumorType {
        Carcinoma => "CARCINOMA",
        Adenocarcinoma => "ADENOCARCINOMA",
        SquamousCellCarcinoma => "SQUAMOUS_CELL_CARCINOMA",
        SmallCellCarcinoma => "SMALL_CELL_CARCINOMA",
        Melanoma => "MELANOMA",
        Sarcoma => "SARCOMA",
        Lymphoma => "LYMPHOMA",
        Glioma => "GLIOMA",
        Mesothelioma => "MESOTHELIOMA",
        NeuroendocrineTumor => "NEUROENDOCRINE_TUMOR",
    }
}

impl TumorType {
    /// The disease-ontology (DOID) term for this tumor type.
    #[must_use]
    pub fn doid(self) -> &'static str {
        match self {
            TumorType::Carcinoma => "305",
            TumorType::Adenocarcinoma => "299",
            TumorType::SquamousCellCarcinoma => "1749",
            TumorType::SmallCellCarcinoma => "0050685",
            TumorType::Melanoma => "1909",
            TumorType::Sarcoma => "1115",
            TumorType::Lymphoma => "0060058",
            TumorType::Glioma => "0060108",
            TumorType::Mesothelioma => "1790",
            TumorType::NeuroendocrineTumor => "169",
        }
    }
}

display_table! {
    /// TNM-derived overall tumor stage, including sub-stages.
    TumorStage {
        I => "I",
        II => "II",
        IIA => "IIA",
        IIB => "IIB",
        IIC => "IIC",
        III => "III",
        IIIA => "IIIA",
        IIIB => "IIIB",
        IIIC => "IIIC",
        IV => "IV",
    }
}

impl TumorStage {
    /// The main stage a sub-stage belongs to (`IIIA` -> `III`); main stages map to themselves.
    #[must_use]
    pub fn main_stage(self) -> TumorStage {
        match self {
            TumorStage::IIA | TumorStage::IIB | TumorStage::IIC => TumorStage::II,
            TumorStage::IIIA | TumorStage::IIIB | TumorStage::IIIC => TumorStage::III,
            other => other,
        }
    }

    #[must_use]
    pub fn is_main_stage(self) -> bool {
        self.main_stage() == self
    }
}

display_table! {
    /// HLA class I alleles recognised in criteria, in standard nomenclature.
    HlaAllele {
        A0101 => "A*01:01",
        A0201 => "A*02:01",
        A0301 => "A*03:01",
        A1101 => "A*11:01",
        A2402 => "A*24:02",
        B0702 => "B*07:02",
        B0801 => "B*08:01",
        B4402 => "B*44:02",
        C0701 => "C*07:01",
        C0702 => "C*07:02",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_round_trip() {
        for &c in TreatmentCategory::ALL {
            assert_eq!(TreatmentCategory::from_display_name(c.display_name()), Some(c));
        }
        for &t in TumorType::ALL {
            assert_eq!(TumorType::from_display_name(t.display_name()), Some(t));
        }
        for &s in TumorStage::ALL {
            assert_eq!(TumorStage::from_display_name(s.display_name()), Some(s));
        }
        for &h in HlaAllele::ALL {
            assert_eq!(HlaAllele::from_display_name(h.display_name()), Some(h));
        }
    }

    #[test]
    fn matching_is_exact() {
        assert_eq!(TreatmentCategory::from_display_name("chemotherapy"), None);
        assert_eq!(TreatmentCategory::from_display_name(" CHEMOTHERAPY"), None);
        assert_eq!(HlaAllele::from_display_name("A*0201"), None);
        assert_eq!(TumorStage::from_display_name("iv"), None);
    }

    #[test]
    fn sub_stages() {
        assert_eq!(TumorStage::IIIB.main_stage(), TumorStage::III);
        assert_eq!(TumorStage::IV.main_stage(), TumorStage::IV);
        assert!(TumorStage::II.is_main_stage());
        assert!(!TumorStage::IIA.is_main_stage());
    }

    #[test]
    fn systemic_categories() {
        assert!(TreatmentCategory::Chemotherapy.is_systemic());
        assert!(!TreatmentCategory::Radiotherapy.is_systemic());
        assert!(!TreatmentCategory::Surgery.is_systemic());
    }
}
