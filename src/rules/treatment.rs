use std::sync::Arc;

use super::{contains_ignore_case, leaf_fn, stub, window_start, within_window};
use crate::registry::RuleRegistry;
use crate::types::{Evaluation, Outcome, PriorTreatment, RuleId, SynonymTable};

const ANTHRACYCLINE: &str = "ANTHRACYCLINE";

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(RuleId::HasHadAtLeastXSystemicTreatmentLines, |params, _| {
        let min = params.integer(0)?;
        Ok(leaf_fn(move |patient| {
            let lines = systemic_lines(patient.prior_treatments());
            Ok(if lines >= min {
                Evaluation::pass(
                    format!("Patient has had {lines} systemic treatment line(s), at least {min}"),
                    "Adequate number of systemic treatments",
                )
            } else {
                Evaluation::fail(
                    format!("Patient has had {lines} systemic treatment line(s), fewer than {min}"),
                    "Insufficient systemic treatments",
                )
            })
        }))
    });

    registry.register(RuleId::HasHadAtMostXSystemicTreatmentLines, |params, _| {
        let max = params.integer(0)?;
        Ok(leaf_fn(move |patient| {
            let lines = systemic_lines(patient.prior_treatments());
            Ok(if lines <= max {
                Evaluation::pass(
                    format!("Patient has had {lines} systemic treatment line(s), at most {max}"),
                    "Adequate number of systemic treatments",
                )
            } else {
                Evaluation::fail(
                    format!("Patient has had {lines} systemic treatment line(s), more than {max}"),
                    "Too many systemic treatments",
                )
            })
        }))
    });

    registry.register(RuleId::HasHadTreatmentWithCategoryX, |params, _| {
        let category = params.treatment(0)?;
        Ok(leaf_fn(move |patient| {
            let had = patient
                .prior_treatments()
                .iter()
                .any(|t| t.category == category);
            Ok(if had {
                Evaluation::pass(
                    format!("Patient has received {category}"),
                    format!("{category}"),
                )
            } else {
                Evaluation::fail(
                    format!("Patient has not received {category}"),
                    format!("No {category}"),
                )
            })
        }))
    });

    registry.register(RuleId::HasHadCategoryXTreatmentOfTypesY, |params, ctx| {
        let category = params.treatment(0)?;
        let types = params.strings(1)?.to_vec();
        let synonyms = Arc::clone(ctx.synonyms());
        Ok(leaf_fn(move |patient| {
            let of_category: Vec<&PriorTreatment> = patient
                .prior_treatments()
                .iter()
                .filter(|t| t.category == category)
                .collect();
            let listed = types.join(", ");
            Ok(
                if of_category
                    .iter()
                    .any(|t| matches_any_type(t, &types, &synonyms))
                {
                    Evaluation::pass(
                        format!("Patient has received {category} of type {listed}"),
                        format!("{category} of type {listed}"),
                    )
                } else if of_category
                    .iter()
                    .any(|t| t.types.is_empty() && t.drugs.is_empty())
                {
                    Evaluation::undetermined(
                        format!("Patient has received {category} of unknown type"),
                        format!("{category} type unknown"),
                    )
                } else {
                    Evaluation::fail(
                        format!("Patient has not received {category} of type {listed}"),
                        format!("No {category} of type {listed}"),
                    )
                },
            )
        }))
    });

    registry.register(RuleId::HasHadCategoryXTreatmentIgnoringTypesY, |params, ctx| {
        let category = params.treatment(0)?;
        let ignored = params.strings(1)?.to_vec();
        let synonyms = Arc::clone(ctx.synonyms());
        Ok(leaf_fn(move |patient| {
            let had = patient
                .prior_treatments()
                .iter()
                .filter(|t| t.category == category)
                .any(|t| !matches_any_type(t, &ignored, &synonyms));
            let listed = ignored.join(", ");
            Ok(if had {
                Evaluation::pass(
                    format!("Patient has received {category} other than {listed}"),
                    format!("{category}"),
                )
            } else {
                Evaluation::fail(
                    format!("Patient has not received {category} other than {listed}"),
                    format!("No {category}"),
                )
            })
        }))
    });

    registry.register(RuleId::HasHadCategoryXTreatmentWithinYWeeks, |params, ctx| {
        let category = params.treatment(0)?;
        let weeks = params.integer(1)?;
        let clock = Arc::clone(ctx.clock());
        Ok(leaf_fn(move |patient| {
            let start = window_start(clock.today(), weeks);
            let dates = patient
                .prior_treatments()
                .iter()
                .filter(|t| t.category == category)
                .map(|t| t.start_date);
            Ok(window_evaluation(
                within_window(dates, start),
                &format!("{category} within the last {weeks} weeks"),
            ))
        }))
    });

    registry.register(RuleId::HasHadTreatmentWithAnyDrugX, |params, _| {
        let drugs = params.strings(0)?.to_vec();
        Ok(leaf_fn(move |patient| {
            let had = patient
                .prior_treatments()
                .iter()
                .any(|t| uses_any_drug(t, &drugs));
            let listed = drugs.join(", ");
            Ok(if had {
                Evaluation::pass(
                    format!("Patient has received one of {listed}"),
                    "Drug received",
                )
            } else {
                Evaluation::fail(
                    format!("Patient has not received any of {listed}"),
                    "Drug not received",
                )
            })
        }))
    });

    registry.register(RuleId::HasHadTreatmentWithAnyDrugXWithinYWeeks, |params, ctx| {
        let drugs = params.strings(0)?.to_vec();
        let weeks = params.integer(1)?;
        let clock = Arc::clone(ctx.clock());
        Ok(leaf_fn(move |patient| {
            let start = window_start(clock.today(), weeks);
            let dates = patient
                .prior_treatments()
                .iter()
                .filter(|t| uses_any_drug(t, &drugs))
                .map(|t| t.start_date);
            Ok(window_evaluation(
                within_window(dates, start),
                &format!("one of {} within the last {weeks} weeks", drugs.join(", ")),
            ))
        }))
    });

    registry.register(
        RuleId::HasCumulativeAnthracyclineExposureOfAtMostXMgPerM2,
        |params, ctx| {
            let max = params.double(0)?;
            let synonyms = Arc::clone(ctx.synonyms());
            Ok(leaf_fn(move |patient| {
                let anthracyclines: Vec<&PriorTreatment> = patient
                    .prior_treatments()
                    .iter()
                    .filter(|t| matches_type(t, ANTHRACYCLINE, &synonyms))
                    .collect();
                let known: f64 = anthracyclines
                    .iter()
                    .filter_map(|t| t.cumulative_dose_mg_per_m2)
                    .sum();
                let any_unknown = anthracyclines
                    .iter()
                    .any(|t| t.cumulative_dose_mg_per_m2.is_none());
                // A known excess fails even when other doses are missing.
                Ok(if known > max {
                    Evaluation::fail(
                        format!("Cumulative anthracycline exposure of {known} mg/m2 exceeds {max} mg/m2"),
                        "Excessive anthracycline exposure",
                    )
                } else if any_unknown {
                    Evaluation::undetermined(
                        "Anthracycline dose is unknown for at least one prior treatment",
                        "Anthracycline exposure undetermined",
                    )
                } else {
                    Evaluation::pass(
                        format!("Cumulative anthracycline exposure of {known} mg/m2 is at most {max} mg/m2"),
                        "Acceptable anthracycline exposure",
                    )
                })
            }))
        },
    );

    registry.register(RuleId::HasHadSurgeryWithinLastXWeeks, |params, ctx| {
        let weeks = params.integer(0)?;
        let clock = Arc::clone(ctx.clock());
        Ok(leaf_fn(move |patient| {
            let start = window_start(clock.today(), weeks);
            let dates = patient.surgeries().iter().map(|s| s.date);
            Ok(window_evaluation(
                within_window(dates, start),
                &format!("surgery within the last {weeks} weeks"),
            ))
        }))
    });

    stub(
        registry,
        RuleId::IsEligibleForOnLabelTreatmentX,
        Outcome::NotImplemented,
        "on-label eligibility requires a treatment database",
    );
}

fn systemic_lines(treatments: &[PriorTreatment]) -> i64 {
    let count = treatments.iter().filter(|t| t.is_systemic()).count();
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn matches_type(treatment: &PriorTreatment, wanted: &str, synonyms: &SynonymTable) -> bool {
    contains_ignore_case(&treatment.types, wanted)
        || treatment.drugs.iter().any(|d| synonyms.contains(wanted, d))
}

fn matches_any_type(
    treatment: &PriorTreatment,
    wanted: &[String],
    synonyms: &SynonymTable,
) -> bool {
    wanted.iter().any(|w| matches_type(treatment, w, synonyms))
}

fn uses_any_drug(treatment: &PriorTreatment, drugs: &[String]) -> bool {
    treatment
        .drugs
        .iter()
        .any(|d| contains_ignore_case(drugs, d))
}

fn window_evaluation(outcome: Outcome, what: &str) -> Evaluation {
    match outcome {
        Outcome::Pass => Evaluation::pass(format!("Patient has had {what}"), "Recent treatment"),
        Outcome::Undetermined => Evaluation::undetermined(
            format!("Unknown whether patient has had {what}: date missing"),
            "Treatment date unknown",
        ),
        _ => Evaluation::fail(
            format!("Patient has not had {what}"),
            "No recent treatment",
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::testing::{date, run};
    use crate::types::{Outcome, Patient, PriorTreatment, TreatmentCategory};

    fn chemo(name: &str) -> PriorTreatment {
        PriorTreatment::new(name, TreatmentCategory::Chemotherapy)
    }

    #[test]
    fn systemic_line_counts() {
        let p = Patient::new()
            .with_treatment(chemo("FOLFOX"))
            .with_treatment(PriorTreatment::new("RT", TreatmentCategory::Radiotherapy))
            .with_treatment(PriorTreatment::new("pembro", TreatmentCategory::Immunotherapy));
        assert_eq!(
            run("HAS_HAD_AT_LEAST_X_SYSTEMIC_TREATMENT_LINES[2]", &p).outcome(),
            Outcome::Pass
        );
        assert_eq!(
            run("HAS_HAD_AT_MOST_X_SYSTEMIC_TREATMENT_LINES[1]", &p).outcome(),
            Outcome::Fail
        );
    }

    #[test]
    fn category_and_types_use_synonyms() {
        let p = Patient::new().with_treatment(chemo("AC").with_drug("Doxorubicin"));
        assert_eq!(
            run("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y[CHEMOTHERAPY, ANTHRACYCLINE;TAXANE]", &p)
                .outcome(),
            Outcome::Pass
        );
        assert_eq!(
            run("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y[CHEMOTHERAPY, PLATINUM]", &p).outcome(),
            Outcome::Fail
        );
        assert_eq!(
            run("HAS_HAD_CATEGORY_X_TREATMENT_IGNORING_TYPES_Y[CHEMOTHERAPY, ANTHRACYCLINE]", &p)
                .outcome(),
            Outcome::Fail
        );
        assert_eq!(
            run("HAS_HAD_TREATMENT_WITH_CATEGORY_X[CHEMOTHERAPY]", &p).outcome(),
            Outcome::Pass
        );
    }

    #[test]
    fn untyped_treatment_is_undetermined() {
        let p = Patient::new().with_treatment(chemo("unknown regimen"));
        assert_eq!(
            run("HAS_HAD_CATEGORY_X_TREATMENT_OF_TYPES_Y[CHEMOTHERAPY, PLATINUM]", &p).outcome(),
            Outcome::Undetermined
        );
    }

    #[test]
    fn within_weeks() {
        // reference date 2024-06-01
        let p = Patient::new()
            .with_treatment(chemo("recent").with_drug("cisplatin").started(date(2024, 5, 20)))
            .with_treatment(PriorTreatment::new("old", TreatmentCategory::TargetedTherapy)
                .started(date(2023, 1, 1)));
        assert_eq!(
            run("HAS_HAD_CATEGORY_X_TREATMENT_WITHIN_Y_WEEKS[CHEMOTHERAPY, 4]", &p).outcome(),
            Outcome::Pass
        );
        assert_eq!(
            run("HAS_HAD_CATEGORY_X_TREATMENT_WITHIN_Y_WEEKS[TARGETED_THERAPY, 4]", &p).outcome(),
            Outcome::Fail
        );
        assert_eq!(
            run("HAS_HAD_TREATMENT_WITH_ANY_DRUG_X_WITHIN_Y_WEEKS[Cisplatin;carboplatin, 2]", &p)
                .outcome(),
            Outcome::Pass
        );
        assert_eq!(
            run("HAS_HAD_TREATMENT_WITH_ANY_DRUG_X[carboplatin]", &p).outcome(),
            Outcome::Fail
        );
    }

    #[test]
    fn anthracycline_exposure() {
        let text = "HAS_CUMULATIVE_ANTHRACYCLINE_EXPOSURE_OF_AT_MOST_X_MG_PER_M2[350]";
        let known = chemo("AC").with_drug("doxorubicin").with_cumulative_dose(240.0);
        let unknown = chemo("EC").with_type("ANTHRACYCLINE");

        let p = Patient::new().with_treatment(known.clone());
        assert_eq!(run(text, &p).outcome(), Outcome::Pass);

        let p = Patient::new()
            .with_treatment(known.clone())
            .with_treatment(unknown.clone());
        assert_eq!(run(text, &p).outcome(), Outcome::Undetermined);

        let p = Patient::new()
            .with_treatment(known.clone())
            .with_treatment(known)
            .with_treatment(unknown);
        assert_eq!(run(text, &p).outcome(), Outcome::Fail);

        assert_eq!(run(text, &Patient::new()).outcome(), Outcome::Pass);
    }

    #[test]
    fn surgery_window() {
        let text = "HAS_HAD_SURGERY_WITHIN_LAST_X_WEEKS[6]";
        let recent = Patient::new().with_surgery("resection", Some(date(2024, 5, 1)));
        assert_eq!(run(text, &recent).outcome(), Outcome::Pass);
        let undated = Patient::new().with_surgery("resection", None);
        assert_eq!(run(text, &undated).outcome(), Outcome::Undetermined);
        assert_eq!(run(text, &Patient::new()).outcome(), Outcome::Fail);
    }
}
