use chrono::Datelike;

use super::{contains_ignore_case, flag, leaf_fn, stub};
use crate::registry::RuleRegistry;
use crate::types::{Evaluation, EvaluationError, Outcome, PatientRecord, RuleId, Sex};

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(RuleId::IsAtLeastXYearsOld, |params, ctx| {
        let min_age = params.integer(0)?;
        let clock = ctx.clock().clone();
        Ok(leaf_fn(move |patient| {
            let diff = year_difference(patient, clock.today().year())?;
            // Only the birth year is known, so the true age is `diff` or `diff - 1`.
            Ok(if diff > min_age {
                Evaluation::pass(
                    format!("Patient is at least {min_age} years old"),
                    "Adequate age",
                )
            } else if diff == min_age {
                Evaluation::undetermined(
                    format!("Patient may or may not be {min_age} years old yet"),
                    "Age undetermined",
                )
            } else {
                Evaluation::fail(
                    format!("Patient is younger than {min_age} years old"),
                    "Inadequate age",
                )
            })
        }))
    });

    registry.register(RuleId::IsYoungerThanXYearsOld, |params, ctx| {
        let max_age = params.integer(0)?;
        let clock = ctx.clock().clone();
        Ok(leaf_fn(move |patient| {
            let diff = year_difference(patient, clock.today().year())?;
            Ok(if diff < max_age {
                Evaluation::pass(
                    format!("Patient is younger than {max_age} years old"),
                    "Adequate age",
                )
            } else if diff == max_age {
                Evaluation::undetermined(
                    format!("Patient may or may not have turned {max_age} yet"),
                    "Age undetermined",
                )
            } else {
                Evaluation::fail(
                    format!("Patient is at least {max_age} years old"),
                    "Inadequate age",
                )
            })
        }))
    });

    registry.register(RuleId::IsMale, |_, _| {
        Ok(leaf_fn(|patient| {
            flag(
                patient.sex().map(|s| s == Sex::Male),
                "sex",
                "Patient is male",
                "Patient is not male",
            )
        }))
    });

    registry.register(RuleId::IsFemale, |_, _| {
        Ok(leaf_fn(|patient| {
            flag(
                patient.sex().map(|s| s == Sex::Female),
                "sex",
                "Patient is female",
                "Patient is not female",
            )
        }))
    });

    registry.register(RuleId::IsPregnant, |_, _| {
        Ok(leaf_fn(|patient| {
            let pregnant = patient
                .is_pregnant()
                .or_else(|| (patient.sex() == Some(Sex::Male)).then_some(false));
            flag(
                pregnant,
                "pregnancy",
                "Patient is pregnant",
                "Patient is not pregnant",
            )
        }))
    });

    registry.register(RuleId::HasWhoStatusOfAtMostX, |params, _| {
        let max = params.integer(0)?;
        Ok(leaf_fn(move |patient| {
            let who = who_status(patient)?;
            Ok(if who <= max {
                Evaluation::pass(
                    format!("WHO status {who} is within requested max of {max}"),
                    "Adequate WHO status",
                )
            } else {
                Evaluation::fail(
                    format!("WHO status {who} exceeds requested max of {max}"),
                    "Inadequate WHO status",
                )
            })
        }))
    });

    registry.register(RuleId::HasWhoStatusOfExactlyX, |params, _| {
        let wanted = params.integer(0)?;
        Ok(leaf_fn(move |patient| {
            let who = who_status(patient)?;
            Ok(if who == wanted {
                Evaluation::pass(format!("WHO status is exactly {wanted}"), "WHO status")
            } else {
                Evaluation::fail(
                    format!("WHO status {who} is not the requested {wanted}"),
                    "Inadequate WHO status",
                )
            })
        }))
    });

    registry.register(RuleId::HasActiveInfection, |_, _| {
        Ok(leaf_fn(|patient| {
            flag(
                patient.has_active_infection(),
                "infection status",
                "Patient has an active infection",
                "Patient has no active infection",
            )
        }))
    });

    registry.register(RuleId::CurrentlyGetsMedicationOfNameX, |params, _| {
        let names = params.strings(0)?.to_vec();
        Ok(leaf_fn(move |patient| {
            let current = patient
                .medications()
                .ok_or_else(|| EvaluationError::missing("medication list"))?;
            let found: Vec<&str> = current
                .iter()
                .filter(|m| contains_ignore_case(names.as_slice(), m))
                .map(String::as_str)
                .collect();
            Ok(if found.is_empty() {
                Evaluation::fail(
                    format!("Patient does not get any of {}", names.join(", ")),
                    "No requested medication",
                )
            } else {
                Evaluation::pass(
                    format!("Patient currently gets {}", found.join(", ")),
                    "Requested medication",
                )
            })
        }))
    });

    stub(
        registry,
        RuleId::IsBreastfeeding,
        Outcome::NotEvaluated,
        "breastfeeding is assumed to be checked by the treating physician",
    );
    stub(
        registry,
        RuleId::IsAbleAndWillingToGiveAdequateInformedConsent,
        Outcome::NotEvaluated,
        "informed consent is obtained outside of matching",
    );
    stub(
        registry,
        RuleId::PatientWillBeParticipatingInCountryX,
        Outcome::NotEvaluated,
        "trial country is assumed to match the treating site",
    );
    stub(
        registry,
        RuleId::HasKarnofskyScoreOfAtLeastX,
        Outcome::NotImplemented,
        "Karnofsky score is not yet captured",
    );
    stub(
        registry,
        RuleId::CurrentlyGetsCypXInhibitingMedication,
        Outcome::NotImplemented,
        "CYP interaction data is not yet available",
    );
}

fn year_difference(patient: &dyn PatientRecord, this_year: i32) -> Result<i64, EvaluationError> {
    let born = patient
        .birth_year()
        .ok_or_else(|| EvaluationError::missing("birth year"))?;
    Ok(i64::from(this_year) - i64::from(born))
}

fn who_status(patient: &dyn PatientRecord) -> Result<i64, EvaluationError> {
    patient
        .who_status()
        .map(i64::from)
        .ok_or_else(|| EvaluationError::missing("WHO status"))
}
