use super::{contains_ignore_case, leaf_fn};
use crate::registry::RuleRegistry;
use crate::types::{Evaluation, RuleId, Toxicity};

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(RuleId::HasToxicityCtcaeOfAtLeastGradeX, |params, _| {
        let grade = params.integer(0)?;
        Ok(leaf_fn(move |patient| {
            Ok(toxicity_of_grade(patient.toxicities().iter(), grade, ""))
        }))
    });

    registry.register(RuleId::HasToxicityCtcaeOfAtLeastGradeXIgnoringY, |params, _| {
        let grade = params.integer(0)?;
        let ignored = params.strings(1)?.to_vec();
        Ok(leaf_fn(move |patient| {
            let considered = patient
                .toxicities()
                .iter()
                .filter(|t| !contains_ignore_case(ignored.as_slice(), &t.name));
            let suffix = format!(" other than {}", ignored.join(", "));
            Ok(toxicity_of_grade(considered, grade, &suffix))
        }))
    });
}

fn toxicity_of_grade<'a>(
    toxicities: impl Iterator<Item = &'a Toxicity>,
    grade: i64,
    suffix: &str,
) -> Evaluation {
    let mut ungraded = Vec::new();
    for toxicity in toxicities {
        match toxicity.grade {
            Some(g) if i64::from(g) >= grade => {
                return Evaluation::pass(
                    format!(
                        "Patient has {} of grade {g}, at least {grade}{suffix}",
                        toxicity.name
                    ),
                    "Toxicity present",
                );
            }
            Some(_) => {}
            None => ungraded.push(toxicity.name.as_str()),
        }
    }
    if ungraded.is_empty() {
        Evaluation::fail(
            format!("Patient has no toxicity of at least grade {grade}{suffix}"),
            "No toxicity",
        )
    } else {
        Evaluation::undetermined(
            format!(
                "Grade of {} is unknown, could be at least {grade}",
                ungraded.join(", ")
            ),
            "Toxicity grade unknown",
        )
    }
}
