use super::leaf_fn;
use crate::registry::RuleRegistry;
use crate::types::{lab, Evaluation, EvaluationError, LabValue, PatientRecord, RuleId};

/// Relative distance from a threshold within which a miss is a WARN, not a FAIL.
const MARGIN: f64 = 0.1;

pub(super) fn register(registry: &mut RuleRegistry) {
    for (rule, code, name) in [
        (RuleId::HasInrUlnAtMostX, lab::INR, "INR"),
        (RuleId::HasPtUlnAtMostX, lab::PT, "PT"),
        (RuleId::HasApttUlnAtMostX, lab::APTT, "APTT"),
        (RuleId::HasAsatUlnAtMostX, lab::ASAT, "ASAT"),
        (RuleId::HasAlatUlnAtMostX, lab::ALAT, "ALAT"),
        (RuleId::HasTotalBilirubinUlnAtMostX, lab::TOTAL_BILIRUBIN, "total bilirubin"),
        (RuleId::HasCreatinineUlnAtMostX, lab::CREATININE, "creatinine"),
    ] {
        registry.register(rule, move |params, _| {
            let max_uln = params.double(0)?;
            Ok(leaf_fn(move |patient| uln_at_most(patient, code, name, max_uln)))
        });
    }

    for (rule, code, name, unit) in [
        (RuleId::HasHemoglobinGPerDlOfAtLeastX, lab::HEMOGLOBIN, "hemoglobin", "g/dL"),
        (RuleId::HasNeutrophilsAbsOfAtLeastX, lab::NEUTROPHILS, "neutrophils", "10^9/L"),
        (RuleId::HasThrombocytesAbsOfAtLeastX, lab::THROMBOCYTES, "thrombocytes", "10^9/L"),
        (RuleId::HasAlbuminGPerDlOfAtLeastX, lab::ALBUMIN, "albumin", "g/dL"),
    ] {
        registry.register(rule, move |params, _| {
            let min = params.double(0)?;
            Ok(leaf_fn(move |patient| {
                let value = lab_value(patient, code, name)?;
                Ok(at_least(value.value, min, name, unit))
            }))
        });
    }

    registry.register(RuleId::HasLabValueXOfAtLeastY, |params, _| {
        let code = params.string(0)?.to_owned();
        let min = params.double(1)?;
        Ok(leaf_fn(move |patient| {
            let value = lab_value(patient, &code, &code)?;
            Ok(at_least(value.value, min, &code, ""))
        }))
    });

    registry.register(RuleId::HasQtcfOfAtMostX, |params, _| {
        let max = params.double(0)?;
        Ok(leaf_fn(move |patient| {
            let qtcf = patient
                .qtcf()
                .ok_or_else(|| EvaluationError::missing("QTcF"))?;
            Ok(if qtcf <= max {
                Evaluation::pass(format!("QTcF of {qtcf} ms is at most {max} ms"), "QTcF")
            } else {
                Evaluation::fail(
                    format!("QTcF of {qtcf} ms exceeds {max} ms"),
                    "Inadequate QTcF",
                )
            })
        }))
    });

    registry.register(RuleId::HasLvefOfAtLeastX, |params, _| {
        let min = params.double(0)?;
        Ok(leaf_fn(move |patient| {
            let lvef = patient
                .lvef()
                .ok_or_else(|| EvaluationError::missing("LVEF"))?;
            Ok(if lvef >= min {
                Evaluation::pass(format!("LVEF of {lvef}% is at least {min}%"), "LVEF")
            } else {
                Evaluation::fail(format!("LVEF of {lvef}% is below {min}%"), "Inadequate LVEF")
            })
        }))
    });
}

fn lab_value(
    patient: &dyn PatientRecord,
    code: &str,
    name: &str,
) -> Result<LabValue, EvaluationError> {
    patient
        .lab_value(code)
        .ok_or_else(|| EvaluationError::missing(name))
}

fn uln_at_most(
    patient: &dyn PatientRecord,
    code: &str,
    name: &str,
    max_uln: f64,
) -> Result<Evaluation, EvaluationError> {
    let value = lab_value(patient, code, name)?;
    let uln = value
        .upper_limit
        .filter(|u| *u > 0.0)
        .ok_or_else(|| EvaluationError::invalid(name, "no upper limit of normal"))?;
    let ratio = value.value / uln;
    Ok(if ratio <= max_uln {
        Evaluation::pass(
            format!("{name} of {ratio:.2}*ULN is at most {max_uln}*ULN"),
            format!("Adequate {name}"),
        )
    } else if ratio <= max_uln * (1.0 + MARGIN) {
        Evaluation::warn(
            format!("{name} of {ratio:.2}*ULN is just above {max_uln}*ULN"),
            format!("{name} close to limit"),
        )
    } else {
        Evaluation::fail(
            format!("{name} of {ratio:.2}*ULN exceeds {max_uln}*ULN"),
            format!("Inadequate {name}"),
        )
    })
}

fn at_least(value: f64, min: f64, name: &str, unit: &str) -> Evaluation {
    let unit = if unit.is_empty() {
        String::new()
    } else {
        format!(" {unit}")
    };
    if value >= min {
        Evaluation::pass(
            format!("{name} of {value}{unit} is at least {min}{unit}"),
            format!("Adequate {name}"),
        )
    } else if value >= min * (1.0 - MARGIN) {
        Evaluation::warn(
            format!("{name} of {value}{unit} is just below {min}{unit}"),
            format!("{name} close to limit"),
        )
    } else {
        Evaluation::fail(
            format!("{name} of {value}{unit} is below {min}{unit}"),
            format!("Inadequate {name}"),
        )
    }
}
