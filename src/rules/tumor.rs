use std::sync::Arc;

use super::{flag, leaf_fn, stub};
use crate::registry::RuleRegistry;
use crate::types::{
    Evaluation, EvaluationError, OntologyLookup, Outcome, PatientRecord, RuleId, TumorDetails,
    TumorStage,
};

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(RuleId::HasPrimaryTumorBelongingToDoidTermX, |params, ctx| {
        let term = params.string(0)?.to_owned();
        let ontology = Arc::clone(ctx.ontology());
        Ok(leaf_fn(move |patient| {
            let doids = tumor_doids(patient)?;
            Ok(if belongs_to(ontology.as_ref(), doids, &term) {
                Evaluation::pass(
                    format!("Primary tumor belongs to DOID {term}"),
                    "Adequate tumor type",
                )
            } else {
                Evaluation::fail(
                    format!("Primary tumor does not belong to DOID {term}"),
                    "Inadequate tumor type",
                )
            })
        }))
    });

    registry.register(RuleId::HasCancerOfTumorTypeX, |params, ctx| {
        let tumor_type = params.tumor_type(0)?;
        let ontology = Arc::clone(ctx.ontology());
        Ok(leaf_fn(move |patient| {
            let doids = tumor_doids(patient)?;
            Ok(if belongs_to(ontology.as_ref(), doids, tumor_type.doid()) {
                Evaluation::pass(
                    format!("Patient has cancer of type {tumor_type}"),
                    "Adequate tumor type",
                )
            } else {
                Evaluation::fail(
                    format!("Patient does not have cancer of type {tumor_type}"),
                    "Inadequate tumor type",
                )
            })
        }))
    });

    registry.register(RuleId::HasTumorStageX, |params, _| {
        let wanted = params.tumor_stage(0)?;
        Ok(leaf_fn(move |patient| {
            let stage = tumor_stage(patient)?;
            Ok(match stage_match(stage, wanted) {
                Outcome::Pass => Evaluation::pass(
                    format!("Tumor stage {stage} matches requested stage {wanted}"),
                    "Adequate tumor stage",
                ),
                Outcome::Undetermined => Evaluation::undetermined(
                    format!("Tumor stage {stage} is not specific enough for stage {wanted}"),
                    "Tumor sub-stage unknown",
                ),
                _ => Evaluation::fail(
                    format!("Tumor stage {stage} is not the requested stage {wanted}"),
                    "Inadequate tumor stage",
                ),
            })
        }))
    });

    registry.register(RuleId::HasLocallyAdvancedCancer, |_, _| {
        Ok(leaf_fn(|patient| {
            let stage = tumor_stage(patient)?;
            Ok(if stage.main_stage() == TumorStage::III {
                Evaluation::pass(
                    format!("Tumor stage {stage} is locally advanced"),
                    "Locally advanced cancer",
                )
            } else {
                Evaluation::fail(
                    format!("Tumor stage {stage} is not locally advanced"),
                    "No locally advanced cancer",
                )
            })
        }))
    });

    registry.register(RuleId::HasMetastaticCancer, |_, _| {
        Ok(leaf_fn(|patient| {
            let tumor = tumor(patient)?;
            let lesions = [tumor.has_brain_lesions, tumor.has_liver_lesions];
            if tumor.stage == Some(TumorStage::IV) || lesions.contains(&Some(true)) {
                return Ok(Evaluation::pass(
                    "Patient has metastatic cancer",
                    "Metastatic cancer",
                ));
            }
            match tumor.stage {
                Some(stage) => Ok(Evaluation::fail(
                    format!("Tumor stage {stage} without distant lesions is not metastatic"),
                    "No metastatic cancer",
                )),
                None => Err(EvaluationError::missing("tumor stage")),
            }
        }))
    });

    registry.register(RuleId::HasBrainMetastases, |_, _| {
        Ok(leaf_fn(|patient| {
            flag(
                tumor(patient)?.has_brain_lesions,
                "brain lesions",
                "Patient has brain metastases",
                "Patient has no brain metastases",
            )
        }))
    });

    registry.register(RuleId::HasActiveBrainMetastases, |_, _| {
        Ok(leaf_fn(|patient| {
            let tumor = tumor(patient)?;
            // No brain lesions at all settles the question.
            let active = match tumor.has_brain_lesions {
                Some(false) => Some(false),
                _ => tumor.has_active_brain_lesions,
            };
            flag(
                active,
                "active brain lesions",
                "Patient has active brain metastases",
                "Patient has no active brain metastases",
            )
        }))
    });

    registry.register(RuleId::HasLiverMetastases, |_, _| {
        Ok(leaf_fn(|patient| {
            flag(
                tumor(patient)?.has_liver_lesions,
                "liver lesions",
                "Patient has liver metastases",
                "Patient has no liver metastases",
            )
        }))
    });

    registry.register(RuleId::HasMeasurableDisease, |_, _| {
        Ok(leaf_fn(|patient| {
            flag(
                tumor(patient)?.has_measurable_disease,
                "measurable disease",
                "Patient has measurable disease",
                "Patient has no measurable disease",
            )
        }))
    });

    registry.register(RuleId::HasHadOtherConditionWithDoidTermX, |params, ctx| {
        let term = params.string(0)?.to_owned();
        let ontology = Arc::clone(ctx.ontology());
        Ok(leaf_fn(move |patient| {
            Ok(
                if belongs_to(ontology.as_ref(), patient.condition_doids(), &term) {
                    Evaluation::pass(
                        format!("Patient has a history of DOID {term}"),
                        "Relevant prior condition",
                    )
                } else {
                    Evaluation::fail(
                        format!("Patient has no history of DOID {term}"),
                        "No relevant prior condition",
                    )
                },
            )
        }))
    });

    stub(
        registry,
        RuleId::HasBiopsyAmenableLesion,
        Outcome::NotEvaluated,
        "biopsy feasibility is assessed by the treating physician",
    );
}

fn tumor(patient: &dyn PatientRecord) -> Result<&TumorDetails, EvaluationError> {
    patient
        .tumor()
        .ok_or_else(|| EvaluationError::missing("tumor details"))
}

fn tumor_doids(patient: &dyn PatientRecord) -> Result<&[String], EvaluationError> {
    let doids = tumor(patient)?.doids.as_slice();
    if doids.is_empty() {
        return Err(EvaluationError::missing("tumor DOIDs"));
    }
    Ok(doids)
}

fn tumor_stage(patient: &dyn PatientRecord) -> Result<TumorStage, EvaluationError> {
    tumor(patient)?
        .stage
        .ok_or_else(|| EvaluationError::missing("tumor stage"))
}

/// Whether any of `doids` is `term` or a descendant of it.
fn belongs_to(ontology: &dyn OntologyLookup, doids: &[String], term: &str) -> bool {
    doids
        .iter()
        .any(|doid| ontology.ancestors_and_self(doid).contains(term))
}

/// PASS on an exact or main-stage match, UNDETERMINED when only the main stage
/// is known and a sub-stage of it was asked for, FAIL otherwise.
fn stage_match(actual: TumorStage, wanted: TumorStage) -> Outcome {
    if actual == wanted || actual.main_stage() == wanted {
        Outcome::Pass
    } else if actual.is_main_stage() && wanted.main_stage() == actual {
        Outcome::Undetermined
    } else {
        Outcome::Fail
    }
}
