use super::{flag, leaf_fn, stub};
use crate::registry::RuleRegistry;
use crate::types::{
    Evaluation, EvaluationError, GeneEvent, MolecularRecord, Outcome, PatientRecord, RuleId,
};

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.register(RuleId::MolecularResultsMustBeAvailable, |_, _| {
        Ok(leaf_fn(|patient| {
            Ok(match patient.molecular() {
                Some(_) => Evaluation::pass(
                    "Molecular results are available",
                    "Molecular results available",
                ),
                None => Evaluation::fail(
                    "No molecular results are available",
                    "No molecular results",
                ),
            })
        }))
    });

    registry.register(RuleId::ActivationOrAmplificationOfGeneX, |params, _| {
        let gene = params.string(0)?.to_owned();
        Ok(leaf_fn(move |patient| {
            let found = molecular(patient)?.events.iter().any(|event| match event {
                GeneEvent::Activation { gene: g } | GeneEvent::Amplification { gene: g, .. } => {
                    *g == gene
                }
                _ => false,
            });
            Ok(gene_answer(found, &gene, "activation or amplification"))
        }))
    });

    registry.register(RuleId::InactivationOfGeneX, |params, _| {
        let gene = params.string(0)?.to_owned();
        Ok(leaf_fn(move |patient| {
            let found = molecular(patient)?
                .events
                .iter()
                .any(|event| matches!(event, GeneEvent::Inactivation { gene: g } if *g == gene));
            Ok(gene_answer(found, &gene, "inactivation"))
        }))
    });

    registry.register(RuleId::MutationInGeneXOfAnyProteinImpactsY, |params, _| {
        let gene = params.string(0)?.to_owned();
        let impacts = params.strings(1)?.to_vec();
        Ok(leaf_fn(move |patient| {
            let found = molecular(patient)?.events.iter().any(|event| {
                matches!(
                    event,
                    GeneEvent::Mutation { gene: g, protein_impact }
                        if *g == gene && impacts.contains(protein_impact)
                )
            });
            let what = format!("mutation {}", impacts.join(" or "));
            Ok(gene_answer(found, &gene, &what))
        }))
    });

    registry.register(RuleId::AmplificationOfGeneXOfAtLeastYCopies, |params, _| {
        let gene = params.string(0)?.to_owned();
        let min_copies = params.integer(1)?;
        Ok(leaf_fn(move |patient| {
            let copies = molecular(patient)?
                .events
                .iter()
                .filter_map(|event| match event {
                    GeneEvent::Amplification { gene: g, copies } if *g == gene => Some(*copies),
                    _ => None,
                })
                .max();
            Ok(match copies {
                Some(copies) if i64::from(copies) >= min_copies => Evaluation::pass(
                    format!("{gene} is amplified with {copies} copies, at least {min_copies}"),
                    format!("{gene} amplification"),
                ),
                Some(copies) => Evaluation::fail(
                    format!("{gene} is amplified with only {copies} copies, fewer than {min_copies}"),
                    format!("Insufficient {gene} amplification"),
                ),
                None => Evaluation::fail(
                    format!("No amplification of {gene} detected"),
                    format!("No {gene} amplification"),
                ),
            })
        }))
    });

    registry.register(RuleId::FusionInGeneX, |params, _| {
        let gene = params.string(0)?.to_owned();
        Ok(leaf_fn(move |patient| {
            let found = molecular(patient)?
                .events
                .iter()
                .any(|event| matches!(event, GeneEvent::Fusion { .. }) && event.involves(&gene));
            Ok(gene_answer(found, &gene, "fusion"))
        }))
    });

    registry.register(RuleId::MsiSignature, |_, _| {
        Ok(leaf_fn(|patient| {
            flag(
                molecular(patient)?.microsatellite_unstable,
                "microsatellite status",
                "Tumor is microsatellite unstable",
                "Tumor is microsatellite stable",
            )
        }))
    });

    registry.register(RuleId::TmbOfAtLeastX, |params, _| {
        let min = params.double(0)?;
        Ok(leaf_fn(move |patient| {
            let tmb = molecular(patient)?
                .tumor_mutational_burden
                .ok_or_else(|| EvaluationError::missing("tumor mutational burden"))?;
            Ok(if tmb >= min {
                Evaluation::pass(
                    format!("TMB of {tmb} is at least {min}"),
                    "Adequate TMB",
                )
            } else {
                Evaluation::fail(format!("TMB of {tmb} is below {min}"), "Inadequate TMB")
            })
        }))
    });

    registry.register(RuleId::HasHlaTypeX, |params, _| {
        let allele = params.hla(0)?;
        Ok(leaf_fn(move |patient| {
            let alleles = &molecular(patient)?.hla_alleles;
            if alleles.is_empty() {
                return Err(EvaluationError::missing("HLA typing"));
            }
            Ok(if alleles.contains(&allele) {
                Evaluation::pass(format!("Patient has HLA type {allele}"), "Adequate HLA type")
            } else {
                Evaluation::fail(
                    format!("Patient does not have HLA type {allele}"),
                    "Inadequate HLA type",
                )
            })
        }))
    });

    stub(
        registry,
        RuleId::ExpressionOfProteinXByIhcOfAtLeastY,
        Outcome::NotImplemented,
        "IHC results are not yet captured",
    );
}

fn molecular(patient: &dyn PatientRecord) -> Result<&MolecularRecord, EvaluationError> {
    patient
        .molecular()
        .ok_or_else(|| EvaluationError::missing("molecular results"))
}

fn gene_answer(found: bool, gene: &str, what: &str) -> Evaluation {
    if found {
        Evaluation::pass(format!("{gene} {what} detected"), format!("{gene} {what}"))
    } else {
        Evaluation::fail(
            format!("No {gene} {what} detected"),
            format!("No {gene} {what}"),
        )
    }
}
