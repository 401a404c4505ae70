//! Decoding leaf literals into typed parameters.

use crate::types::{
    CompositeOp, Expression, HlaAllele, Param, ResolutionError, ResolvedParameters, RuleId,
    SignatureRegistry, SlotType, TreatmentCategory, TumorStage, TumorType,
};

/// Separator inside a many-strings literal.
pub const MANY_SEPARATOR: char = ';';

/// Decode one leaf call's literal arguments against its signature.
///
/// # Errors
///
/// Returns the first [`ResolutionError`] found: a missing signature, the wrong
/// number of arguments, or a literal that does not parse as its slot type.
pub fn resolve(
    rule: RuleId,
    raw_args: &[String],
    signatures: &SignatureRegistry,
) -> Result<ResolvedParameters, ResolutionError> {
    resolve_all(rule, raw_args, signatures).map_err(|mut errors| errors.swap_remove(0))
}

/// Like [`resolve`] but reports every bad slot.
///
/// The error vector is never empty.
pub(crate) fn resolve_all(
    rule: RuleId,
    raw_args: &[String],
    signatures: &SignatureRegistry,
) -> Result<ResolvedParameters, Vec<ResolutionError>> {
    let signature = signatures
        .get(rule)
        .ok_or_else(|| vec![ResolutionError::MissingSignature { rule }])?;

    if raw_args.len() != signature.len() {
        return Err(vec![ResolutionError::ArityMismatch {
            rule,
            signature: *signature,
            expected: signature.len(),
            found: raw_args.len(),
        }]);
    }

    let mut values = Vec::with_capacity(raw_args.len());
    let mut errors = Vec::new();
    for (slot_index, (slot, text)) in signature.slots().iter().zip(raw_args).enumerate() {
        if !is_representable(text) {
            errors.push(ResolutionError::UnrepresentableLiteral {
                rule,
                slot_index,
                value: text.clone(),
            });
            continue;
        }
        match decode(*slot, text) {
            Some(value) => values.push(value),
            None => errors.push(ResolutionError::TypeMismatch {
                rule,
                slot_index,
                expected: *slot,
                value: text.clone(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(ResolvedParameters::new(values))
    } else {
        Err(errors)
    }
}

/// Whether `text` survives rendering and re-parsing as a leaf literal.
fn is_representable(text: &str) -> bool {
    text.trim() == text && !text.contains([',', '[', ']', '(', ')'])
}

fn decode(slot: SlotType, text: &str) -> Option<Param> {
    let text = text.trim();
    match slot {
        SlotType::Integer => text.parse::<i64>().ok().map(Param::Integer),
        SlotType::Double => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Param::Double),
        SlotType::String => (!text.is_empty()).then(|| Param::String(text.to_owned())),
        SlotType::ManyStrings => {
            let parts: Vec<String> = text
                .split(MANY_SEPARATOR)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect();
            (!parts.is_empty()).then_some(Param::ManyStrings(parts))
        }
        SlotType::TreatmentCategory => {
            TreatmentCategory::from_display_name(text).map(Param::TreatmentCategory)
        }
        SlotType::TumorType => TumorType::from_display_name(text).map(Param::TumorType),
        SlotType::TumorStage => TumorStage::from_display_name(text).map(Param::TumorStage),
        SlotType::HlaAllele => HlaAllele::from_display_name(text).map(Param::HlaAllele),
    }
}

/// An expression whose every node checked out against the signature registry.
///
/// Mirrors the expression tree; each leaf carries its decoded parameters so
/// binding never has to parse literals again.
#[derive(Debug)]
pub(crate) enum Validated {
    Leaf {
        rule: RuleId,
        params: ResolvedParameters,
    },
    Composite {
        op: CompositeOp,
        children: Vec<Validated>,
    },
}

/// Resolve every leaf and check every composite's child count, collecting
/// all problems before returning.
pub(crate) fn validate(
    expr: &Expression,
    signatures: &SignatureRegistry,
) -> Result<Validated, Vec<ResolutionError>> {
    let mut errors = Vec::new();
    let validated = validate_node(expr, signatures, &mut errors);
    match validated {
        Some(tree) if errors.is_empty() => Ok(tree),
        _ => Err(errors),
    }
}

fn validate_node(
    expr: &Expression,
    signatures: &SignatureRegistry,
    errors: &mut Vec<ResolutionError>,
) -> Option<Validated> {
    match expr {
        Expression::Leaf { rule, raw_args } => match resolve_all(*rule, raw_args, signatures) {
            Ok(params) => Some(Validated::Leaf {
                rule: *rule,
                params,
            }),
            Err(mut found) => {
                errors.append(&mut found);
                None
            }
        },
        Expression::Composite { op, children } => {
            let arity = op.arity();
            let mut ok = true;
            if !arity.accepts(children.len()) {
                errors.push(ResolutionError::CompositeArity {
                    op: *op,
                    arity,
                    found: children.len(),
                });
                ok = false;
            }
            let mut validated = Vec::with_capacity(children.len());
            for child in children {
                match validate_node(child, signatures, errors) {
                    Some(v) => validated.push(v),
                    None => ok = false,
                }
            }
            ok.then(|| Validated::Composite {
                op: *op,
                children: validated,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{and, leaf, not};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn decodes_each_slot_type() {
        let sigs = SignatureRegistry::standard();
        let params = resolve(
            RuleId::HasHadCategoryXTreatmentOfTypesY,
            &args(&["CHEMOTHERAPY", "PLATINUM; TAXANE ;"]),
            &sigs,
        )
        .unwrap();
        assert_eq!(params.treatment(0), Ok(TreatmentCategory::Chemotherapy));
        assert_eq!(params.strings(1).unwrap(), ["PLATINUM", "TAXANE"]);

        let params = resolve(RuleId::HasHlaTypeX, &args(&["A*02:01"]), &sigs).unwrap();
        assert_eq!(params.hla(0), Ok(HlaAllele::A0201));

        let params = resolve(RuleId::HasInrUlnAtMostX, &args(&["1.5"]), &sigs).unwrap();
        assert_eq!(params.double(0), Ok(1.5));
    }

    #[test]
    fn many_slot_first() {
        let sigs = SignatureRegistry::standard();
        let params = resolve(
            RuleId::HasHadTreatmentWithAnyDrugXWithinYWeeks,
            &args(&["pembrolizumab;nivolumab", "12"]),
            &sigs,
        )
        .unwrap();
        assert_eq!(params.strings(0).unwrap().len(), 2);
        assert_eq!(params.integer(1), Ok(12));
    }

    #[test]
    fn arity_mismatch() {
        let sigs = SignatureRegistry::standard();
        let err = resolve(RuleId::HasInrUlnAtMostX, &args(&["1.5", "2.5"]), &sigs).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::ArityMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn type_mismatch_names_the_slot() {
        let sigs = SignatureRegistry::standard();
        let err = resolve(
            RuleId::HasHadCategoryXTreatmentWithinYWeeks,
            &args(&["CHEMOTHERAPY", "twelve"]),
            &sigs,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::TypeMismatch {
                rule: RuleId::HasHadCategoryXTreatmentWithinYWeeks,
                slot_index: 1,
                expected: SlotType::Integer,
                value: "twelve".into(),
            }
        );
    }

    #[test]
    fn enum_match_is_case_sensitive() {
        let sigs = SignatureRegistry::standard();
        assert!(resolve(
            RuleId::HasHadTreatmentWithCategoryX,
            &args(&["chemotherapy"]),
            &sigs
        )
        .is_err());
        assert!(resolve(RuleId::HasTumorStageX, &args(&["IIIB"]), &sigs).is_ok());
    }

    #[test]
    fn numbers_are_locale_neutral() {
        let sigs = SignatureRegistry::standard();
        assert!(resolve(RuleId::HasInrUlnAtMostX, &args(&["1,5"]), &sigs).is_err());
        assert!(resolve(RuleId::HasInrUlnAtMostX, &args(&["NaN"]), &sigs).is_err());
        assert!(resolve(RuleId::HasInrUlnAtMostX, &args(&["inf"]), &sigs).is_err());
        assert!(resolve(RuleId::IsAtLeastXYearsOld, &args(&["18.0"]), &sigs).is_err());
    }

    #[test]
    fn empty_many_slot_is_a_type_error() {
        let sigs = SignatureRegistry::standard();
        let err = resolve(RuleId::CurrentlyGetsMedicationOfNameX, &args(&[";"]), &sigs);
        assert!(matches!(err, Err(ResolutionError::TypeMismatch { slot_index: 0, .. })));
    }

    #[test]
    fn literals_that_cannot_be_rendered_are_rejected() {
        let sigs = SignatureRegistry::standard();
        for literal in ["5-FU, leucovorin", "a[1]", "(x)", " padded", "padded "] {
            let err = resolve(RuleId::HasHadTreatmentWithAnyDrugX, &args(&[literal]), &sigs);
            assert_eq!(
                err,
                Err(ResolutionError::UnrepresentableLiteral {
                    rule: RuleId::HasHadTreatmentWithAnyDrugX,
                    slot_index: 0,
                    value: literal.into(),
                }),
                "{literal:?}"
            );
        }
        let listed = resolve(
            RuleId::HasHadTreatmentWithAnyDrugX,
            &args(&["5-FU; leucovorin"]),
            &sigs,
        );
        assert!(listed.is_ok());
    }

    #[test]
    fn missing_signature() {
        let sigs = SignatureRegistry::empty();
        assert_eq!(
            resolve(RuleId::IsMale, &[], &sigs),
            Err(ResolutionError::MissingSignature {
                rule: RuleId::IsMale
            })
        );
    }

    #[test]
    fn validate_collects_every_problem() {
        let sigs = SignatureRegistry::standard();
        let expr = and([
            leaf(RuleId::IsAtLeastXYearsOld, ["adult"]),
            leaf(RuleId::HasInrUlnAtMostX, ["1.5", "2.5"]),
            not(leaf(RuleId::HasTumorStageX, ["V"])),
            crate::types::Expression::Composite {
                op: crate::types::CompositeOp::Or,
                children: vec![leaf(RuleId::IsMale, Vec::<String>::new())],
            },
        ]);
        let errors = validate(&expr, &sigs).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ResolutionError::TypeMismatch { .. }));
        assert!(matches!(errors[1], ResolutionError::ArityMismatch { .. }));
        assert!(matches!(errors[2], ResolutionError::TypeMismatch { .. }));
        assert!(matches!(errors[3], ResolutionError::CompositeArity { .. }));
    }

    #[test]
    fn validate_reports_all_type_errors_in_one_leaf() {
        let sigs = SignatureRegistry::standard();
        let expr = leaf(RuleId::HasHadCategoryXTreatmentWithinYWeeks, ["CHEMO", "soon"]);
        assert_eq!(validate(&expr, &sigs).unwrap_err().len(), 2);
    }

    #[test]
    fn validate_ok() {
        let sigs = SignatureRegistry::standard();
        let expr = and([
            leaf(RuleId::IsAtLeastXYearsOld, ["18"]),
            leaf(RuleId::IsPregnant, Vec::<String>::new()),
        ]);
        assert!(matches!(
            validate(&expr, &sigs),
            Ok(Validated::Composite { ref children, .. }) if children.len() == 2
        ));
    }
}
