use trialgate::{
    parse, standard_signature, BindContext, BindError, CompositeOp, Engine, Expression,
    HlaAllele, Outcome, ParseError, Patient, ResolutionError, RuleId, SlotType,
    TreatmentCategory, TrialGateError, TumorStage, TumorType,
};

fn engine() -> Engine {
    Engine::standard(BindContext::default()).unwrap()
}

fn composite(expr: &Expression) -> (CompositeOp, &[Expression]) {
    match expr {
        Expression::Composite { op, children } => (*op, children),
        Expression::Leaf { rule, .. } => panic!("expected a composite, found leaf {rule}"),
    }
}

fn leaf(expr: &Expression) -> (RuleId, &[String]) {
    match expr {
        Expression::Leaf { rule, raw_args } => (*rule, raw_args),
        Expression::Composite { op, .. } => panic!("expected a leaf, found {op}"),
    }
}

#[test]
fn commas_split_only_at_their_own_depth() {
    let expr = parse(
        "OR(IS_PREGNANT, AND(OR(HAS_INR_ULN_AT_MOST_X[1.5, 2.5], HAS_PT_ULN_AT_MOST_X[2]), HAS_APTT_ULN_AT_MOST_X[3]))",
    )
    .unwrap();

    let (op, children) = composite(&expr);
    assert_eq!(op, CompositeOp::Or);
    assert_eq!(children.len(), 2);
    assert_eq!(leaf(&children[0]).0, RuleId::IsPregnant);

    let (op, and_children) = composite(&children[1]);
    assert_eq!(op, CompositeOp::And);
    assert_eq!(and_children.len(), 2);

    let (op, or_children) = composite(&and_children[0]);
    assert_eq!(op, CompositeOp::Or);
    let (rule, args) = leaf(&or_children[0]);
    assert_eq!(rule, RuleId::HasInrUlnAtMostX);
    assert_eq!(args, ["1.5", "2.5"]);
    assert_eq!(leaf(&or_children[1]).1, ["2"]);
    assert_eq!(leaf(&and_children[1]).0, RuleId::HasApttUlnAtMostX);
}

#[test]
fn composite_arity_is_a_parse_error() {
    let err = parse("NOT(A, B)").unwrap_err();
    assert!(err.is_arity_error(), "{err}");
    assert!(matches!(
        err,
        ParseError::CompositeArity {
            op: CompositeOp::Not,
            found: 2,
            ..
        }
    ));

    let err = parse("AND(A)").unwrap_err();
    assert!(err.is_arity_error(), "{err}");

    let err = parse("WARN_IF(IS_MALE, IS_FEMALE)").unwrap_err();
    assert!(err.is_arity_error(), "{err}");
}

#[test]
fn unbalanced_brackets() {
    let err = parse("NOT(HAS_INR_ULN_AT_MOST_X[1)").unwrap_err();
    assert!(matches!(err, ParseError::Unbalanced { .. }), "{err}");
    assert!(!err.is_arity_error());

    assert!(matches!(
        parse("AND(IS_MALE, IS_FEMALE").unwrap_err(),
        ParseError::Unbalanced { .. }
    ));
    assert!(matches!(
        parse("IS_MALE]").unwrap_err(),
        ParseError::Unbalanced { .. }
    ));
}

#[test]
fn leaf_used_as_composite() {
    let err = parse("IS_PREGNANT(HAS_INR_ULN_AT_MOST_X[1])").unwrap_err();
    assert!(err.is_arity_error(), "{err}");
    assert!(matches!(
        err,
        ParseError::LeafWithChildren {
            rule: RuleId::IsPregnant
        }
    ));
}

#[test]
fn composite_used_with_literals() {
    let err = parse("AND[1, 2]").unwrap_err();
    assert!(matches!(
        err,
        ParseError::CompositeWithLiterals {
            op: CompositeOp::And
        }
    ));
}

#[test]
fn unknown_identifier() {
    let err = parse("IS_A_UNICORN").unwrap_err();
    assert!(matches!(err, ParseError::UnknownRule { ref name } if name == "IS_A_UNICORN"));
}

#[test]
fn empty_and_garbage_input() {
    assert!(matches!(parse("").unwrap_err(), ParseError::Empty));
    assert!(matches!(parse("   ").unwrap_err(), ParseError::Empty));
    assert!(matches!(
        parse("AND(IS_MALE,, IS_FEMALE)").unwrap_err(),
        ParseError::Syntax { .. }
    ));
    assert!(matches!(
        parse("IS_MALE IS_FEMALE").unwrap_err(),
        ParseError::Syntax { .. }
    ));
}

#[test]
fn whitespace_is_insignificant_around_tokens() {
    let spaced = parse(" AND ( IS_MALE , HAS_QTCF_OF_AT_MOST_X[ 450 ] ) ").unwrap();
    let tight = parse("AND(IS_MALE,HAS_QTCF_OF_AT_MOST_X[450])").unwrap();
    assert_eq!(spaced, tight);
}

#[test]
fn syntax_and_semantic_errors_use_separate_channels() {
    // Parses fine: the parser never looks at signatures.
    let expr = parse("HAS_INR_ULN_AT_MOST_X[1.5, 2.5]").unwrap();
    assert_eq!(leaf(&expr).1.len(), 2);

    match engine().compile("HAS_INR_ULN_AT_MOST_X[1.5, 2.5]") {
        Err(TrialGateError::Bind(BindError::Invalid(problems))) => {
            assert_eq!(problems.len(), 1);
            assert!(matches!(
                problems[0],
                ResolutionError::ArityMismatch {
                    rule: RuleId::HasInrUlnAtMostX,
                    expected: 1,
                    found: 2,
                    ..
                }
            ));
        }
        other => panic!("expected a bind error, got {other:?}"),
    }
}

#[test]
fn type_errors_name_the_slot() {
    match engine().compile("HAS_LAB_VALUE_X_OF_AT_LEAST_Y[LDH, lots]") {
        Err(TrialGateError::Bind(BindError::Invalid(problems))) => {
            assert!(matches!(
                problems[0],
                ResolutionError::TypeMismatch { slot_index: 1, .. }
            ));
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }
}

#[test]
fn enumerated_slots_match_display_names_exactly() {
    let engine = engine();
    assert!(engine
        .compile("HAS_HAD_TREATMENT_WITH_CATEGORY_X[CHEMOTHERAPY]")
        .is_ok());
    assert!(engine
        .compile("HAS_HAD_TREATMENT_WITH_CATEGORY_X[chemotherapy]")
        .is_err());
    assert!(engine.compile("HAS_TUMOR_STAGE_X[IIIA]").is_ok());
    assert!(engine.compile("HAS_TUMOR_STAGE_X[IIID]").is_err());
}

#[test]
fn many_strings_slot_splits_on_semicolons() {
    let ev = engine()
        .compile("CURRENTLY_GETS_MEDICATION_OF_NAME_X[ warfarin ; heparin ]")
        .unwrap();
    let patient = Patient::new().with_medication("Heparin");
    assert_eq!(ev.evaluate(&patient).outcome(), Outcome::Pass);
}

#[test]
fn parse_and_evaluate_a_full_criterion() {
    let ev = engine()
        .compile(
            "AND(IS_AT_LEAST_X_YEARS_OLD[18], NOT(IS_PREGNANT), \
             OR(HAS_WHO_STATUS_OF_AT_MOST_X[0], WARN_IF(HAS_WHO_STATUS_OF_EXACTLY_X[1])))",
        )
        .unwrap();

    let fit = Patient::new()
        .with_birth_year(1970)
        .with_pregnancy(false)
        .with_who_status(0);
    assert_eq!(ev.evaluate(&fit).outcome(), Outcome::Pass);

    let who_one = Patient::new()
        .with_birth_year(1970)
        .with_pregnancy(false)
        .with_who_status(1);
    assert_eq!(ev.evaluate(&who_one).outcome(), Outcome::Warn);

    let pregnant = Patient::new()
        .with_birth_year(1970)
        .with_pregnancy(true)
        .with_who_status(0);
    assert_eq!(ev.evaluate(&pregnant).outcome(), Outcome::Fail);
}

#[test]
fn rendering_is_canonical() {
    let expr = parse("and_check_is_case_sensitive").unwrap_err();
    assert!(matches!(expr, ParseError::UnknownRule { .. }));

    let expr = parse("OR( IS_MALE ,HAS_HAD_TREATMENT_WITH_ANY_DRUG_X[ a;b ])").unwrap();
    assert_eq!(
        expr.to_string(),
        "OR(IS_MALE, HAS_HAD_TREATMENT_WITH_ANY_DRUG_X[a;b])"
    );
    assert_eq!(parse(&expr.to_string()).unwrap(), expr);
}

/// A literal every slot of its type accepts.
fn sample_literal(slot: SlotType) -> &'static str {
    match slot {
        SlotType::Integer => "12",
        SlotType::Double => "2.5",
        SlotType::String => "EGFR",
        SlotType::ManyStrings => "cisplatin;carboplatin",
        SlotType::TreatmentCategory => TreatmentCategory::Immunotherapy.display_name(),
        SlotType::TumorType => TumorType::Melanoma.display_name(),
        SlotType::TumorStage => TumorStage::IIIB.display_name(),
        SlotType::HlaAllele => HlaAllele::A0201.display_name(),
    }
}

#[test]
fn every_leaf_rule_renders_and_parses_back() {
    let engine = engine();
    for rule in RuleId::leaves() {
        let signature = standard_signature(rule).unwrap();
        let args: Vec<&str> = signature.slots().iter().map(|s| sample_literal(*s)).collect();
        let expr = trialgate::leaf(rule, args);

        let text = expr.to_string();
        let reparsed = parse(&text).unwrap_or_else(|e| panic!("{text}: {e}"));
        assert_eq!(reparsed, expr, "{text}");
        assert!(engine.bind(&reparsed).is_ok(), "{text}");
    }
}
