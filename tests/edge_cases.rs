use trialgate::{
    leaf, leaf_fn, not, BindContext, BindError, Engine, Evaluation, EvaluationError, Evaluator,
    Outcome, ParseError, Patient, ResolutionError, RuleId, RuleRegistry, TrialGateError,
};

/// An engine where `PATIENT_WILL_BE_PARTICIPATING_IN_COUNTRY_X[OUTCOME/message]`
/// answers with a fixed outcome and message.
fn scripted_engine() -> Engine {
    let rules = RuleRegistry::standard().with(
        RuleId::PatientWillBeParticipatingInCountryX,
        |params, _| {
            let script = params.string(0)?.to_owned();
            Ok(leaf_fn(move |_| {
                let (name, message) = script.split_once('/').unwrap_or((script.as_str(), ""));
                match name {
                    "PANIC" => panic!("scripted panic"),
                    "MISSING" => Err(EvaluationError::missing("scripted data")),
                    _ => {
                        let outcome = Outcome::ALL
                            .into_iter()
                            .find(|o| o.as_str() == name)
                            .unwrap();
                        Ok(Evaluation::with_messages(outcome, message, name))
                    }
                }
            }))
        },
    );
    Engine::new(rules, BindContext::default()).unwrap()
}

fn scripted(outcome: Outcome, message: &str) -> String {
    format!("PATIENT_WILL_BE_PARTICIPATING_IN_COUNTRY_X[{outcome}/{message}]")
}

fn compile(text: &str) -> Evaluator {
    scripted_engine().compile(text).unwrap()
}

fn outcome_of(text: &str) -> Outcome {
    compile(text).evaluate(&Patient::new()).outcome()
}

#[test]
fn and_or_precedence() {
    let leaves = format!(
        "{}, {}, {}",
        scripted(Outcome::Pass, "p"),
        scripted(Outcome::Warn, "w"),
        scripted(Outcome::Fail, "f")
    );
    assert_eq!(outcome_of(&format!("AND({leaves})")), Outcome::Fail);
    assert_eq!(outcome_of(&format!("OR({leaves})")), Outcome::Pass);

    let uncertain = format!(
        "{}, {}",
        scripted(Outcome::Warn, "w"),
        scripted(Outcome::Undetermined, "u")
    );
    assert_eq!(outcome_of(&format!("AND({uncertain})")), Outcome::Undetermined);
    assert_eq!(outcome_of(&format!("OR({uncertain})")), Outcome::Warn);
}

#[test]
fn double_negation_is_identity_for_combinable_outcomes() {
    for outcome in Outcome::COMBINABLE {
        let text = format!("NOT(NOT({}))", scripted(outcome, "x"));
        assert_eq!(outcome_of(&text), outcome, "{text}");
    }
}

#[test]
fn negation_swaps_only_pass_and_fail() {
    assert_eq!(
        outcome_of(&format!("NOT({})", scripted(Outcome::Pass, "x"))),
        Outcome::Fail
    );
    assert_eq!(
        outcome_of(&format!("NOT({})", scripted(Outcome::Fail, "x"))),
        Outcome::Pass
    );
    assert_eq!(
        outcome_of(&format!("NOT({})", scripted(Outcome::Warn, "x"))),
        Outcome::Warn
    );
    assert_eq!(
        outcome_of(&format!("NOT({})", scripted(Outcome::Undetermined, "x"))),
        Outcome::Undetermined
    );
}

#[test]
fn warn_if_downgrades_pass_only() {
    assert_eq!(
        outcome_of(&format!("WARN_IF({})", scripted(Outcome::Pass, "x"))),
        Outcome::Warn
    );
    assert_eq!(
        outcome_of(&format!("WARN_IF({})", scripted(Outcome::Fail, "x"))),
        Outcome::Fail
    );
    assert_eq!(
        outcome_of(&format!("WARN_IF({})", scripted(Outcome::Undetermined, "x"))),
        Outcome::Undetermined
    );
}

#[test]
fn failing_messages_are_unioned() {
    let text = format!(
        "AND({}, {})",
        scripted(Outcome::Fail, "M1"),
        scripted(Outcome::Fail, "M2")
    );
    let eval = compile(&text).evaluate(&Patient::new());
    assert_eq!(eval.outcome(), Outcome::Fail);
    let specific = eval.specific(Outcome::Fail);
    assert!(specific.contains("M1"));
    assert!(specific.contains("M2"));
}

#[test]
fn only_the_winning_bucket_is_kept() {
    let text = format!(
        "AND({}, {})",
        scripted(Outcome::Pass, "fine"),
        scripted(Outcome::Fail, "broken")
    );
    let eval = compile(&text).evaluate(&Patient::new());
    assert!(eval.messages(Outcome::Pass).is_empty());
    assert_eq!(eval.buckets().count(), 1);
}

#[test]
fn negation_relabels_messages_into_the_new_bucket() {
    let eval = compile(&format!("NOT({})", scripted(Outcome::Pass, "is pregnant")))
        .evaluate(&Patient::new());
    assert_eq!(eval.outcome(), Outcome::Fail);
    assert!(eval.specific(Outcome::Fail).contains("is pregnant"));
    assert!(eval.general(Outcome::Fail).contains("PASS"));

    let eval = compile(&format!("WARN_IF({})", scripted(Outcome::Pass, "has infection")))
        .evaluate(&Patient::new());
    assert!(eval.specific(Outcome::Warn).contains("has infection"));
}

#[test]
fn panicking_leaf_is_undetermined_and_siblings_still_run() {
    let text = format!(
        "OR(PATIENT_WILL_BE_PARTICIPATING_IN_COUNTRY_X[PANIC], {})",
        scripted(Outcome::Fail, "sibling ran")
    );
    let eval = compile(&text).evaluate(&Patient::new());
    assert_eq!(eval.outcome(), Outcome::Undetermined);
    assert!(eval
        .specific(Outcome::Undetermined)
        .iter()
        .any(|m| m.contains("scripted panic")));

    // The same evaluator keeps working after a panic.
    let again = compile(&text).evaluate(&Patient::new());
    assert_eq!(again.outcome(), Outcome::Undetermined);
}

#[test]
fn leaf_errors_become_undetermined() {
    let eval = compile("PATIENT_WILL_BE_PARTICIPATING_IN_COUNTRY_X[MISSING]")
        .evaluate(&Patient::new());
    assert_eq!(eval.outcome(), Outcome::Undetermined);
    assert!(eval
        .specific(Outcome::Undetermined)
        .iter()
        .any(|m| m.contains("no data available for scripted data")));
}

#[test]
fn stub_outcomes_survive_at_the_leaf_but_combine_as_undetermined() {
    assert_eq!(
        outcome_of(&scripted(Outcome::NotImplemented, "later")),
        Outcome::NotImplemented
    );
    let text = format!(
        "AND({}, {})",
        scripted(Outcome::Pass, "p"),
        scripted(Outcome::NotEvaluated, "skipped")
    );
    let eval = compile(&text).evaluate(&Patient::new());
    assert_eq!(eval.outcome(), Outcome::Undetermined);
    assert!(eval.specific(Outcome::Undetermined).contains("skipped"));
}

#[test]
fn deep_nesting_is_rejected() {
    let mut text = "IS_MALE".to_owned();
    for _ in 0..40 {
        text = format!("NOT({text})");
    }
    assert!(matches!(
        scripted_engine().compile(&text),
        Err(TrialGateError::Parse(_))
    ));

    let shallow = Engine::standard(BindContext::default().with_max_depth(3)).unwrap();
    let expr = trialgate::parse("NOT(NOT(NOT(NOT(IS_MALE))))").unwrap();
    assert!(matches!(
        shallow.bind(&expr),
        Err(BindError::TooDeep { limit: 3 })
    ));
}

#[test]
fn a_tree_at_the_depth_limit_binds_and_reparses() {
    let engine = Engine::standard(BindContext::default().with_max_depth(2)).unwrap();
    let expr = not(not(leaf(RuleId::IsAtLeastXYearsOld, ["18"])));

    assert!(engine.bind(&expr).is_ok());
    let reparsed = engine.parse(&expr.to_string()).unwrap();
    assert_eq!(reparsed, expr);

    let deeper = not(expr);
    assert!(matches!(
        engine.bind(&deeper),
        Err(BindError::TooDeep { limit: 2 })
    ));
    assert!(matches!(
        engine.parse(&deeper.to_string()),
        Err(ParseError::TooDeep { limit: 2 })
    ));
}

#[test]
fn literals_the_grammar_cannot_hold_do_not_bind() {
    let engine = scripted_engine();
    let expr = leaf(RuleId::HasHadTreatmentWithAnyDrugX, ["5-FU, leucovorin"]);
    match engine.bind(&expr) {
        Err(BindError::Invalid(problems)) => assert!(matches!(
            problems[..],
            [ResolutionError::UnrepresentableLiteral { slot_index: 0, .. }]
        )),
        other => panic!("expected an invalid literal, got {other:?}"),
    }

    let padded = leaf(RuleId::IsAtLeastXYearsOld, [" 18 "]);
    assert!(engine.bind(&padded).is_err());

    let listed = leaf(RuleId::HasHadTreatmentWithAnyDrugX, ["5-FU;leucovorin"]);
    assert!(engine.bind(&listed).is_ok());
    assert_eq!(engine.parse(&listed.to_string()).unwrap(), listed);
}

#[test]
fn every_problem_in_a_tree_is_reported() {
    let err = scripted_engine()
        .compile("AND(IS_AT_LEAST_X_YEARS_OLD[old], HAS_QTCF_OF_AT_MOST_X[], HAS_TUMOR_STAGE_X[V])")
        .unwrap_err();
    match err {
        TrialGateError::Bind(BindError::Invalid(problems)) => assert_eq!(problems.len(), 3),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn zero_argument_forms_are_equivalent() {
    let engine = scripted_engine();
    let bare = engine.compile("IS_MALE").unwrap();
    let empty = engine.compile("IS_MALE[]").unwrap();
    let patient = Patient::new().with_sex(trialgate::Sex::Male);
    assert_eq!(bare.evaluate(&patient), empty.evaluate(&patient));
}
