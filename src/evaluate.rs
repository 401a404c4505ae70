use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::types::{
    Evaluation, EvaluationError, Evaluator, EvaluatorKind, LeafFn, MessageSet, Outcome,
    PatientRecord, RuleId,
};

pub(crate) fn evaluate(evaluator: &Evaluator, patient: &dyn PatientRecord) -> Evaluation {
    match evaluator.kind() {
        EvaluatorKind::Leaf { rule, eval } => evaluate_leaf(*rule, eval, patient),
        EvaluatorKind::And(children) => and_all(&evaluate_children(children, patient)),
        EvaluatorKind::Or(children) => or_any(&evaluate_children(children, patient)),
        EvaluatorKind::Not(child) => negate(&evaluate(child, patient)),
        EvaluatorKind::WarnIf(child) => warn_if(&evaluate(child, patient)),
    }
}

fn evaluate_children(children: &[Evaluator], patient: &dyn PatientRecord) -> Vec<Evaluation> {
    children.iter().map(|c| evaluate(c, patient)).collect()
}

fn evaluate_leaf(rule: RuleId, eval: &LeafFn, patient: &dyn PatientRecord) -> Evaluation {
    match panic::catch_unwind(AssertUnwindSafe(|| eval(patient))) {
        Ok(Ok(evaluation)) => evaluation,
        Ok(Err(err)) => {
            if matches!(err, EvaluationError::MissingData { .. }) {
                debug!(rule = %rule, error = %err, "leaf undetermined");
            } else {
                warn!(rule = %rule, error = %err, "leaf evaluation failed");
            }
            Evaluation::undetermined(
                format!("{rule} could not be determined: {err}"),
                format!("{rule} undetermined"),
            )
        }
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_owned());
            warn!(rule = %rule, error = %reason, "leaf evaluator panicked");
            Evaluation::undetermined(
                format!("{rule} could not be evaluated: {reason}"),
                format!("{rule} undetermined"),
            )
        }
    }
}

/// AND-combination: the worst child outcome wins.
///
/// Stub outcomes count as UNDETERMINED. An empty slice combines to PASS.
pub fn and_all(children: &[Evaluation]) -> Evaluation {
    let outcome = children
        .iter()
        .fold(Outcome::Pass, |acc, c| acc.worst(c.outcome()));
    merge(outcome, children)
}

/// OR-combination: the best child outcome wins.
///
/// Stub outcomes count as UNDETERMINED. An empty slice combines to FAIL.
pub fn or_any(children: &[Evaluation]) -> Evaluation {
    let outcome = children
        .iter()
        .fold(Outcome::Fail, |acc, c| acc.best(c.outcome()));
    merge(outcome, children)
}

/// NOT: PASS and FAIL swap, WARN and UNDETERMINED pass through.
pub fn negate(child: &Evaluation) -> Evaluation {
    remap(child.outcome().negate(), child)
}

/// WARN_IF: a passing child becomes WARN, anything else passes through.
pub fn warn_if(child: &Evaluation) -> Evaluation {
    remap(child.outcome().warn_if(), child)
}

/// Union of every child's messages in the winning bucket. If that is empty,
/// the messages of the children that produced the outcome are relabelled.
fn merge(outcome: Outcome, children: &[Evaluation]) -> Evaluation {
    let mut messages = MessageSet::new();
    for child in children {
        messages.extend(child.messages(outcome));
    }
    if messages.is_empty() {
        for child in children
            .iter()
            .filter(|c| c.outcome().combinable() == outcome)
        {
            messages.extend(child.own_messages());
        }
    }
    Evaluation::new(outcome).with_bucket(outcome, &messages)
}

fn remap(outcome: Outcome, child: &Evaluation) -> Evaluation {
    let same_bucket = child.messages(outcome);
    let messages = if same_bucket.is_empty() {
        child.own_messages()
    } else {
        same_bucket
    };
    Evaluation::new(outcome).with_bucket(outcome, messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(outcome: Outcome, message: &str) -> Evaluation {
        Evaluation::with_messages(outcome, message, outcome.as_str())
    }

    #[test]
    fn and_takes_worst() {
        let evals = [
            with(Outcome::Pass, "p"),
            with(Outcome::Warn, "w"),
            with(Outcome::Fail, "f"),
        ];
        let result = and_all(&evals);
        assert_eq!(result.outcome(), Outcome::Fail);
        assert!(result.specific(Outcome::Fail).contains("f"));
        assert!(result.messages(Outcome::Pass).is_empty());
    }

    #[test]
    fn or_takes_best() {
        let evals = [
            with(Outcome::Pass, "p"),
            with(Outcome::Warn, "w"),
            with(Outcome::Fail, "f"),
        ];
        let result = or_any(&evals);
        assert_eq!(result.outcome(), Outcome::Pass);
        assert_eq!(
            result.specific(Outcome::Pass).iter().collect::<Vec<_>>(),
            ["p"]
        );
    }

    #[test]
    fn message_union_in_winning_bucket() {
        let result = and_all(&[with(Outcome::Fail, "M1"), with(Outcome::Fail, "M2")]);
        let specific = result.specific(Outcome::Fail);
        assert!(specific.contains("M1"));
        assert!(specific.contains("M2"));
        assert_eq!(result.general(Outcome::Fail).len(), 1);
    }

    #[test]
    fn stub_children_count_as_undetermined() {
        let result = and_all(&[
            with(Outcome::Pass, "p"),
            Evaluation::not_implemented("deferred", "NI"),
        ]);
        assert_eq!(result.outcome(), Outcome::Undetermined);
        assert!(result.specific(Outcome::Undetermined).contains("deferred"));

        let result = or_any(&[
            with(Outcome::Fail, "f"),
            Evaluation::not_evaluated("skipped", "NE"),
        ]);
        assert_eq!(result.outcome(), Outcome::Undetermined);
    }

    #[test]
    fn same_bucket_wins_over_relabel() {
        let a = with(Outcome::Undetermined, "u1");
        let b = Evaluation::not_evaluated("ne", "NE");
        let result = and_all(&[a, b]);
        assert_eq!(result.outcome(), Outcome::Undetermined);
        assert!(result.specific(Outcome::Undetermined).contains("u1"));
        assert!(!result.specific(Outcome::Undetermined).contains("ne"));
    }

    #[test]
    fn negate_relabels_messages() {
        let result = negate(&with(Outcome::Pass, "is pregnant"));
        assert_eq!(result.outcome(), Outcome::Fail);
        assert!(result.specific(Outcome::Fail).contains("is pregnant"));
        assert!(result.messages(Outcome::Pass).is_empty());
    }

    #[test]
    fn negate_prefers_existing_target_bucket() {
        let child = with(Outcome::Pass, "p").with_specific(Outcome::Fail, "would fail");
        let result = negate(&child);
        assert_eq!(
            result.specific(Outcome::Fail).iter().collect::<Vec<_>>(),
            ["would fail"]
        );
    }

    #[test]
    fn warn_if_downgrades_pass_only() {
        let result = warn_if(&with(Outcome::Pass, "has brain metastases"));
        assert_eq!(result.outcome(), Outcome::Warn);
        assert!(result.specific(Outcome::Warn).contains("has brain metastases"));

        let result = warn_if(&with(Outcome::Fail, "none"));
        assert_eq!(result.outcome(), Outcome::Fail);
        assert!(result.specific(Outcome::Fail).contains("none"));
    }

    #[test]
    fn empty_combinations() {
        assert_eq!(and_all(&[]).outcome(), Outcome::Pass);
        assert_eq!(or_any(&[]).outcome(), Outcome::Fail);
    }
}
