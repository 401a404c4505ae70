use std::fmt;
use std::sync::Arc;

use super::error::EvaluationError;
use super::evaluation::Evaluation;
use super::patient::PatientRecord;
use super::rule_id::{CompositeOp, RuleId};

/// The executable form of one leaf rule, produced by a rule factory.
///
/// Must not keep state between calls: the same closure is shared by every
/// thread evaluating the criterion.
pub type LeafFn =
    Arc<dyn Fn(&dyn PatientRecord) -> Result<Evaluation, EvaluationError> + Send + Sync>;

pub(crate) enum EvaluatorKind {
    Leaf { rule: RuleId, eval: LeafFn },
    And(Vec<Evaluator>),
    Or(Vec<Evaluator>),
    Not(Box<Evaluator>),
    WarnIf(Box<Evaluator>),
}

/// A criterion bound to executable rules, ready to evaluate patients.
///
/// Immutable after binding and cheap to clone; share one instance across
/// threads to evaluate many patients.
#[derive(Clone)]
pub struct Evaluator {
    kind: Arc<EvaluatorKind>,
}

impl Evaluator {
    pub(crate) fn new(kind: EvaluatorKind) -> Self {
        Self {
            kind: Arc::new(kind),
        }
    }

    pub(crate) fn kind(&self) -> &EvaluatorKind {
        &self.kind
    }

    /// Evaluate this criterion for one patient. Never fails: leaf errors and
    /// panics come back as UNDETERMINED.
    pub fn evaluate(&self, patient: &dyn PatientRecord) -> Evaluation {
        crate::evaluate::evaluate(self, patient)
    }

    /// The rule or operator at the root.
    #[must_use]
    pub fn rule_id(&self) -> RuleId {
        match self.kind() {
            EvaluatorKind::Leaf { rule, .. } => *rule,
            EvaluatorKind::And(_) => CompositeOp::And.rule_id(),
            EvaluatorKind::Or(_) => CompositeOp::Or.rule_id(),
            EvaluatorKind::Not(_) => CompositeOp::Not.rule_id(),
            EvaluatorKind::WarnIf(_) => CompositeOp::WarnIf.rule_id(),
        }
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self.kind() {
            EvaluatorKind::Leaf { .. } => 1,
            EvaluatorKind::And(children) | EvaluatorKind::Or(children) => {
                children.iter().map(Evaluator::leaf_count).sum()
            }
            EvaluatorKind::Not(child) | EvaluatorKind::WarnIf(child) => child.leaf_count(),
        }
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            EvaluatorKind::Leaf { rule, .. } => write!(f, "Leaf({rule})"),
            EvaluatorKind::And(children) => f.debug_tuple("And").field(children).finish(),
            EvaluatorKind::Or(children) => f.debug_tuple("Or").field(children).finish(),
            EvaluatorKind::Not(child) => f.debug_tuple("Not").field(child).finish(),
            EvaluatorKind::WarnIf(child) => f.debug_tuple("WarnIf").field(child).finish(),
        }
    }
}
