use thiserror::Error;

use super::rule_id::{Arity, CompositeOp, RuleId};
use super::signature::{InputSignature, SlotType};
use crate::parse::ParseError;

/// A leaf whose literal arguments do not fit its signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("rule '{rule}' expects {expected} argument(s) {signature}, found {found}")]
    ArityMismatch {
        rule: RuleId,
        signature: InputSignature,
        expected: usize,
        found: usize,
    },

    #[error("rule '{rule}' argument {slot_index}: '{value}' is not a valid {expected}")]
    TypeMismatch {
        rule: RuleId,
        slot_index: usize,
        expected: SlotType,
        value: String,
    },

    /// The literal cannot be written back as criterion text: it contains a
    /// bracket or comma, or has leading or trailing whitespace.
    #[error("rule '{rule}' argument {slot_index}: '{value}' cannot be written in criterion text")]
    UnrepresentableLiteral {
        rule: RuleId,
        slot_index: usize,
        value: String,
    },

    #[error("rule '{rule}' has no input signature")]
    MissingSignature { rule: RuleId },

    #[error("'{op}' takes {arity} nested expression(s), found {found}")]
    CompositeArity {
        op: CompositeOp,
        arity: Arity,
        found: usize,
    },
}

/// Binding a criterion to an executable evaluator failed.
#[derive(Debug, Error)]
pub enum BindError {
    /// Every resolution problem found in the tree, in left-to-right order.
    #[error("{} invalid rule call(s): {}", .0.len(), join(.0))]
    Invalid(Vec<ResolutionError>),

    #[error("no evaluator factory is registered for rule '{rule}'")]
    Unbound { rule: RuleId },

    #[error("expression nesting exceeds the limit of {limit}")]
    TooDeep { limit: usize },

    #[error("factory for rule '{rule}' rejected its parameters: {message}")]
    Factory { rule: RuleId, message: String },
}

impl BindError {
    /// Resolution problems carried by this error; empty for the other variants.
    #[must_use]
    pub fn problems(&self) -> &[ResolutionError] {
        match self {
            BindError::Invalid(problems) => problems,
            _ => &[],
        }
    }
}

/// The signature and factory registries disagree with the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "rule registries are inconsistent (missing signatures: [{}]; missing factories: [{}]; malformed signatures: [{}])",
    names(.missing_signatures),
    names(.missing_factories),
    names(.malformed_signatures)
)]
pub struct RegistryError {
    pub missing_signatures: Vec<RuleId>,
    pub missing_factories: Vec<RuleId>,
    pub malformed_signatures: Vec<RuleId>,
}

impl RegistryError {
    pub(crate) fn is_empty(&self) -> bool {
        self.missing_signatures.is_empty()
            && self.missing_factories.is_empty()
            && self.malformed_signatures.is_empty()
    }
}

/// Why a leaf could not produce a result for one patient.
///
/// Never reaches the caller of an evaluation: the leaf wrapper turns it into
/// an UNDETERMINED outcome carrying the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("no data available for {what}")]
    MissingData { what: String },

    #[error("invalid data for {what}: {detail}")]
    InvalidData { what: String, detail: String },
}

impl EvaluationError {
    pub fn missing(what: impl Into<String>) -> Self {
        EvaluationError::MissingData { what: what.into() }
    }

    pub fn invalid(what: impl Into<String>, detail: impl Into<String>) -> Self {
        EvaluationError::InvalidData {
            what: what.into(),
            detail: detail.into(),
        }
    }
}

/// One criterion of a trial file failed to load.
#[derive(Debug, Error)]
pub enum CriterionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

/// A located problem in a trial file.
#[derive(Debug, Error)]
#[error("line {line}{}: {error}", .reference.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
pub struct CriterionProblem {
    pub line: usize,
    pub reference: Option<String>,
    pub error: CriterionError,
}

/// Loading a trial failed; lists every problem found, not just the first.
#[derive(Debug, Error)]
pub enum TrialLoadError {
    #[error("trial defines no criteria")]
    Empty,

    #[error("{} problem(s) in trial:\n{}", .problems.len(), lines(.problems))]
    Invalid { problems: Vec<CriterionProblem> },
}

impl TrialLoadError {
    #[must_use]
    pub fn problems(&self) -> &[CriterionProblem] {
        match self {
            TrialLoadError::Invalid { problems } => problems,
            TrialLoadError::Empty => &[],
        }
    }
}

fn join(errors: &[ResolutionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn names(rules: &[RuleId]) -> String {
    rules
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn lines(problems: &[CriterionProblem]) -> String {
    problems
        .iter()
        .map(|p| format!("  {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}
