use std::fmt;
use std::time::Instant;

use super::evaluator::Evaluator;
use super::expression::Expression;
use super::patient::PatientRecord;
use super::report::{CriterionResult, TrialReport};
use crate::evaluate::and_all;

/// One bound eligibility criterion of a trial.
#[derive(Debug, Clone)]
pub struct Criterion {
    reference: Option<String>,
    line: usize,
    expression: Expression,
    evaluator: Evaluator,
}

impl Criterion {
    pub(crate) fn new(
        reference: Option<String>,
        line: usize,
        expression: Expression,
        evaluator: Evaluator,
    ) -> Self {
        Self {
            reference,
            line,
            expression,
            evaluator,
        }
    }

    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// 1-based line of the criterion in its source text.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}

/// A bound set of eligibility criteria.
///
/// Immutable once loaded; share it across threads behind an `Arc` and
/// evaluate any number of patients concurrently.
///
/// # Example
///
/// ```
/// use trialgate::{BindContext, Engine, Outcome, Patient};
///
/// let engine = Engine::standard(BindContext::default()).unwrap();
/// let trial = engine
///     .load_trial("I-01: IS_MALE\nI-02: NOT(IS_PREGNANT)")
///     .unwrap();
/// let report = trial.evaluate(&Patient::new().with_sex(trialgate::Sex::Male));
/// assert_eq!(report.outcome(), Outcome::Pass);
/// ```
#[derive(Debug, Clone)]
pub struct Trial {
    criteria: Vec<Criterion>,
}

impl Trial {
    pub(crate) fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Evaluate every criterion against `patient`.
    ///
    /// The overall evaluation is the AND of all criteria; a trial with a
    /// single criterion reports that criterion's evaluation unchanged.
    pub fn evaluate(&self, patient: &dyn PatientRecord) -> TrialReport {
        let start = Instant::now();
        let evaluations: Vec<_> = self
            .criteria
            .iter()
            .map(|c| c.evaluator.evaluate(patient))
            .collect();
        let overall = match evaluations.as_slice() {
            [single] => single.clone(),
            all => and_all(all),
        };
        let results = self
            .criteria
            .iter()
            .zip(evaluations)
            .map(|(c, evaluation)| {
                CriterionResult::new(c.reference.clone(), c.expression.to_string(), evaluation)
            })
            .collect();
        TrialReport::new(overall, results, start.elapsed())
    }
}

impl fmt::Display for Trial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, criterion) in self.criteria.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if let Some(reference) = &criterion.reference {
                write!(f, "{reference}: ")?;
            }
            write!(f, "{}", criterion.expression)?;
        }
        Ok(())
    }
}

/// A criterion line of a trial file, split from its optional reference label.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TrialLine<'a> {
    pub line: usize,
    pub reference: Option<&'a str>,
    pub text: &'a str,
}

/// Split trial text into criterion lines, skipping blanks and `#` comments.
///
/// A label is everything before the first `:` when no bracket precedes it,
/// so literals such as `A*02:01` are never mistaken for one.
pub(crate) fn trial_lines(text: &str) -> impl Iterator<Item = TrialLine<'_>> {
    text.lines().enumerate().filter_map(|(i, raw)| {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let (reference, text) = match trimmed.split_once(':') {
            Some((label, rest)) if !label.contains(['[', '(', ']', ')', ',']) => {
                (Some(label.trim()), rest.trim())
            }
            _ => (None, trimmed),
        };
        Some(TrialLine {
            line: i + 1,
            reference: reference.filter(|r| !r.is_empty()),
            text,
        })
    })
}
