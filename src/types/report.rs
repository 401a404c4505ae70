use std::fmt;
use std::time::Duration;

use super::evaluation::Evaluation;
use super::outcome::Outcome;

/// Result of one criterion within a [`TrialReport`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CriterionResult {
    reference: Option<String>,
    criterion: String,
    evaluation: Evaluation,
}

impl CriterionResult {
    pub(crate) fn new(
        reference: Option<String>,
        criterion: String,
        evaluation: Evaluation,
    ) -> Self {
        Self {
            reference,
            criterion,
            evaluation,
        }
    }

    /// The reference label from the trial file, if one was given.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Canonical text of the criterion.
    #[must_use]
    pub fn criterion(&self) -> &str {
        &self.criterion
    }

    #[must_use]
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }
}

/// Report returned by [`Trial::evaluate()`](super::trial::Trial::evaluate).
///
/// Holds every criterion's evaluation in file order, the overall evaluation
/// (all criteria combined with AND) and the wall-clock duration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct TrialReport {
    overall: Evaluation,
    criteria: Vec<CriterionResult>,
    duration: Duration,
}

impl TrialReport {
    pub(crate) fn new(
        overall: Evaluation,
        criteria: Vec<CriterionResult>,
        duration: Duration,
    ) -> Self {
        Self {
            overall,
            criteria,
            duration,
        }
    }

    /// The combined evaluation of every criterion.
    #[must_use]
    pub fn overall(&self) -> &Evaluation {
        &self.overall
    }

    /// Shorthand for `self.overall().outcome()`.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.overall.outcome()
    }

    #[must_use]
    pub fn criteria(&self) -> &[CriterionResult] {
        &self.criteria
    }

    /// Criteria whose own outcome is `outcome`.
    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &CriterionResult> {
        self.criteria
            .iter()
            .filter(move |c| c.evaluation.outcome() == outcome)
    }

    /// Wall-clock duration of the evaluation.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for TrialReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "overall: {}", self.overall.outcome())?;
        for result in &self.criteria {
            match &result.reference {
                Some(reference) => write!(f, "  {reference}: ")?,
                None => write!(f, "  ")?,
            }
            writeln!(f, "{}", result.evaluation)?;
        }
        write!(f, "duration: {:?}", self.duration)
    }
}
