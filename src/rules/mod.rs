//! Factories for the standard leaf rules.
//!
//! Each submodule registers the factories for one group of the catalogue.
//! A factory reads its typed parameters once, then returns a closure that
//! answers for one patient; missing data comes back as
//! [`EvaluationError::MissingData`] and the evaluator reports UNDETERMINED.

mod general;
mod labs;
mod molecular;
mod toxicity;
mod treatment;
mod tumor;

use std::sync::Arc;

use chrono::{Days, NaiveDate};

use crate::registry::RuleRegistry;
use crate::types::{Evaluation, EvaluationError, LeafFn, Outcome, PatientRecord, RuleId};

pub(crate) fn register_standard(registry: &mut RuleRegistry) {
    general::register(registry);
    labs::register(registry);
    treatment::register(registry);
    tumor::register(registry);
    molecular::register(registry);
    toxicity::register(registry);
}

/// Wrap a closure as a [`LeafFn`].
pub fn leaf_fn<F>(f: F) -> LeafFn
where
    F: Fn(&dyn PatientRecord) -> Result<Evaluation, EvaluationError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Register a rule that always answers with a stub outcome.
fn stub(registry: &mut RuleRegistry, rule: RuleId, outcome: Outcome, reason: &'static str) {
    debug_assert!(outcome.is_stub());
    registry.register(rule, move |_, _| {
        Ok(leaf_fn(move |_| {
            Ok(Evaluation::with_messages(
                outcome,
                format!("{rule}: {reason}"),
                format!("{rule} {}", outcome.as_str().to_ascii_lowercase().replace('_', " ")),
            ))
        }))
    });
}

/// PASS or FAIL on a known flag, missing data otherwise.
fn flag(
    value: Option<bool>,
    what: &str,
    pass: impl Into<String>,
    fail: impl Into<String>,
) -> Result<Evaluation, EvaluationError> {
    match value {
        Some(true) => Ok(Evaluation::pass(pass, what.to_owned())),
        Some(false) => Ok(Evaluation::fail(fail, what.to_owned())),
        None => Err(EvaluationError::missing(what)),
    }
}

/// Case-insensitive membership test.
fn contains_ignore_case<S: AsRef<str>>(haystack: &[S], needle: &str) -> bool {
    haystack
        .iter()
        .any(|item| item.as_ref().eq_ignore_ascii_case(needle))
}

/// First day of a window of `weeks` weeks ending on `today`.
///
/// Negative windows are treated as empty (only `today` itself).
fn window_start(today: NaiveDate, weeks: i64) -> NaiveDate {
    let days = u64::try_from(weeks).unwrap_or(0).saturating_mul(7);
    today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// Three-way answer for "did any of these happen within a window?".
///
/// PASS if any date falls on or after `start`, UNDETERMINED if none does but
/// some dates are unknown, FAIL otherwise.
fn within_window(dates: impl IntoIterator<Item = Option<NaiveDate>>, start: NaiveDate) -> Outcome {
    let mut unknown = false;
    for date in dates {
        match date {
            Some(d) if d >= start => return Outcome::Pass,
            Some(_) => {}
            None => unknown = true,
        }
    }
    if unknown {
        Outcome::Undetermined
    } else {
        Outcome::Fail
    }
}
