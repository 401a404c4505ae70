use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::outcome::Outcome;

/// Messages attached to one outcome bucket.
///
/// `general` holds short summaries, `specific` the longer explanations.
/// Both are sets: duplicates collapse and order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageSet {
    pub general: BTreeSet<String>,
    pub specific: BTreeSet<String>,
}

static EMPTY_MESSAGES: MessageSet = MessageSet::new();

impl MessageSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            general: BTreeSet::new(),
            specific: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.specific.is_empty()
    }

    pub fn extend(&mut self, other: &MessageSet) {
        self.general.extend(other.general.iter().cloned());
        self.specific.extend(other.specific.iter().cloned());
    }
}

/// Result of running an evaluator against one patient.
///
/// Built fresh for every (evaluator, patient) pair; composites always build
/// a new value from their children's results.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    outcome: Outcome,
    messages: BTreeMap<Outcome, MessageSet>,
}

impl Evaluation {
    /// An evaluation with no messages.
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            messages: BTreeMap::new(),
        }
    }

    /// An evaluation carrying one specific and one general message in its own bucket.
    pub fn with_messages(
        outcome: Outcome,
        specific: impl Into<String>,
        general: impl Into<String>,
    ) -> Self {
        Self::new(outcome)
            .with_specific(outcome, specific)
            .with_general(outcome, general)
    }

    pub fn pass(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::with_messages(Outcome::Pass, specific, general)
    }

    pub fn warn(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::with_messages(Outcome::Warn, specific, general)
    }

    pub fn undetermined(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::with_messages(Outcome::Undetermined, specific, general)
    }

    pub fn fail(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::with_messages(Outcome::Fail, specific, general)
    }

    pub fn not_evaluated(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::with_messages(Outcome::NotEvaluated, specific, general)
    }

    pub fn not_implemented(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::with_messages(Outcome::NotImplemented, specific, general)
    }

    /// Add a specific message to `bucket`.
    pub fn with_specific(mut self, bucket: Outcome, message: impl Into<String>) -> Self {
        self.bucket_mut(bucket).specific.insert(message.into());
        self
    }

    /// Add a general message to `bucket`.
    pub fn with_general(mut self, bucket: Outcome, message: impl Into<String>) -> Self {
        self.bucket_mut(bucket).general.insert(message.into());
        self
    }

    /// Merge a whole message set into `bucket`.
    pub fn with_bucket(mut self, bucket: Outcome, messages: &MessageSet) -> Self {
        if !messages.is_empty() {
            self.bucket_mut(bucket).extend(messages);
        }
        self
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Messages for `bucket`; an empty set when there are none, never absent.
    #[must_use]
    pub fn messages(&self, bucket: Outcome) -> &MessageSet {
        self.messages.get(&bucket).unwrap_or(&EMPTY_MESSAGES)
    }

    #[must_use]
    pub fn specific(&self, bucket: Outcome) -> &BTreeSet<String> {
        &self.messages(bucket).specific
    }

    #[must_use]
    pub fn general(&self, bucket: Outcome) -> &BTreeSet<String> {
        &self.messages(bucket).general
    }

    /// Messages of the bucket matching the evaluation's own outcome.
    #[must_use]
    pub fn own_messages(&self) -> &MessageSet {
        self.messages(self.outcome)
    }

    /// Non-empty buckets in outcome order.
    pub fn buckets(&self) -> impl Iterator<Item = (Outcome, &MessageSet)> {
        self.messages
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(outcome, set)| (*outcome, set))
    }

    fn bucket_mut(&mut self, bucket: Outcome) -> &mut MessageSet {
        self.messages.entry(bucket).or_default()
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.outcome)?;
        let specific = &self.own_messages().specific;
        if !specific.is_empty() {
            let joined: Vec<&str> = specific.iter().map(String::as_str).collect();
            write!(f, ": {}", joined.join("; "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bucket_is_empty_not_absent() {
        let eval = Evaluation::new(Outcome::Pass);
        assert!(eval.messages(Outcome::Fail).is_empty());
        assert!(eval.specific(Outcome::Warn).is_empty());
        assert_eq!(eval.buckets().count(), 0);
    }

    #[test]
    fn duplicates_collapse() {
        let eval = Evaluation::fail("too low", "lab")
            .with_specific(Outcome::Fail, "too low")
            .with_general(Outcome::Fail, "lab");
        assert_eq!(eval.specific(Outcome::Fail).len(), 1);
        assert_eq!(eval.general(Outcome::Fail).len(), 1);
    }

    #[test]
    fn constructors_fill_own_bucket() {
        let eval = Evaluation::not_implemented("rule deferred", "deferred");
        assert_eq!(eval.outcome(), Outcome::NotImplemented);
        assert!(eval.own_messages().specific.contains("rule deferred"));
        assert!(eval.messages(Outcome::Undetermined).is_empty());
    }

    #[test]
    fn with_bucket_skips_empty_sets() {
        let eval = Evaluation::new(Outcome::Warn).with_bucket(Outcome::Warn, &MessageSet::new());
        assert_eq!(eval.buckets().count(), 0);
    }

    #[test]
    fn display() {
        let eval = Evaluation::fail("b", "x").with_specific(Outcome::Fail, "a");
        assert_eq!(eval.to_string(), "FAIL: a; b");
        assert_eq!(Evaluation::new(Outcome::Pass).to_string(), "PASS");
    }
}
