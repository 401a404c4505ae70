use std::fmt;

/// Result of evaluating a rule or composite against one patient.
///
/// `NotEvaluated` and `NotImplemented` are produced only by leaves whose rule
/// is deliberately stubbed. Composites treat both as [`Outcome::Undetermined`]
/// when combining, see [`Outcome::combinable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Outcome {
    Pass,
    Warn,
    Undetermined,
    Fail,
    NotEvaluated,
    NotImplemented,
}

impl Outcome {
    pub const ALL: [Outcome; 6] = [
        Outcome::Pass,
        Outcome::Warn,
        Outcome::Undetermined,
        Outcome::Fail,
        Outcome::NotEvaluated,
        Outcome::NotImplemented,
    ];

    /// The four outcomes a composite can produce.
    pub const COMBINABLE: [Outcome; 4] = [
        Outcome::Pass,
        Outcome::Warn,
        Outcome::Undetermined,
        Outcome::Fail,
    ];

    /// The outcome used when combining: the two stub markers count as undetermined.
    #[must_use]
    pub fn combinable(self) -> Outcome {
        match self {
            Outcome::NotEvaluated | Outcome::NotImplemented => Outcome::Undetermined,
            other => other,
        }
    }

    /// Rank in combination precedence, `0` best (PASS) to `3` worst (FAIL).
    #[must_use]
    pub fn severity(self) -> u8 {
        match self.combinable() {
            Outcome::Pass => 0,
            Outcome::Warn => 1,
            Outcome::Fail => 3,
            _ => 2,
        }
    }

    /// The worse of two outcomes after mapping stub markers.
    #[must_use]
    pub fn worst(self, other: Outcome) -> Outcome {
        let (a, b) = (self.combinable(), other.combinable());
        if b.severity() > a.severity() {
            b
        } else {
            a
        }
    }

    /// The better of two outcomes after mapping stub markers.
    #[must_use]
    pub fn best(self, other: Outcome) -> Outcome {
        let (a, b) = (self.combinable(), other.combinable());
        if b.severity() < a.severity() {
            b
        } else {
            a
        }
    }

    /// PASS and FAIL swap; everything else is unchanged (stub markers become undetermined).
    #[must_use]
    pub fn negate(self) -> Outcome {
        match self.combinable() {
            Outcome::Pass => Outcome::Fail,
            Outcome::Fail => Outcome::Pass,
            other => other,
        }
    }

    /// PASS becomes WARN; everything else is unchanged (stub markers become undetermined).
    #[must_use]
    pub fn warn_if(self) -> Outcome {
        match self.combinable() {
            Outcome::Pass => Outcome::Warn,
            other => other,
        }
    }

    #[must_use]
    pub fn is_stub(self) -> bool {
        matches!(self, Outcome::NotEvaluated | Outcome::NotImplemented)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Warn => "WARN",
            Outcome::Undetermined => "UNDETERMINED",
            Outcome::Fail => "FAIL",
            Outcome::NotEvaluated => "NOT_EVALUATED",
            Outcome::NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order() {
        assert!(Outcome::Pass.severity() < Outcome::Warn.severity());
        assert!(Outcome::Warn.severity() < Outcome::Undetermined.severity());
        assert!(Outcome::Undetermined.severity() < Outcome::Fail.severity());
        assert_eq!(
            Outcome::NotImplemented.severity(),
            Outcome::Undetermined.severity()
        );
    }

    #[test]
    fn worst_and_best() {
        assert_eq!(Outcome::Pass.worst(Outcome::Fail), Outcome::Fail);
        assert_eq!(Outcome::Warn.worst(Outcome::NotEvaluated), Outcome::Undetermined);
        assert_eq!(Outcome::Fail.best(Outcome::Warn), Outcome::Warn);
        assert_eq!(Outcome::Fail.best(Outcome::NotImplemented), Outcome::Undetermined);
    }

    #[test]
    fn negate_is_an_involution_on_combinable_outcomes() {
        for o in Outcome::COMBINABLE {
            assert_eq!(o.negate().negate(), o);
        }
        assert_eq!(Outcome::Warn.negate(), Outcome::Warn);
        assert_eq!(Outcome::Undetermined.negate(), Outcome::Undetermined);
    }

    #[test]
    fn warn_if_only_downgrades_pass() {
        assert_eq!(Outcome::Pass.warn_if(), Outcome::Warn);
        assert_eq!(Outcome::Fail.warn_if(), Outcome::Fail);
        assert_eq!(Outcome::Undetermined.warn_if(), Outcome::Undetermined);
    }

    #[test]
    fn stub_markers() {
        assert!(Outcome::NotEvaluated.is_stub());
        assert!(!Outcome::Undetermined.is_stub());
        assert_eq!(Outcome::NotEvaluated.to_string(), "NOT_EVALUATED");
    }
}
