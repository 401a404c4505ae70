use std::path::Path;

use tracing::{info, warn};

use super::context::BindContext;
use super::error::{BindError, CriterionError, CriterionProblem, RegistryError, TrialLoadError};
use super::evaluator::Evaluator;
use super::expression::Expression;
use super::signature::SignatureRegistry;
use super::trial::{trial_lines, Criterion, Trial};
use crate::error::TrialGateError;
use crate::parse::{parse_with_limit, ParseError};
use crate::registry::RuleRegistry;

/// Parses, validates and binds criteria against a fixed pair of registries.
///
/// Construction verifies that every leaf rule has both a signature and a
/// factory, so a misconfigured engine fails before any criterion is read.
///
/// # Example
///
/// ```
/// use trialgate::{BindContext, Engine, Outcome, Patient};
///
/// let engine = Engine::standard(BindContext::default()).unwrap();
/// let criterion = engine.compile("AND(IS_AT_LEAST_X_YEARS_OLD[18], NOT(IS_PREGNANT))").unwrap();
/// let patient = Patient::new().with_birth_year(1960).with_pregnancy(false);
/// assert_eq!(criterion.evaluate(&patient).outcome(), Outcome::Pass);
/// ```
#[derive(Debug)]
pub struct Engine {
    signatures: SignatureRegistry,
    rules: RuleRegistry,
    ctx: BindContext,
}

impl Engine {
    /// Create an engine over `rules` with the standard signatures.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] listing every rule that lacks a signature or
    /// a factory.
    pub fn new(rules: RuleRegistry, ctx: BindContext) -> Result<Self, RegistryError> {
        Self::with_signatures(SignatureRegistry::standard(), rules, ctx)
    }

    /// Create an engine over custom signature and rule registries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the two registries disagree with the catalogue.
    pub fn with_signatures(
        signatures: SignatureRegistry,
        rules: RuleRegistry,
        ctx: BindContext,
    ) -> Result<Self, RegistryError> {
        rules.verify(&signatures)?;
        Ok(Self {
            signatures,
            rules,
            ctx,
        })
    }

    /// An engine with the standard signatures and factories.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] only if the standard tables are inconsistent.
    pub fn standard(ctx: BindContext) -> Result<Self, RegistryError> {
        Self::new(RuleRegistry::standard(), ctx)
    }

    #[must_use]
    pub fn signatures(&self) -> &SignatureRegistry {
        &self.signatures
    }

    #[must_use]
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    #[must_use]
    pub fn context(&self) -> &BindContext {
        &self.ctx
    }

    /// Parse one criterion using this engine's nesting limit.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on any syntax problem.
    pub fn parse(&self, text: &str) -> Result<Expression, ParseError> {
        parse_with_limit(text, self.ctx.max_depth())
    }

    /// Validate and bind an already parsed expression.
    ///
    /// # Errors
    ///
    /// See [`bind`](crate::bind).
    pub fn bind(&self, expr: &Expression) -> Result<Evaluator, BindError> {
        crate::compile::bind(expr, &self.signatures, &self.rules, &self.ctx)
    }

    /// Parse and bind one criterion.
    ///
    /// # Errors
    ///
    /// Returns [`TrialGateError`] on parse or bind failure.
    pub fn compile(&self, text: &str) -> Result<Evaluator, TrialGateError> {
        let expr = self.parse(text)?;
        Ok(self.bind(&expr)?)
    }

    /// Load a trial from text, one criterion per line.
    ///
    /// Blank lines and lines starting with `#` are skipped; a criterion may
    /// carry a reference label as `I-01: EXPR`. Every line is checked before
    /// returning, so all problems are reported together.
    ///
    /// # Errors
    ///
    /// Returns [`TrialLoadError::Invalid`] with every malformed criterion, or
    /// [`TrialLoadError::Empty`] if the text holds no criteria.
    pub fn load_trial(&self, text: &str) -> Result<Trial, TrialLoadError> {
        let mut criteria = Vec::new();
        let mut problems = Vec::new();

        for line in trial_lines(text) {
            let reference = line.reference.map(str::to_owned);
            let bound = self
                .parse(line.text)
                .map_err(CriterionError::from)
                .and_then(|expr| {
                    let evaluator = self.bind(&expr)?;
                    Ok((expr, evaluator))
                });
            match bound {
                Ok((expr, evaluator)) => {
                    criteria.push(Criterion::new(reference, line.line, expr, evaluator));
                }
                Err(error) => {
                    warn!(line = line.line, reference = ?reference, %error, "invalid criterion");
                    problems.push(CriterionProblem {
                        line: line.line,
                        reference,
                        error,
                    });
                }
            }
        }

        if !problems.is_empty() {
            return Err(TrialLoadError::Invalid { problems });
        }
        if criteria.is_empty() {
            return Err(TrialLoadError::Empty);
        }
        info!(criteria = criteria.len(), "trial loaded");
        Ok(Trial::new(criteria))
    }

    /// Read a trial file and load it.
    ///
    /// # Errors
    ///
    /// Returns [`TrialGateError`] on I/O failure or any [`TrialLoadError`].
    pub fn load_trial_file(&self, path: impl AsRef<Path>) -> Result<Trial, TrialGateError> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.load_trial(&text)?)
    }
}
