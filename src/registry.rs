use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::types::{
    BindContext, LeafFn, ParameterError, RegistryError, ResolvedParameters, RuleId,
    SignatureRegistry,
};

/// Builds the executable form of a leaf rule from its decoded parameters.
///
/// Called once per leaf at bind time; the returned [`LeafFn`] is then reused
/// for every patient.
pub type RuleFactory =
    Arc<dyn Fn(&ResolvedParameters, &BindContext) -> Result<LeafFn, ParameterError> + Send + Sync>;

/// Maps leaf rules to the factories that bind them.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    factories: HashMap<RuleId, RuleFactory>,
}

impl RuleRegistry {
    /// A registry with no factories.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Factories for every leaf rule in the catalogue.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        crate::rules::register_standard(&mut registry);
        registry
    }

    /// Add or replace the factory for `rule`.
    pub fn register<F>(&mut self, rule: RuleId, factory: F)
    where
        F: Fn(&ResolvedParameters, &BindContext) -> Result<LeafFn, ParameterError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(rule, Arc::new(factory));
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, rule: RuleId, factory: F) -> Self
    where
        F: Fn(&ResolvedParameters, &BindContext) -> Result<LeafFn, ParameterError>
            + Send
            + Sync
            + 'static,
    {
        self.register(rule, factory);
        self
    }

    /// Remove the factory for `rule`, returning whether one was registered.
    pub fn remove(&mut self, rule: RuleId) -> bool {
        self.factories.remove(&rule).is_some()
    }

    #[must_use]
    pub fn contains(&self, rule: RuleId) -> bool {
        self.factories.contains_key(&rule)
    }

    #[must_use]
    pub fn factory(&self, rule: RuleId) -> Option<&RuleFactory> {
        self.factories.get(&rule)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Check that every leaf rule in the catalogue has a well-formed
    /// signature and a factory.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] listing every rule missing either entry.
    pub fn verify(&self, signatures: &SignatureRegistry) -> Result<(), RegistryError> {
        let mut err = RegistryError {
            missing_signatures: Vec::new(),
            missing_factories: Vec::new(),
            malformed_signatures: Vec::new(),
        };
        for rule in RuleId::leaves() {
            match signatures.get(rule) {
                None => err.missing_signatures.push(rule),
                Some(sig) if !sig.is_well_formed() => err.malformed_signatures.push(rule),
                Some(_) => {}
            }
            if !self.contains(rule) {
                err.missing_factories.push(rule);
            }
        }
        if err.is_empty() {
            debug!(
                rules = self.factories.len(),
                "rule registries verified against catalogue"
            );
            Ok(())
        } else {
            Err(err)
        }
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rules: Vec<&RuleId> = self.factories.keys().collect();
        rules.sort();
        f.debug_struct("RuleRegistry")
            .field("rules", &rules)
            .finish()
    }
}
