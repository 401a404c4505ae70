//! Clinical-trial eligibility rules: parse textual criteria, bind them to
//! executable rules, and evaluate patients into an outcome with explanatory
//! messages.
//!
//! ```
//! use trialgate::{BindContext, Engine, Outcome, Patient, Sex};
//!
//! let engine = Engine::standard(BindContext::default()).unwrap();
//! let criterion = engine.compile("OR(IS_MALE, NOT(IS_PREGNANT))").unwrap();
//! let patient = Patient::new().with_sex(Sex::Male);
//! assert_eq!(criterion.evaluate(&patient).outcome(), Outcome::Pass);
//! ```

mod compile;
mod error;
mod evaluate;
pub mod parse;
mod registry;
pub mod resolve;
mod rules;
mod types;

pub use compile::bind;
pub use error::TrialGateError;
pub use parse::{parse, ParseError};
pub use registry::{RuleFactory, RuleRegistry};
pub use resolve::resolve;
pub use rules::leaf_fn;
pub use types::{
    and, lab, leaf, not, or, standard_signature, warn_if, Arity, BindContext, BindError,
    CompositeOp, Criterion, CriterionError, CriterionProblem, CriterionResult, Engine, Evaluation,
    EvaluationError, Evaluator, Expression, FixedClock, GeneEvent, HlaAllele, InMemoryOntology,
    InputSignature, LabValue, LeafFn, MessageSet, MolecularRecord, OntologyLookup, Outcome, Param,
    ParameterError, Patient, PatientRecord, PriorTreatment, ReferenceClock, RegistryError,
    ResolutionError, ResolvedParameters, RuleId, Sex, SignatureRegistry, SlotType, Surgery,
    SynonymTable, SystemClock, Toxicity, TreatmentCategory, Trial, TrialLoadError, TrialReport,
    TumorDetails, TumorStage, TumorType,
};

/// Outcome combination operators, usable on evaluations built outside the engine.
pub mod combine {
    pub use crate::evaluate::{and_all, negate, or_any, warn_if};
}
