mod codes;
mod context;
mod engine;
mod error;
mod evaluation;
mod evaluator;
mod expression;
mod outcome;
mod params;
mod patient;
mod report;
mod rule_id;
mod signature;
mod trial;

pub use codes::{HlaAllele, TreatmentCategory, TumorStage, TumorType};
pub use context::{
    BindContext, FixedClock, InMemoryOntology, OntologyLookup, ReferenceClock, SynonymTable,
    SystemClock,
};
pub use engine::Engine;
pub use error::{
    BindError, CriterionError, CriterionProblem, EvaluationError, RegistryError, ResolutionError,
    TrialLoadError,
};
pub use evaluation::{Evaluation, MessageSet};
pub use evaluator::{Evaluator, LeafFn};
pub(crate) use evaluator::EvaluatorKind;
pub use expression::{and, leaf, not, or, warn_if, Expression};
pub use outcome::Outcome;
pub use params::{Param, ParameterError, ResolvedParameters};
pub use patient::{
    lab, GeneEvent, LabValue, MolecularRecord, Patient, PatientRecord, PriorTreatment, Sex,
    Surgery, Toxicity, TumorDetails,
};
pub use report::{CriterionResult, TrialReport};
pub use rule_id::{Arity, CompositeOp, RuleId};
pub use signature::{standard_signature, InputSignature, SignatureRegistry, SlotType};
pub use trial::{Criterion, Trial};
