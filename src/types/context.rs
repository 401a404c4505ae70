use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::parse::DEFAULT_MAX_DEPTH;

/// Expands a disease-ontology term to itself and all of its ancestors.
pub trait OntologyLookup: Send + Sync {
    fn ancestors_and_self(&self, term: &str) -> BTreeSet<String>;
}

/// Supplies the reference date for time-window rules.
pub trait ReferenceClock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// An ontology held in memory as child-to-parent edges.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOntology {
    parents: HashMap<String, Vec<String>>,
}

impl InMemoryOntology {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child` is a kind of `parent`.
    #[must_use]
    pub fn with_parent(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.parents
            .entry(child.into())
            .or_default()
            .push(parent.into());
        self
    }
}

impl OntologyLookup for InMemoryOntology {
    fn ancestors_and_self(&self, term: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([term.to_owned()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(&current) {
                queue.extend(parents.iter().cloned());
            }
        }
        seen
    }
}

/// A clock stuck on one date, for reproducible evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl ReferenceClock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// The local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ReferenceClock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Maps a treatment type (e.g. `ANTHRACYCLINE`) to the drug names that belong to it.
///
/// Keys and drug names are compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    drugs_by_type: HashMap<String, BTreeSet<String>>,
}

impl SynonymTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with the common cytotoxic and targeted drug classes.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_type(
                "ANTHRACYCLINE",
                ["doxorubicin", "epirubicin", "daunorubicin", "idarubicin"],
            )
            .with_type("PLATINUM", ["cisplatin", "carboplatin", "oxaliplatin"])
            .with_type("TAXANE", ["paclitaxel", "docetaxel", "cabazitaxel"])
            .with_type("FLUOROPYRIMIDINE", ["fluorouracil", "capecitabine"])
            .with_type("PD_1_ANTIBODY", ["nivolumab", "pembrolizumab", "cemiplimab"])
            .with_type("PD_L1_ANTIBODY", ["atezolizumab", "durvalumab", "avelumab"])
            .with_type("EGFR_INHIBITOR", ["erlotinib", "gefitinib", "osimertinib"])
            .with_type("BRAF_INHIBITOR", ["vemurafenib", "dabrafenib", "encorafenib"])
    }

    /// Add `drugs` to `treatment_type`, merging with existing entries.
    #[must_use]
    pub fn with_type<I, S>(mut self, treatment_type: &str, drugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.drugs_by_type
            .entry(treatment_type.to_ascii_uppercase())
            .or_default()
            .extend(drugs.into_iter().map(|d| d.as_ref().to_ascii_lowercase()));
        self
    }

    /// Whether `drug` belongs to `treatment_type`.
    #[must_use]
    pub fn contains(&self, treatment_type: &str, drug: &str) -> bool {
        self.drugs_by_type
            .get(&treatment_type.to_ascii_uppercase())
            .is_some_and(|drugs| drugs.contains(&drug.to_ascii_lowercase()))
    }

    /// Drug names listed for `treatment_type`, lowercase.
    pub fn drugs(&self, treatment_type: &str) -> impl Iterator<Item = &str> {
        self.drugs_by_type
            .get(&treatment_type.to_ascii_uppercase())
            .into_iter()
            .flat_map(|drugs| drugs.iter().map(String::as_str))
    }
}

/// External collaborators handed to every rule factory at bind time.
///
/// Cloning is cheap; the collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct BindContext {
    ontology: Arc<dyn OntologyLookup>,
    clock: Arc<dyn ReferenceClock>,
    synonyms: Arc<SynonymTable>,
    max_depth: usize,
}

impl BindContext {
    /// A context with the given collaborators, the standard synonym table and
    /// the default nesting limit.
    #[must_use]
    pub fn new(ontology: Arc<dyn OntologyLookup>, clock: Arc<dyn ReferenceClock>) -> Self {
        Self {
            ontology,
            clock,
            synonyms: Arc::new(SynonymTable::standard()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// An empty ontology and a clock fixed on `today`.
    #[must_use]
    pub fn fixed(today: NaiveDate) -> Self {
        Self::new(Arc::new(InMemoryOntology::new()), Arc::new(FixedClock(today)))
    }

    #[must_use]
    pub fn with_ontology(mut self, ontology: Arc<dyn OntologyLookup>) -> Self {
        self.ontology = ontology;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn ReferenceClock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = Arc::new(synonyms);
        self
    }

    /// Maximum composite nesting accepted when binding.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn ontology(&self) -> &Arc<dyn OntologyLookup> {
        &self.ontology
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<dyn ReferenceClock> {
        &self.clock
    }

    #[must_use]
    pub fn synonyms(&self) -> &Arc<SynonymTable> {
        &self.synonyms
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for BindContext {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryOntology::new()), Arc::new(SystemClock))
    }
}

impl fmt::Debug for BindContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindContext")
            .field("synonyms", &self.synonyms)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
