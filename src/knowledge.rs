use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

use crate::error::{Error, Result};
use crate::term::{QueryTerm, Term};
use crate::Answers;

/// Stored argument tuple of a fact or of an answer
pub(crate) type Tuple<T> = SmallVec<[T; 4]>;

/// Equality policy shared by every literal comparison
type Equality<T> = Box<dyn Fn(&T, &T) -> bool>;

/// Identity of a predicate inside one knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateId(usize);

/// Handle to a predicate of arity `N`.
///
/// Handles are cheap to copy. They build atoms for declarations and run queries
/// against the knowledge base that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Predicate<const N: usize> {
    id: PredicateId,
}

impl<const N: usize> Predicate<N> {
    /// Identity of this predicate
    #[must_use]
    pub fn id(&self) -> PredicateId {
        self.id
    }

    /// Apply the predicate to arguments, giving a fact, a rule head or a goal
    pub fn atom<T>(&self, terms: [Term<T>; N]) -> Atom<T> {
        Atom {
            predicate: self.id,
            terms: terms.into_iter().collect(),
        }
    }

    /// Same as [`KnowledgeBase::query`]
    pub fn query<T: Clone>(
        &self,
        kb: &KnowledgeBase<T>,
        args: [QueryTerm<T>; N],
    ) -> Answers<T, N> {
        kb.query(self, args)
    }

    /// Same as [`KnowledgeBase::query_unique`]
    pub fn query_unique<T: Clone>(
        &self,
        kb: &KnowledgeBase<T>,
        args: [QueryTerm<T>; N],
    ) -> Answers<T, N> {
        kb.query_unique(self, args)
    }
}

/// A predicate applied to terms (e.g. `mother(X, "Tommy")`)
#[derive(Debug, Clone, PartialEq)]
pub struct Atom<T> {
    predicate: PredicateId,
    terms: SmallVec<[Term<T>; 4]>,
}

impl<T> Atom<T> {
    /// Predicate this atom applies
    #[must_use]
    pub fn predicate(&self) -> PredicateId {
        self.predicate
    }

    /// Arguments in position order
    #[must_use]
    pub fn terms(&self) -> &[Term<T>] {
        &self.terms
    }

    /// Number of arguments
    #[must_use]
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// Assert this atom as a fact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FactDeclaration`] when an argument is a rule variable.
    pub fn fact(self, kb: &mut KnowledgeBase<T>) -> Result<()> {
        kb.add_fact(self)
    }

    /// Declare a rule with this atom as head and `goals` as its body
    pub fn when<I>(self, kb: &mut KnowledgeBase<T>, goals: I)
    where
        I: IntoIterator<Item = Atom<T>>,
    {
        kb.add_rule(Rule::new(self, goals));
    }
}

/// A rule: the head holds whenever one of the bodies is satisfiable.
///
/// Each body is a conjunction of goals; several bodies are alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<T> {
    head: Atom<T>,
    bodies: Vec<Vec<Atom<T>>>,
}

impl<T> Rule<T> {
    /// Rule with a single body
    pub fn new<I>(head: Atom<T>, goals: I) -> Self
    where
        I: IntoIterator<Item = Atom<T>>,
    {
        Self {
            head,
            bodies: vec![goals.into_iter().collect()],
        }
    }

    /// Add an alternative body
    #[must_use]
    pub fn or<I>(mut self, goals: I) -> Self
    where
        I: IntoIterator<Item = Atom<T>>,
    {
        self.bodies.push(goals.into_iter().collect());
        self
    }

    /// Head pattern
    #[must_use]
    pub fn head(&self) -> &Atom<T> {
        &self.head
    }

    /// Alternative bodies in declaration order
    #[must_use]
    pub fn bodies(&self) -> &[Vec<Atom<T>>] {
        &self.bodies
    }
}

/// Engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Config {
    /// How deeply rule expansions may nest below a query.
    ///
    /// `None` never cuts resolution short, so a rule that depends on itself
    /// without bottoming out in facts does not terminate. With `Some(depth)`
    /// goals nested `depth` or more levels below the query are answered from
    /// facts only and the answers are flagged as truncated. `Some(0)` answers
    /// the query itself from facts only.
    pub max_depth: Option<usize>,
}

impl Config {
    /// Parse settings from a JSON document such as `{"max_depth": 16}`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the document is not valid.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug)]
struct PredicateInfo {
    name: Option<String>,
    arity: usize,
}

/// Owner of predicates, facts, rules and the equality policy
pub struct KnowledgeBase<T> {
    predicates: Vec<PredicateInfo>,
    facts_by_pred: IndexMap<PredicateId, Vec<Tuple<T>>>,
    rules_by_pred: IndexMap<PredicateId, Vec<Rule<T>>>,
    equality: Equality<T>,
    config: Config,
}

impl<T: PartialEq + 'static> Default for KnowledgeBase<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq + 'static> KnowledgeBase<T> {
    /// Create an empty knowledge base comparing literals with `==`
    #[must_use]
    pub fn new() -> Self {
        Self::with_equality(|a: &T, b: &T| a == b)
    }
}

impl<T> KnowledgeBase<T> {
    /// Create an empty knowledge base comparing literals with `equality`
    pub fn with_equality<F>(equality: F) -> Self
    where
        F: Fn(&T, &T) -> bool + 'static,
    {
        Self {
            predicates: Vec::new(),
            facts_by_pred: IndexMap::new(),
            rules_by_pred: IndexMap::new(),
            equality: Box::new(equality),
            config: Config::default(),
        }
    }

    /// Replace the settings, builder style
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replace the settings
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Current settings
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Declare a named predicate of arity `N`
    pub fn predicate<const N: usize>(&mut self, name: &str) -> Predicate<N> {
        self.declare_predicate(Some(name.to_string()))
    }

    /// Declare a predicate of arity `N` without a diagnostic name
    pub fn unnamed_predicate<const N: usize>(&mut self) -> Predicate<N> {
        self.declare_predicate(None)
    }

    fn declare_predicate<const N: usize>(&mut self, name: Option<String>) -> Predicate<N> {
        let id = PredicateId(self.predicates.len());
        self.predicates.push(PredicateInfo { name, arity: N });
        log::debug!("declared predicate `{}`/{}", self.display_name(id), N);
        Predicate { id }
    }

    /// Diagnostic name of a predicate, if it was given one
    #[must_use]
    pub fn predicate_name(&self, id: PredicateId) -> Option<&str> {
        self.predicates
            .get(id.0)
            .and_then(|info| info.name.as_deref())
    }

    /// Name used in log lines and errors
    pub(crate) fn display_name(&self, id: PredicateId) -> String {
        self.predicate_name(id)
            .map_or_else(|| format!("#{}", id.0), str::to_string)
    }

    /// Add a fact to the knowledge base.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FactDeclaration`] when an argument is a rule variable.
    /// The fact table is left untouched in that case.
    pub fn add_fact(&mut self, atom: Atom<T>) -> Result<()> {
        if let Some((position, var)) = atom
            .terms
            .iter()
            .enumerate()
            .find_map(|(position, term)| term.as_variable().map(|var| (position, var)))
        {
            return Err(Error::FactDeclaration {
                predicate: self.display_name(atom.predicate),
                position,
                variable: var.name().to_string(),
            });
        }

        let values: Tuple<T> = atom
            .terms
            .into_iter()
            .filter_map(|term| match term {
                Term::Literal(value) => Some(value),
                Term::Variable(_) => None,
            })
            .collect();

        log::debug!(
            "asserted fact for `{}`/{}",
            self.display_name(atom.predicate),
            values.len()
        );
        self.facts_by_pred
            .entry(atom.predicate)
            .or_default()
            .push(values);
        Ok(())
    }

    /// Add a rule to the knowledge base.
    ///
    /// Every call creates a new rule entry, even when an equal head was
    /// declared before; the head then simply has one more alternative.
    pub fn add_rule(&mut self, rule: Rule<T>) {
        let predicate = rule.head.predicate;
        if let Some(info) = self.predicates.get(predicate.0) {
            if info.arity != rule.head.arity() {
                log::warn!(
                    "rule head for `{}` has {} arguments, predicate declares {}",
                    self.display_name(predicate),
                    rule.head.arity(),
                    info.arity
                );
            }
        }
        log::debug!(
            "declared rule for `{}` with {} alternative(s)",
            self.display_name(predicate),
            rule.bodies.len()
        );
        self.rules_by_pred.entry(predicate).or_default().push(rule);
    }

    /// Facts stored for `predicate`, in assertion order
    pub fn facts<const N: usize>(&self, predicate: &Predicate<N>) -> Vec<[T; N]>
    where
        T: Clone,
    {
        self.stored_facts(predicate.id)
            .iter()
            .filter_map(|tuple| tuple.to_vec().try_into().ok())
            .collect()
    }

    /// Total number of stored facts
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts_by_pred.values().map(Vec::len).sum()
    }

    /// Total number of rule entries
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules_by_pred.values().map(Vec::len).sum()
    }

    pub(crate) fn stored_facts(&self, predicate: PredicateId) -> &[Tuple<T>] {
        self.facts_by_pred
            .get(&predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn rules_for(&self, predicate: PredicateId) -> &[Rule<T>] {
        self.rules_by_pred
            .get(&predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn equal(&self, a: &T, b: &T) -> bool {
        (self.equality)(a, b)
    }

    /// Element-wise equality of two tuples under the policy
    pub(crate) fn tuples_equal(&self, a: &[T], b: &[T]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.equal(x, y))
    }
}

impl<T> fmt::Debug for KnowledgeBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("predicates", &self.predicates)
            .field("facts", &self.fact_count())
            .field("rules", &self.rule_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
