use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_RULE_VAR: AtomicUsize = AtomicUsize::new(0);

/// Identity of a rule variable, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VarId(usize);

/// A placeholder used in rule heads and bodies (e.g. `X` in `mother(X, Y)`).
///
/// Two variables are the same variable only when one is a clone of the other.
/// The name is kept for diagnostics and never takes part in matching.
#[derive(Debug, Clone)]
pub struct RuleVar {
    id: VarId,
    name: Arc<str>,
}

impl RuleVar {
    /// Create a fresh variable
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: VarId(NEXT_RULE_VAR.fetch_add(1, Ordering::Relaxed)),
            name: Arc::from(name),
        }
    }

    /// Diagnostic name given at creation
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn id(&self) -> VarId {
        self.id
    }
}

impl PartialEq for RuleVar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RuleVar {}

impl Hash for RuleVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for RuleVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An argument of a fact, rule head or goal.
#[derive(Debug, Clone, PartialEq)]
pub enum Term<T> {
    /// A concrete value (e.g. `"Lucy"`)
    Literal(T),
    /// A rule variable (e.g. `X`)
    Variable(RuleVar),
}

impl<T> Term<T> {
    /// Literal term
    pub fn lit(value: T) -> Self {
        Term::Literal(value)
    }

    /// Variable term sharing the identity of `var`
    #[must_use]
    pub fn var(var: &RuleVar) -> Self {
        Term::Variable(var.clone())
    }

    /// Rule variable at this position, if any
    pub fn as_variable(&self) -> Option<&RuleVar> {
        match self {
            Term::Variable(var) => Some(var),
            Term::Literal(_) => None,
        }
    }
}

impl<T> From<RuleVar> for Term<T> {
    fn from(var: RuleVar) -> Self {
        Term::Variable(var)
    }
}

impl<T> From<&RuleVar> for Term<T> {
    fn from(var: &RuleVar) -> Self {
        Term::var(var)
    }
}

/// Output collector for a query position.
///
/// Every successful answer appends the value found at the variable's position.
/// Clones share the same collector, so a variable can be handed to a query and
/// read afterwards. Values accumulate when a variable is reused across queries.
#[derive(Debug)]
pub struct QueryVar<T> {
    values: Rc<RefCell<Vec<T>>>,
}

impl<T> QueryVar<T> {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Values collected so far, in answer order
    #[must_use]
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.values.borrow().clone()
    }

    /// Number of collected values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Whether nothing was collected yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Forget collected values
    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }

    /// Whether both handles refer to the same collector
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }

    pub(crate) fn push(&self, value: T) {
        self.values.borrow_mut().push(value);
    }

    /// Append `value` unless an equal one is already present
    pub(crate) fn push_unique(&self, value: T, equal: impl Fn(&T, &T) -> bool) {
        let mut values = self.values.borrow_mut();
        if !values.iter().any(|existing| equal(existing, &value)) {
            values.push(value);
        }
    }
}

impl<T> Clone for QueryVar<T> {
    fn clone(&self) -> Self {
        Self {
            values: Rc::clone(&self.values),
        }
    }
}

impl<T> Default for QueryVar<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares collected values, not collector identity.
impl<T: PartialEq> PartialEq for QueryVar<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.values.borrow() == *other.values.borrow()
    }
}

/// An argument of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTerm<T> {
    /// Position constrained to a value
    Literal(T),
    /// Open position reporting into a collector
    Variable(QueryVar<T>),
}

impl<T> QueryTerm<T> {
    /// Literal argument
    pub fn lit(value: T) -> Self {
        QueryTerm::Literal(value)
    }

    /// Open argument reporting into `var`
    #[must_use]
    pub fn var(var: &QueryVar<T>) -> Self {
        QueryTerm::Variable(var.clone())
    }

    pub(crate) fn literal(&self) -> Option<&T> {
        match self {
            QueryTerm::Literal(value) => Some(value),
            QueryTerm::Variable(_) => None,
        }
    }

    pub(crate) fn variable(&self) -> Option<&QueryVar<T>> {
        match self {
            QueryTerm::Variable(var) => Some(var),
            QueryTerm::Literal(_) => None,
        }
    }
}

impl<T> From<QueryVar<T>> for QueryTerm<T> {
    fn from(var: QueryVar<T>) -> Self {
        QueryTerm::Variable(var)
    }
}

impl<T> From<&QueryVar<T>> for QueryTerm<T> {
    fn from(var: &QueryVar<T>) -> Self {
        QueryTerm::var(var)
    }
}
