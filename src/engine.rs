use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::knowledge::{Atom, KnowledgeBase, PredicateId, Rule, Tuple};
use crate::term::{Term, VarId};

/// Values bound to rule variables by one derivation
pub(crate) type Bindings<T> = IndexMap<VarId, T>;

/// Rule variables bound by a head match: `Some` for a query literal, `None`
/// for an open query position
type HeadBindings<T> = IndexMap<VarId, Option<T>>;

/// Per-position constraint of a search: `Some(value)` requires equality,
/// `None` accepts any value
pub(crate) type Pattern<'a, T> = SmallVec<[Option<&'a T>; 4]>;

/// Top-down resolution over a knowledge base.
///
/// A resolver lives for one query. Besides the answers it remembers whether
/// the configured depth limit cut any rule expansion short.
pub(crate) struct Resolver<'kb, T> {
    kb: &'kb KnowledgeBase<T>,
    truncated: bool,
}

impl<'kb, T: Clone> Resolver<'kb, T> {
    pub(crate) fn new(kb: &'kb KnowledgeBase<T>) -> Self {
        Self {
            kb,
            truncated: false,
        }
    }

    /// Whether the depth limit pruned any rule expansion
    pub(crate) fn truncated(&self) -> bool {
        self.truncated
    }

    /// Find every tuple of `predicate` matching `pattern`.
    ///
    /// Fact matches come first, then rule derivations in declaration order.
    /// Duplicates are kept: each one is a separate proof.
    pub(crate) fn search(
        &mut self,
        predicate: PredicateId,
        pattern: &[Option<&T>],
        depth: usize,
    ) -> Vec<Tuple<T>> {
        log::trace!(
            "search `{}` depth {depth}, {} bound position(s)",
            self.kb.display_name(predicate),
            pattern.iter().filter(|slot| slot.is_some()).count()
        );

        let mut found = self.search_facts(predicate, pattern);
        found.extend(self.search_rules(predicate, pattern, depth));
        found
    }

    fn search_facts(&self, predicate: PredicateId, pattern: &[Option<&T>]) -> Vec<Tuple<T>> {
        self.kb
            .stored_facts(predicate)
            .iter()
            .filter(|fact| self.matches_pattern(fact, pattern))
            .cloned()
            .collect()
    }

    /// Check a ground tuple against the literal positions of a pattern
    fn matches_pattern(&self, tuple: &[T], pattern: &[Option<&T>]) -> bool {
        tuple.len() == pattern.len()
            && tuple.iter().zip(pattern).all(|(value, wanted)| match wanted {
                Some(wanted) => self.kb.equal(value, wanted),
                None => true,
            })
    }

    fn search_rules(
        &mut self,
        predicate: PredicateId,
        pattern: &[Option<&T>],
        depth: usize,
    ) -> Vec<Tuple<T>> {
        let kb = self.kb;
        let rules = kb.rules_for(predicate);
        if rules.is_empty() {
            return Vec::new();
        }

        if let Some(limit) = kb.config().max_depth {
            if depth >= limit {
                if !self.truncated {
                    log::warn!(
                        "rule expansion for `{}` stopped at depth {depth}; answers may be incomplete",
                        kb.display_name(predicate)
                    );
                }
                self.truncated = true;
                return Vec::new();
            }
        }

        let mut derived = Vec::new();
        for rule in rules {
            derived.extend(self.derive(rule, pattern, depth));
        }
        derived
    }

    /// Answers contributed by one rule entry, across all of its bodies
    fn derive(&mut self, rule: &Rule<T>, pattern: &[Option<&T>], depth: usize) -> Vec<Tuple<T>> {
        let head = rule.head();
        let Some(head_bindings) = self.match_head(head, pattern) else {
            return Vec::new();
        };

        let mut derived = Vec::new();
        for body in rule.bodies() {
            for binding in self.resolve_body(body, &head_bindings, depth) {
                match Self::instantiate(head, &binding, &head_bindings) {
                    Some(tuple) => derived.push(tuple),
                    None => log::trace!(
                        "derivation of `{}` left a head variable unbound",
                        self.kb.display_name(head.predicate())
                    ),
                }
            }
        }
        derived
    }

    /// Match a rule head against a query pattern.
    ///
    /// Literal head positions must equal the query literal. Variable positions
    /// take the query literal, or stay open for an open query position. A
    /// variable repeated in the head must receive equal literals.
    fn match_head(&self, head: &Atom<T>, pattern: &[Option<&T>]) -> Option<HeadBindings<T>> {
        if head.arity() != pattern.len() {
            return None;
        }

        let mut bound = HeadBindings::new();
        for (term, wanted) in head.terms().iter().zip(pattern.iter().copied()) {
            match term {
                Term::Literal(value) => {
                    if wanted.is_some_and(|wanted| !self.kb.equal(value, wanted)) {
                        return None;
                    }
                }
                Term::Variable(var) => {
                    let Some(wanted) = wanted else {
                        bound.entry(var.id()).or_insert(None);
                        continue;
                    };
                    match bound.get(&var.id()) {
                        Some(Some(existing)) => {
                            if !self.kb.equal(existing, wanted) {
                                return None;
                            }
                        }
                        _ => {
                            bound.insert(var.id(), Some(wanted.clone()));
                        }
                    }
                }
            }
        }
        Some(bound)
    }

    /// Resolve a conjunction of goals into complete variable bindings.
    ///
    /// Each goal is searched on its own with the head's literals substituted;
    /// its answers become partial bindings which are then joined.
    fn resolve_body(
        &mut self,
        body: &[Atom<T>],
        head: &HeadBindings<T>,
        depth: usize,
    ) -> Vec<Bindings<T>> {
        let mut per_goal = Vec::with_capacity(body.len());
        for goal in body {
            let pattern: Pattern<'_, T> = goal
                .terms()
                .iter()
                .map(|term| match term {
                    Term::Literal(value) => Some(value),
                    Term::Variable(var) => head.get(&var.id()).and_then(Option::as_ref),
                })
                .collect();

            let answers = self.search(goal.predicate(), &pattern, depth + 1);
            let partial = self.goal_bindings(goal, answers);

            // A goal without answers sinks the whole conjunction
            if partial.is_empty() {
                return Vec::new();
            }
            per_goal.push(partial);
        }

        let mut complete = Vec::new();
        self.join(&per_goal, Bindings::new(), &mut complete);
        complete
    }

    /// Turn a goal's answers into bindings of the variables at its positions.
    ///
    /// An answer disagreeing with itself on a repeated variable (e.g.
    /// `likes(X, X)` against `likes(alice, pizza)`) is dropped.
    fn goal_bindings(&self, goal: &Atom<T>, answers: Vec<Tuple<T>>) -> Vec<Bindings<T>> {
        answers
            .into_iter()
            .filter_map(|answer| {
                let mut binding = Bindings::new();
                for (term, value) in goal.terms().iter().zip(answer) {
                    let Term::Variable(var) = term else {
                        continue;
                    };
                    match binding.get(&var.id()) {
                        Some(existing) => {
                            if !self.kb.equal(existing, &value) {
                                return None;
                            }
                        }
                        None => {
                            binding.insert(var.id(), value);
                        }
                    }
                }
                Some(binding)
            })
            .collect()
    }

    /// Depth-first cross product of per-goal bindings.
    ///
    /// `candidate` holds what earlier goals fixed; incompatible extensions are
    /// pruned as soon as they appear. Every candidate surviving the last goal
    /// is pushed to `out`.
    pub(crate) fn join(
        &self,
        per_goal: &[Vec<Bindings<T>>],
        candidate: Bindings<T>,
        out: &mut Vec<Bindings<T>>,
    ) {
        let Some((goal, rest)) = per_goal.split_first() else {
            out.push(candidate);
            return;
        };

        for partial in goal {
            if let Some(extended) = self.extend(&candidate, partial) {
                self.join(rest, extended, out);
            }
        }
    }

    /// Merge a partial binding into a candidate, failing on any conflict
    fn extend(&self, candidate: &Bindings<T>, partial: &Bindings<T>) -> Option<Bindings<T>> {
        let mut extended = candidate.clone();
        for (var, value) in partial {
            match extended.get(var) {
                Some(existing) => {
                    if !self.kb.equal(existing, value) {
                        return None;
                    }
                }
                None => {
                    extended.insert(*var, value.clone());
                }
            }
        }
        Some(extended)
    }

    /// Substitute a complete binding into a rule head.
    ///
    /// A head variable no goal binds falls back to the query literal given at
    /// its position; without one the derivation yields no tuple.
    fn instantiate(
        head: &Atom<T>,
        binding: &Bindings<T>,
        head_bindings: &HeadBindings<T>,
    ) -> Option<Tuple<T>> {
        head.terms()
            .iter()
            .map(|term| match term {
                Term::Literal(value) => Some(value.clone()),
                Term::Variable(var) => binding
                    .get(&var.id())
                    .or_else(|| head_bindings.get(&var.id()).and_then(Option::as_ref))
                    .cloned(),
            })
            .collect()
    }
}
