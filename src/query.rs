use std::ops::Deref;

use crate::engine::{Pattern, Resolver};
use crate::knowledge::{KnowledgeBase, Predicate};
use crate::term::QueryTerm;

/// Tuples satisfying a query.
///
/// Dereferences to the slice of answers, in derivation order: matching facts
/// first, then rule derivations in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers<T, const N: usize> {
    tuples: Vec<[T; N]>,
    truncated: bool,
}

impl<T, const N: usize> Answers<T, N> {
    /// Whether at least one tuple satisfies the query
    #[must_use]
    pub fn success(&self) -> bool {
        !self.tuples.is_empty()
    }

    /// Whether the depth limit cut resolution short, so that answers may be
    /// missing. Always `false` without a configured `max_depth`.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The answers as a vector
    #[must_use]
    pub fn into_tuples(self) -> Vec<[T; N]> {
        self.tuples
    }
}

impl<T, const N: usize> Deref for Answers<T, N> {
    type Target = [[T; N]];

    fn deref(&self) -> &Self::Target {
        &self.tuples
    }
}

impl<T, const N: usize> IntoIterator for Answers<T, N> {
    type Item = [T; N];
    type IntoIter = std::vec::IntoIter<[T; N]>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.into_iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a Answers<T, N> {
    type Item = &'a [T; N];
    type IntoIter = std::slice::Iter<'a, [T; N]>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

impl<T: Clone> KnowledgeBase<T> {
    /// Find every tuple of `predicate` matching `args`.
    ///
    /// Literal arguments constrain their position; query variables collect the
    /// value found at theirs, once per answer. A tuple provable in several ways
    /// is returned once per proof.
    ///
    /// Without a configured `max_depth` a rule that depends on itself without
    /// bottoming out in facts makes this call recurse without end.
    pub fn query<const N: usize>(
        &self,
        predicate: &Predicate<N>,
        args: [QueryTerm<T>; N],
    ) -> Answers<T, N> {
        self.run_query(predicate, &args, false)
    }

    /// Like [`query`](Self::query), but no two returned tuples are equal and no
    /// query variable collects the same value twice.
    pub fn query_unique<const N: usize>(
        &self,
        predicate: &Predicate<N>,
        args: [QueryTerm<T>; N],
    ) -> Answers<T, N> {
        self.run_query(predicate, &args, true)
    }

    fn run_query<const N: usize>(
        &self,
        predicate: &Predicate<N>,
        args: &[QueryTerm<T>; N],
        unique: bool,
    ) -> Answers<T, N> {
        let pattern: Pattern<'_, T> = args.iter().map(QueryTerm::literal).collect();
        let mut resolver = Resolver::new(self);
        let found = resolver.search(predicate.id(), &pattern, 0);

        let mut tuples: Vec<[T; N]> = Vec::new();
        for tuple in found {
            if unique && tuples.iter().any(|seen| self.tuples_equal(seen, &tuple)) {
                continue;
            }
            match <[T; N]>::try_from(tuple.into_vec()) {
                Ok(tuple) => {
                    self.collect_outputs(args, &tuple, unique);
                    tuples.push(tuple);
                }
                Err(tuple) => log::warn!(
                    "dropping answer of arity {} for `{}`/{}",
                    tuple.len(),
                    self.display_name(predicate.id()),
                    N
                ),
            }
        }

        Answers {
            tuples,
            truncated: resolver.truncated(),
        }
    }

    /// Hand each query variable the value found at its position.
    ///
    /// A variable used at several positions receives one value per answer,
    /// the one at its last position.
    fn collect_outputs(&self, args: &[QueryTerm<T>], tuple: &[T], unique: bool) {
        for (i, (arg, value)) in args.iter().zip(tuple).enumerate() {
            let Some(var) = arg.variable() else {
                continue;
            };
            let used_later = args[i + 1..]
                .iter()
                .filter_map(QueryTerm::variable)
                .any(|later| later.ptr_eq(var));
            if used_later {
                continue;
            }
            if unique {
                var.push_unique(value.clone(), |a, b| self.equal(a, b));
            } else {
                var.push(value.clone());
            }
        }
    }
}
