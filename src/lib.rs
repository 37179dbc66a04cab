//! # Hornlog
//!
//! A minimal embeddable deductive database in Rust.
//!
//! ## Features
//!
//! - Typed predicates of fixed arity over any literal type
//! - Horn-clause rules with alternative bodies
//! - Top-down queries with output variables, with or without duplicates
//! - Custom equality for literals
//!
//! ## Example
//!
//! ```rust
//! use hornlog::{KnowledgeBase, QueryTerm, QueryVar, RuleVar, Term};
//!
//! let mut kb = KnowledgeBase::new();
//! let parent = kb.predicate::<2>("parentChild");
//! let female = kb.predicate::<1>("female");
//! let mother = kb.predicate::<2>("mother");
//!
//! parent.atom([Term::lit("Lucy"), Term::lit("Tommy")]).fact(&mut kb)?;
//! parent.atom([Term::lit("Thomas"), Term::lit("Tommy")]).fact(&mut kb)?;
//! female.atom([Term::lit("Lucy")]).fact(&mut kb)?;
//!
//! // mother(X, Y) :- parentChild(X, Y), female(X)
//! let (x, y) = (RuleVar::new("X"), RuleVar::new("Y"));
//! mother.atom([Term::var(&x), Term::var(&y)]).when(
//!     &mut kb,
//!     [
//!         parent.atom([Term::var(&x), Term::var(&y)]),
//!         female.atom([Term::var(&x)]),
//!     ],
//! );
//!
//! let who = QueryVar::new();
//! let answers = mother.query(&kb, [QueryTerm::var(&who), QueryTerm::lit("Tommy")]);
//!
//! assert!(answers.success());
//! assert_eq!(who.values(), vec!["Lucy"]);
//! assert_eq!(answers.into_tuples(), vec![["Lucy", "Tommy"]]);
//! # Ok::<(), hornlog::Error>(())
//! ```

/// Resolution engine.
mod engine;
/// Error types.
pub mod error;
/// Knowledge base storage and declarations.
pub mod knowledge;
/// Query entry points and answers.
pub mod query;
/// Terms, rule variables and query variables.
pub mod term;

pub use error::{Error, Result};
pub use knowledge::{Atom, Config, KnowledgeBase, Predicate, PredicateId, Rule};
pub use query::Answers;
pub use term::{QueryTerm, QueryVar, RuleVar, Term};
