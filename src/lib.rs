//! backlog: a tree-walking Prolog engine.
//!
//! Terms live in a per-query binding arena ([`bindings`]); goals are run by
//! evaluator objects ([`predicate`]) that produce one solution per call and
//! undo their own bindings when they fail. Control constructs
//! ([`control`]) and aggregation ([`aggregate`]) are evaluators like any
//! other, specialized ahead of time by [`preprocess`].

pub mod aggregate;
pub mod api;
pub mod bindings;
pub mod builtins;
pub mod clause;
pub mod compare;
pub mod control;
pub mod error;
pub mod format;
pub mod kb;
pub mod lexer;
pub mod machine;
pub mod metrics;
pub mod ops;
pub mod parser;
pub mod predicate;
pub mod preprocess;
pub mod repl;
pub mod resolution;
pub mod symbol;
pub mod term;
pub mod trace;
pub mod unify;

pub use api::{Answer, Engine, EngineConfig, Query};
pub use error::{ErrorKind, PrologError};
pub use term::Term;

#[cfg(test)]
pub(crate) mod test_utils;
