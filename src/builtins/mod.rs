//! Native built-in predicates and the Prolog-source library.

mod arith;
mod db;
mod io;
mod lists;
mod terms;

pub use arith::{eval, Number};

use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Det, DetFn};
use crate::symbol::Atom;
use crate::term::{PredicateKey, Term};
use std::sync::Arc;

/// List predicates written in Prolog, consulted by a new engine unless
/// disabled.
pub const LIBRARY: &str = include_str!("library.pl");

/// Register every native built-in.
pub fn register(kb: &KnowledgeBase) {
    crate::control::register(kb);
    crate::aggregate::register(kb);
    terms::register(kb);
    arith::register(kb);
    lists::register(kb);
    db::register(kb);
    io::register(kb);
}

fn det(kb: &KnowledgeBase, name: &str, arity: u32, run: DetFn) {
    kb.register(PredicateKey::of(name, arity), Arc::new(Det::new(run)));
}

/// Dereferenced value of an argument.
fn value(term: &Term, m: &Machine) -> Term {
    m.deref(term)
}

fn integer_arg(term: &Term, m: &Machine) -> Result<i64, PrologError> {
    match value(term, m) {
        Term::Integer(i) => Ok(i),
        Term::Var(_) => Err(PrologError::instantiation()),
        other => Err(PrologError::type_error("integer", other)),
    }
}

fn atom_arg(term: &Term, m: &Machine) -> Result<Atom, PrologError> {
    match value(term, m) {
        Term::Atom(a) => Ok(a),
        Term::EmptyList => Ok(crate::symbol::known().nil),
        Term::Var(_) => Err(PrologError::instantiation()),
        other => Err(PrologError::type_error("atom", other)),
    }
}

/// Items of a proper list; a partial list is an instantiation error.
fn list_arg(term: &Term, m: &Machine) -> Result<Vec<Term>, PrologError> {
    let (items, tail) = m.bindings.list_items(term);
    match tail {
        Term::EmptyList => Ok(items),
        Term::Var(_) => Err(PrologError::instantiation()),
        _ => Err(PrologError::type_error("list", m.resolve(term))),
    }
}

/// Text of an atom or number, as `atom_length/2` and friends see it.
fn text_arg(term: &Term, m: &Machine) -> Result<String, PrologError> {
    match value(term, m) {
        Term::Atom(a) => Ok(a.name().to_string()),
        Term::EmptyList => Ok("[]".to_string()),
        Term::Integer(i) => Ok(i.to_string()),
        Term::Float(f) => Ok(crate::format::format_float(f)),
        Term::Var(_) => Err(PrologError::instantiation()),
        other => Err(PrologError::type_error("atomic", other)),
    }
}

#[cfg(test)]
#[path = "../tests/builtins.rs"]
mod tests;
