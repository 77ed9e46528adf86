//! Run-time database updates: `assert/1` and friends, `retract/1`,
//! `retractall/1` and `dynamic/1`.
//!
//! Updates never disturb a call already iterating a predicate: it keeps
//! the clause snapshot it started with.

use super::{det, integer_arg, list_arg, value};
use crate::clause::{split_clause, ClauseModel, IndexKey};
use crate::error::PrologError;
use crate::kb::{ClauseTable, KnowledgeBase};
use crate::machine::Machine;
use crate::symbol::known;
use crate::term::{PredicateKey, Term};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use crate::trace::debug;

pub(super) fn register(kb: &KnowledgeBase) {
    det(kb, "assert", 1, |a, m| add(a, m, false));
    det(kb, "assertz", 1, |a, m| add(a, m, false));
    det(kb, "asserta", 1, |a, m| add(a, m, true));
    det(kb, "retract", 1, retract);
    det(kb, "retractall", 1, retractall);
    det(kb, "dynamic", 1, dynamic);
}

fn add(a: &[Term], m: &mut Machine, front: bool) -> Result<bool, PrologError> {
    let clause = m.resolve(&a[0]);
    // Renumber the clause's variables to `0..n` so it no longer shares
    // anything with the running query.
    let (template, var_count) = m.bindings.canonical(&clause);
    m.kb().add_clause(&template, var_count, front)?;
    Ok(true)
}

/// Table of the predicate a clause head belongs to, or `None` when it has
/// none yet.
fn table_of(head: &Term, m: &Machine) -> Result<Option<Arc<ClauseTable>>, PrologError> {
    let key = head
        .key()
        .ok_or_else(|| PrologError::type_error("callable", head.clone()))?;
    if m.kb().is_builtin(key) {
        return Err(PrologError::permission("modify", key));
    }
    Ok(m.kb().existing_table(key))
}

/// Rename `clause` into fresh variables, returning its head and body.
fn rename(clause: &ClauseModel, m: &mut Machine) -> (Term, Term) {
    let base = m.bindings.fresh_block(clause.var_count());
    let head = m.bindings.instantiate(clause.head(), base);
    let body = m.bindings.instantiate(clause.body(), base);
    (head, body)
}

/// Remove the first clause unifying with the argument, leaving the
/// unifier in place.
fn retract(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let (head, body) = split_clause(&m.resolve(&a[0]))?;
    let Some(table) = table_of(&head, m)? else {
        return Ok(false);
    };
    let index = head.args().first().and_then(|arg| IndexKey::of(&m.deref(arg)));
    for clause in table.snapshot().iter() {
        if !clause.may_match(index) {
            continue;
        }
        let (h, b) = rename(clause, m);
        if m.unify(&head, &h) && m.unify(&body, &b) && table.remove(clause) {
            #[cfg(feature = "tracing")]
            debug!(pred = %table.key(), "retract");
            return Ok(true);
        }
        m.backtrack_all(a);
    }
    Ok(false)
}

/// Remove every clause whose head unifies with the argument. Always
/// succeeds, declaring the predicate if it was unknown.
fn retractall(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let head = m.resolve(&a[0]);
    if head.is_var() {
        return Err(PrologError::instantiation());
    }
    let key = head
        .key()
        .ok_or_else(|| PrologError::type_error("callable", head.clone()))?;
    let table = m.kb().table(key, "modify")?;
    m.kb().declare_dynamic(key)?;
    for clause in table.snapshot().iter() {
        let (h, _) = rename(clause, m);
        if m.unify(&head, &h) {
            table.remove(clause);
        }
        m.backtrack(&head);
    }
    Ok(true)
}

fn dynamic(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let k = known();
    let spec = value(&a[0], m);
    match &spec {
        Term::Var(_) => Err(PrologError::instantiation()),
        t if t.has_functor(k.comma, 2) => {
            dynamic(&t.args()[..1], m)?;
            dynamic(&t.args()[1..], m)
        }
        Term::List(_) | Term::EmptyList => {
            for item in list_arg(&spec, m)? {
                dynamic(&[item], m)?;
            }
            Ok(true)
        }
        t if t.has_functor(k.slash, 2) => {
            let name = match value(&t.args()[0], m) {
                Term::Atom(name) => name,
                Term::Var(_) => return Err(PrologError::instantiation()),
                other => return Err(PrologError::type_error("atom", other)),
            };
            let arity = integer_arg(&t.args()[1], m)?;
            let arity = u32::try_from(arity).map_err(|_| {
                PrologError::domain_error("not_less_than_zero", Term::integer(arity))
            })?;
            m.kb().declare_dynamic(PredicateKey::new(name, arity))?;
            Ok(true)
        }
        _ => Err(PrologError::type_error("predicate_indicator", spec.clone())),
    }
}
