//! Stored clauses.

use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::predicate::PredicateFactory;
use crate::preprocess::prepare;
use crate::symbol::{known, Atom};
use crate::term::{PredicateKey, Term};
use std::sync::Arc;

/// A clause `head :- body` whose variables are numbered `0..var_count`.
///
/// Renaming a clause for one call allocates `var_count` fresh slots and
/// instantiates the head (and, once the head matched, the body) at that
/// offset.
pub struct ClauseModel {
    head: Term,
    body: Term,
    var_count: u32,
    body_factory: Option<Arc<dyn PredicateFactory>>,
    index: Option<IndexKey>,
}

impl ClauseModel {
    /// Build from a clause term numbered `0..var_count`, preparing the body
    /// against `kb`.
    pub fn new(term: &Term, var_count: u32, kb: &KnowledgeBase) -> Result<Self, PrologError> {
        let (head, body) = split_clause(term)?;
        let body = normalize_body(&body)?;
        let body_factory = prepare(&body, kb);
        let index = head.args().first().and_then(IndexKey::of);
        Ok(Self {
            head,
            body,
            var_count,
            body_factory,
            index,
        })
    }

    pub fn head(&self) -> &Term {
        &self.head
    }

    pub fn body(&self) -> &Term {
        &self.body
    }

    pub fn var_count(&self) -> u32 {
        self.var_count
    }

    pub fn body_factory(&self) -> Option<&Arc<dyn PredicateFactory>> {
        self.body_factory.as_ref()
    }

    pub fn is_fact(&self) -> bool {
        self.body == Term::from_atom(known().truth)
    }

    /// Could this clause's head match a call whose first argument indexes as `key`?
    pub fn may_match(&self, key: Option<IndexKey>) -> bool {
        match (self.index, key) {
            (Some(own), Some(call)) => own == call,
            _ => true,
        }
    }

    /// The clause as a term, for listing.
    pub fn to_term(&self) -> Term {
        if self.is_fact() {
            self.head.clone()
        } else {
            Term::compound(known().neck, [self.head.clone(), self.body.clone()])
        }
    }
}

/// Split a clause term into head and body, checking the head is callable.
pub fn split_clause(term: &Term) -> Result<(Term, Term), PrologError> {
    let (head, body) = if term.has_functor(known().neck, 2) {
        (term.args()[0].clone(), term.args()[1].clone())
    } else {
        (term.clone(), Term::from_atom(known().truth))
    };
    if head.is_var() {
        return Err(PrologError::instantiation());
    }
    if !head.is_callable() {
        return Err(PrologError::type_error("callable", head));
    }
    Ok((head, body))
}

/// Wrap variables in control positions in `call/1` and reject numbers.
pub fn normalize_body(body: &Term) -> Result<Term, PrologError> {
    let k = known();
    match body {
        Term::Var(_) => Ok(Term::compound(k.call, [body.clone()])),
        Term::Integer(_) | Term::Float(_) => Err(PrologError::type_error("callable", body.clone())),
        Term::Struct(s)
            if s.arity() == 2 && [k.comma, k.semicolon, k.if_then].contains(&s.name()) =>
        {
            let left = normalize_body(&s.args()[0])?;
            let right = normalize_body(&s.args()[1])?;
            Ok(Term::compound(s.name(), [left, right]))
        }
        _ => Ok(body.clone()),
    }
}

/// First-argument index of a clause head or a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKey {
    Atom(Atom),
    Integer(i64),
    Float(u64),
    Nil,
    Functor(Atom, usize),
}

impl IndexKey {
    /// `None` for variables, which match anything.
    pub fn of(term: &Term) -> Option<IndexKey> {
        match term {
            Term::Var(_) => None,
            Term::Atom(a) => Some(IndexKey::Atom(*a)),
            Term::Integer(i) => Some(IndexKey::Integer(*i)),
            // `-0.0` unifies with `0.0`, so both share a key.
            Term::Float(f) if *f == 0.0 => Some(IndexKey::Float(0f64.to_bits())),
            Term::Float(f) => Some(IndexKey::Float(f.to_bits())),
            Term::EmptyList => Some(IndexKey::Nil),
            Term::Struct(s) => Some(IndexKey::Functor(s.name(), s.arity())),
            Term::List(_) => Some(IndexKey::Functor(known().dot, 2)),
        }
    }
}

/// Key of the predicate a clause term belongs to.
pub fn clause_key(term: &Term) -> Result<PredicateKey, PrologError> {
    let (head, _) = split_clause(term)?;
    head.key()
        .ok_or_else(|| PrologError::type_error("callable", head))
}
