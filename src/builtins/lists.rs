//! Native list predicates: `length/2` and the sorts.

use super::{det, integer_arg, list_arg, value};
use crate::compare::{compare, sort_terms};
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Outcome, Predicate, PredicateFactory};
use crate::symbol::known;
use crate::term::{Args, PredicateKey, Term};
use std::sync::Arc;

pub(super) fn register(kb: &KnowledgeBase) {
    kb.register(PredicateKey::of("length", 2), Arc::new(LengthFactory));
    det(kb, "msort", 2, |a, m| sorted(a, m, false));
    det(kb, "sort", 2, |a, m| sorted(a, m, true));
    det(kb, "keysort", 2, keysort);
}

fn sorted(a: &[Term], m: &mut Machine, dedup: bool) -> Result<bool, PrologError> {
    let mut items = list_arg(&a[0], m)?;
    sort_terms(&mut items, &m.bindings, dedup);
    Ok(m.unify(&a[1], &Term::list(items)))
}

fn keysort(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let minus = known().minus;
    let mut pairs = list_arg(&a[0], m)?
        .into_iter()
        .map(|item| match value(&item, m) {
            pair if pair.has_functor(minus, 2) => Ok(pair),
            Term::Var(_) => Err(PrologError::instantiation()),
            other => Err(PrologError::type_error("pair", other)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    // `sort_by` is stable, so equal keys keep their input order.
    pairs.sort_by(|x, y| compare(&x.args()[0], &y.args()[0], &m.bindings));
    Ok(m.unify(&a[1], &Term::list(pairs)))
}

struct LengthFactory;

impl PredicateFactory for LengthFactory {
    fn predicate(&self, args: Args, m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        let (prefix, tail) = m.bindings.list_items(&args[0]);
        let wanted = match value(&args[1], m) {
            Term::Var(_) => None,
            _ => {
                let n = integer_arg(&args[1], m)?;
                if n < 0 {
                    return Err(PrologError::domain_error(
                        "not_less_than_zero",
                        Term::integer(n),
                    ));
                }
                Some(n as usize)
            }
        };
        let state = match tail {
            Term::EmptyList => LengthState::Proper(prefix.len()),
            Term::Var(_) => LengthState::Open {
                prefix: prefix.len(),
                tail,
                extra: 0,
            },
            _ => LengthState::Done,
        };
        Ok(Box::new(Length {
            args,
            wanted,
            state,
        }))
    }
}

enum LengthState {
    Proper(usize),
    /// A partial list: each solution closes the tail with `extra` more cells.
    Open {
        prefix: usize,
        tail: Term,
        extra: usize,
    },
    Done,
}

/// `length/2`; enumerates ever longer lists when both the list's tail and
/// the length are unbound.
struct Length {
    args: Args,
    wanted: Option<usize>,
    state: LengthState,
}

impl Predicate for Length {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        m.backtrack_all(&self.args);
        match std::mem::replace(&mut self.state, LengthState::Done) {
            LengthState::Proper(len) => Ok(m.unify(&self.args[1], &Term::integer(len as i64))),
            LengthState::Open {
                prefix,
                tail,
                extra,
            } => {
                let extra = match self.wanted {
                    Some(n) if n < prefix => return Ok(false),
                    Some(n) => n - prefix,
                    None => {
                        self.state = LengthState::Open {
                            prefix,
                            tail: tail.clone(),
                            extra: extra + 1,
                        };
                        extra
                    }
                };
                let cells: Vec<Term> = (0..extra).map(|_| m.bindings.fresh()).collect();
                let ok = m.unify(&tail, &Term::list(cells))
                    && m.unify(&self.args[1], &Term::integer((prefix + extra) as i64));
                if !ok {
                    m.backtrack_all(&self.args);
                }
                Ok(ok)
            }
            LengthState::Done => Ok(false),
        }
    }

    fn could_reevaluation_succeed(&self) -> bool {
        !matches!(self.state, LengthState::Done)
    }
}
