use crate::bindings::Bindings;
use crate::term::{Term, VarId};
use smallvec::SmallVec;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use crate::trace::trace;

/// Unify two terms by binding variables in `bindings`.
///
/// Uses an explicit worklist, so neither deep nesting of list spines nor
/// long lists recurse. No occurs-check is performed.
///
/// On failure the bindings made so far are left in place: the caller owns
/// the undo and must backtrack its own argument terms.
pub fn unify(a: &Term, b: &Term, bindings: &mut Bindings) -> bool {
    unify_terms(a, b, bindings, false)
}

/// Like [`unify`], but refuses to bind a variable to a term containing it.
pub fn unify_with_occurs_check(a: &Term, b: &Term, bindings: &mut Bindings) -> bool {
    unify_terms(a, b, bindings, true)
}

fn unify_terms(a: &Term, b: &Term, bindings: &mut Bindings, occurs_check: bool) -> bool {
    let mut worklist: SmallVec<[(Term, Term); 16]> = SmallVec::new();
    worklist.push((a.clone(), b.clone()));

    while let Some((x, y)) = worklist.pop() {
        let x = bindings.deref(&x).clone();
        let y = bindings.deref(&y).clone();

        match (&x, &y) {
            (Term::Var(v), Term::Var(w)) if v == w => {}
            (Term::Var(v), _) => {
                if occurs_check && occurs(*v, &y, bindings) {
                    #[cfg(feature = "tracing")]
                    trace!(var = v.0, "unify_occurs_check_failed");
                    return false;
                }
                bindings.bind(*v, y);
            }
            (_, Term::Var(w)) => {
                if occurs_check && occurs(*w, &x, bindings) {
                    #[cfg(feature = "tracing")]
                    trace!(var = w.0, "unify_occurs_check_failed");
                    return false;
                }
                bindings.bind(*w, x);
            }
            (Term::Atom(p), Term::Atom(q)) => {
                if p != q {
                    return false;
                }
            }
            (Term::Integer(p), Term::Integer(q)) => {
                if p != q {
                    return false;
                }
            }
            (Term::Float(p), Term::Float(q)) => {
                if p != q {
                    return false;
                }
            }
            (Term::EmptyList, Term::EmptyList) => {}
            (Term::Struct(s), Term::Struct(t)) => {
                if Arc::ptr_eq(s, t) && s.is_immutable() {
                    continue;
                }
                if s.name() != t.name() || s.arity() != t.arity() {
                    #[cfg(feature = "tracing")]
                    trace!("unify_functor_mismatch");
                    return false;
                }
                for (p, q) in s.args().iter().zip(t.args()).rev() {
                    worklist.push((p.clone(), q.clone()));
                }
            }
            (Term::List(c), Term::List(d)) => {
                if Arc::ptr_eq(c, d) && c.is_immutable() {
                    continue;
                }
                // Tail below head: elements are matched front to back while
                // the spine itself is consumed one cell per iteration.
                worklist.push((c.tail().clone(), d.tail().clone()));
                worklist.push((c.head().clone(), d.head().clone()));
            }
            _ => return false,
        }
    }

    true
}

/// Does `var` occur in `term` under the current bindings?
fn occurs(var: VarId, term: &Term, bindings: &Bindings) -> bool {
    let mut stack: SmallVec<[&Term; 16]> = SmallVec::new();
    stack.push(term);

    while let Some(t) = stack.pop() {
        match bindings.deref(t) {
            Term::Var(v) => {
                if *v == var {
                    return true;
                }
            }
            Term::Struct(s) if !s.is_immutable() => stack.extend(s.args().iter()),
            Term::List(c) if !c.is_immutable() => stack.extend(c.cells().iter()),
            _ => {}
        }
    }

    false
}
