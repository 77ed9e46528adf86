//! Standard order of terms.
//!
//! Variables < floats < integers < atoms < compound terms. Compounds order
//! by arity, then name, then arguments left to right. `[]` orders as the
//! atom `'[]'` and list cells as `'.'/2`.

use crate::bindings::Bindings;
use crate::term::Term;
use smallvec::SmallVec;
use std::cmp::Ordering;

fn rank(term: &Term) -> u8 {
    match term {
        Term::Var(_) => 0,
        Term::Float(_) => 1,
        Term::Integer(_) => 2,
        Term::Atom(_) | Term::EmptyList => 3,
        Term::Struct(_) | Term::List(_) => 4,
    }
}

/// Compare two terms under the current bindings.
pub fn compare(a: &Term, b: &Term, bindings: &Bindings) -> Ordering {
    let mut pending: SmallVec<[(&Term, &Term); 16]> = SmallVec::new();
    pending.push((a, b));

    while let Some((x, y)) = pending.pop() {
        let x = bindings.deref(x);
        let y = bindings.deref(y);

        let order = rank(x).cmp(&rank(y)).then_with(|| match (x, y) {
            (Term::Var(v), Term::Var(w)) => v.cmp(w),
            (Term::Float(p), Term::Float(q)) => p.total_cmp(q),
            (Term::Integer(p), Term::Integer(q)) => p.cmp(q),
            (Term::Struct(_) | Term::List(_), Term::Struct(_) | Term::List(_)) => {
                x.arity().cmp(&y.arity()).then_with(|| atom_name(x).cmp(atom_name(y)))
            }
            _ => atom_name(x).cmp(atom_name(y)),
        });
        if order != Ordering::Equal {
            return order;
        }

        // Same functor: arguments decide, first argument first.
        pending.extend(x.args().iter().zip(y.args()).rev());
    }

    Ordering::Equal
}

/// `==/2`: identical under the current bindings.
pub fn identical(a: &Term, b: &Term, bindings: &Bindings) -> bool {
    compare(a, b, bindings) == Ordering::Equal
}

fn atom_name(term: &Term) -> &'static str {
    term.name().map(|atom| atom.name()).unwrap_or("")
}

/// Sort terms by the standard order, keeping the first of equal elements.
pub fn sort_terms(items: &mut Vec<Term>, bindings: &Bindings, dedup: bool) {
    items.sort_by(|a, b| compare(a, b, bindings));
    if dedup {
        items.dedup_by(|a, b| identical(a, b, bindings));
    }
}
