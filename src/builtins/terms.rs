//! Unification, comparison, type checks and term inspection.

use super::{atom_arg, det, integer_arg, list_arg, text_arg, value};
use crate::bindings::VarMap;
use crate::compare::{compare, identical};
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::parser::parse_number;
use crate::symbol::{known, Atom};
use crate::term::{Args, Term};
use crate::unify::unify_with_occurs_check;
use std::cmp::Ordering;

pub(super) fn register(kb: &KnowledgeBase) {
    det(kb, "=", 2, |a, m| Ok(m.unify(&a[0], &a[1])));
    det(kb, "\\=", 2, not_unifiable);
    det(kb, "unify_with_occurs_check", 2, |a, m| {
        Ok(unify_with_occurs_check(&a[0], &a[1], &mut m.bindings))
    });
    det(kb, "==", 2, |a, m| Ok(identical(&a[0], &a[1], &m.bindings)));
    det(kb, "\\==", 2, |a, m| Ok(!identical(&a[0], &a[1], &m.bindings)));
    det(kb, "@<", 2, |a, m| Ok(order(a, m) == Ordering::Less));
    det(kb, "@>", 2, |a, m| Ok(order(a, m) == Ordering::Greater));
    det(kb, "@=<", 2, |a, m| Ok(order(a, m) != Ordering::Greater));
    det(kb, "@>=", 2, |a, m| Ok(order(a, m) != Ordering::Less));
    det(kb, "compare", 3, compare3);

    det(kb, "var", 1, |a, m| Ok(value(&a[0], m).is_var()));
    det(kb, "nonvar", 1, |a, m| Ok(!value(&a[0], m).is_var()));
    det(kb, "atom", 1, |a, m| {
        Ok(matches!(value(&a[0], m), Term::Atom(_) | Term::EmptyList))
    });
    det(kb, "number", 1, |a, m| {
        Ok(matches!(value(&a[0], m), Term::Integer(_) | Term::Float(_)))
    });
    det(kb, "integer", 1, |a, m| Ok(matches!(value(&a[0], m), Term::Integer(_))));
    det(kb, "float", 1, |a, m| Ok(matches!(value(&a[0], m), Term::Float(_))));
    det(kb, "atomic", 1, |a, m| Ok(value(&a[0], m).is_atomic()));
    det(kb, "compound", 1, |a, m| Ok(value(&a[0], m).is_compound()));
    det(kb, "callable", 1, |a, m| Ok(value(&a[0], m).is_callable()));
    det(kb, "is_list", 1, |a, m| {
        Ok(matches!(m.bindings.list_items(&a[0]).1, Term::EmptyList))
    });
    det(kb, "ground", 1, |a, m| Ok(m.bindings.is_ground(&a[0])));

    det(kb, "functor", 3, functor);
    det(kb, "arg", 3, arg);
    det(kb, "=..", 2, univ);
    det(kb, "copy_term", 2, |a, m| {
        let copy = m.bindings.copy(&a[0], &mut VarMap::new());
        Ok(m.unify(&copy, &a[1]))
    });
    det(kb, "atom_length", 2, |a, m| {
        let text = text_arg(&a[0], m)?;
        Ok(m.unify(&a[1], &Term::integer(text.chars().count() as i64)))
    });
    det(kb, "atom_codes", 2, atom_codes);
    det(kb, "atom_chars", 2, atom_chars);
    det(kb, "number_codes", 2, number_codes);
    det(kb, "atom_number", 2, atom_number);
}

fn not_unifiable(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let unified = m.unify(&a[0], &a[1]);
    m.backtrack_all(a);
    Ok(!unified)
}

fn order(a: &[Term], m: &Machine) -> Ordering {
    compare(&a[0], &a[1], &m.bindings)
}

fn compare3(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let k = known();
    let expected = value(&a[0], m);
    match &expected {
        Term::Var(_) => {}
        Term::Atom(name) if [k.lt, k.eq, k.gt].contains(name) => {}
        Term::Atom(_) => return Err(PrologError::domain_error("order", expected)),
        _ => return Err(PrologError::type_error("atom", expected)),
    }
    let symbol = match compare(&a[1], &a[2], &m.bindings) {
        Ordering::Less => k.lt,
        Ordering::Equal => k.eq,
        Ordering::Greater => k.gt,
    };
    Ok(m.unify(&a[0], &Term::from_atom(symbol)))
}

fn functor(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let term = value(&a[0], m);
    if !term.is_var() {
        let (name, arity) = match &term {
            t if t.is_compound() => (t.name().map_or(Term::EmptyList, Term::from_atom), t.arity()),
            t => (t.clone(), 0),
        };
        return Ok(m.unify(&a[1], &name) && m.unify(&a[2], &Term::integer(arity as i64)));
    }

    let arity = integer_arg(&a[2], m)?;
    let name = value(&a[1], m);
    if name.is_var() {
        return Err(PrologError::instantiation());
    }
    if arity < 0 {
        return Err(PrologError::domain_error("not_less_than_zero", Term::integer(arity)));
    }
    if arity == 0 {
        if !name.is_atomic() {
            return Err(PrologError::type_error("atomic", name));
        }
        return Ok(m.unify(&a[0], &name));
    }
    let name = match name {
        Term::Atom(atom) => atom,
        Term::EmptyList => known().nil,
        other if other.is_atomic() => return Err(PrologError::type_error("atom", other)),
        other => return Err(PrologError::type_error("atomic", other)),
    };
    let args: Args = (0..arity).map(|_| m.bindings.fresh()).collect();
    Ok(m.unify(&a[0], &Term::compound(name, args)))
}

fn arg(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let n = integer_arg(&a[0], m)?;
    let term = value(&a[1], m);
    if term.is_var() {
        return Err(PrologError::instantiation());
    }
    if !term.is_compound() {
        return Err(PrologError::type_error("compound", term));
    }
    if n < 1 || n as usize > term.arity() {
        return Ok(false);
    }
    Ok(m.unify(&a[2], &term.args()[n as usize - 1]))
}

fn univ(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let term = value(&a[0], m);
    if !term.is_var() {
        let list = if term.is_compound() {
            let name = term.name().map_or(Term::EmptyList, Term::from_atom);
            Term::list(std::iter::once(name).chain(term.args().iter().cloned()).collect::<Vec<_>>())
        } else {
            Term::list([term])
        };
        return Ok(m.unify(&a[1], &list));
    }

    let items = list_arg(&a[1], m)?;
    let Some((head, rest)) = items.split_first() else {
        return Err(PrologError::domain_error("non_empty_list", Term::EmptyList));
    };
    let head = value(head, m);
    if rest.is_empty() {
        return Ok(m.unify(&a[0], &head));
    }
    let name = match head {
        Term::Atom(atom) => atom,
        Term::EmptyList => known().nil,
        Term::Var(_) => return Err(PrologError::instantiation()),
        other => return Err(PrologError::type_error("atom", other)),
    };
    Ok(m.unify(&a[0], &Term::compound(name, rest.to_vec())))
}

fn char_codes(text: &str) -> Term {
    Term::list(text.chars().map(|c| Term::integer(c as i64)).collect::<Vec<_>>())
}

fn code_text(term: &Term, m: &Machine) -> Result<String, PrologError> {
    list_arg(term, m)?
        .iter()
        .map(|code| {
            let value = integer_arg(code, m)?;
            u32::try_from(value)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| PrologError::domain_error("character_code", Term::integer(value)))
        })
        .collect()
}

fn char_text(term: &Term, m: &Machine) -> Result<String, PrologError> {
    list_arg(term, m)?
        .iter()
        .map(|ch| {
            let atom: Atom = atom_arg(ch, m)?;
            let mut chars = atom.name().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(PrologError::type_error("character", Term::from_atom(atom))),
            }
        })
        .collect()
}

fn atom_codes(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    if !value(&a[0], m).is_var() {
        let text = text_arg(&a[0], m)?;
        return Ok(m.unify(&a[1], &char_codes(&text)));
    }
    let text = code_text(&a[1], m)?;
    Ok(m.unify(&a[0], &Term::atom(&text)))
}

fn atom_chars(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    if !value(&a[0], m).is_var() {
        let text = text_arg(&a[0], m)?;
        let chars: Vec<Term> = text.chars().map(|c| Term::atom(c.encode_utf8(&mut [0; 4]))).collect();
        return Ok(m.unify(&a[1], &Term::list(chars)));
    }
    let text = char_text(&a[1], m)?;
    Ok(m.unify(&a[0], &Term::atom(&text)))
}

fn number_codes(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let number = value(&a[0], m);
    match number {
        Term::Integer(_) | Term::Float(_) => {
            let text = text_arg(&number, m)?;
            return Ok(m.unify(&a[1], &char_codes(&text)));
        }
        Term::Var(_) => {}
        other => return Err(PrologError::type_error("number", other)),
    }
    let text = code_text(&a[1], m)?;
    match parse_number(&text) {
        Some(parsed) => Ok(m.unify(&a[0], &parsed)),
        None => Err(PrologError::domain_error("number_text", Term::atom(&text))),
    }
}

fn atom_number(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    let atom = value(&a[0], m);
    if atom.is_var() {
        let number = value(&a[1], m);
        return match number {
            Term::Integer(_) | Term::Float(_) => {
                let text = text_arg(&number, m)?;
                Ok(m.unify(&a[0], &Term::atom(&text)))
            }
            Term::Var(_) => Err(PrologError::instantiation()),
            other => Err(PrologError::type_error("number", other)),
        };
    }
    let name = atom_arg(&a[0], m)?;
    match parse_number(name.name()) {
        Some(parsed) => Ok(m.unify(&a[1], &parsed)),
        None => Ok(false),
    }
}
