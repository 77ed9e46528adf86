//! Arithmetic evaluation, `is/2`, numeric comparison, `succ/2` and `between/3`.

use super::{det, integer_arg, value};
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Outcome, Predicate, PredicateFactory};
use crate::term::{Args, PredicateKey, Term};
use std::cmp::Ordering;
use std::sync::Arc;

pub(super) fn register(kb: &KnowledgeBase) {
    det(kb, "is", 2, |a, m| {
        let result = eval(&a[1], m)?.to_term();
        Ok(m.unify(&a[0], &result))
    });
    det(kb, "=:=", 2, |a, m| Ok(numeric_order(a, m)? == Ordering::Equal));
    det(kb, "=\\=", 2, |a, m| Ok(numeric_order(a, m)? != Ordering::Equal));
    det(kb, "<", 2, |a, m| Ok(numeric_order(a, m)? == Ordering::Less));
    det(kb, ">", 2, |a, m| Ok(numeric_order(a, m)? == Ordering::Greater));
    det(kb, "=<", 2, |a, m| Ok(numeric_order(a, m)? != Ordering::Greater));
    det(kb, ">=", 2, |a, m| Ok(numeric_order(a, m)? != Ordering::Less));
    det(kb, "succ", 2, succ);
    kb.register(PredicateKey::of("between", 3), Arc::new(BetweenFactory));
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn to_term(self) -> Term {
        match self {
            Number::Int(i) => Term::Integer(i),
            Number::Float(f) => Term::Float(f),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            (a, b) => a.as_f64().total_cmp(&b.as_f64()),
        }
    }
}

fn overflow() -> PrologError {
    PrologError::evaluation("int_overflow")
}

fn zero_divisor() -> PrologError {
    PrologError::evaluation("zero_divisor")
}

fn undefined() -> PrologError {
    PrologError::evaluation("undefined")
}

fn checked_float(f: f64) -> Result<Number, PrologError> {
    if f.is_nan() {
        Err(undefined())
    } else if f.is_infinite() {
        Err(PrologError::evaluation("float_overflow"))
    } else {
        Ok(Number::Float(f))
    }
}

fn require_int(n: Number) -> Result<i64, PrologError> {
    match n {
        Number::Int(i) => Ok(i),
        Number::Float(f) => Err(PrologError::type_error("integer", Term::Float(f))),
    }
}

/// Float to integer, failing on values outside `i64`.
fn to_int(f: f64) -> Result<Number, PrologError> {
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(Number::Int(f as i64))
    } else {
        Err(overflow())
    }
}

/// Magnitude of a negative shift count; past 63 every count behaves alike.
fn reversed_shift(b: i64) -> i64 {
    b.checked_neg().unwrap_or(i64::MAX)
}

fn shift_left(a: i64, b: i64) -> Result<i64, PrologError> {
    if b < 0 {
        return shift_right(a, reversed_shift(b));
    }
    if b >= 64 {
        return if a == 0 { Ok(0) } else { Err(overflow()) };
    }
    let shifted = a << b;
    if shifted >> b != a {
        return Err(overflow());
    }
    Ok(shifted)
}

fn shift_right(a: i64, b: i64) -> Result<i64, PrologError> {
    if b < 0 {
        return shift_left(a, reversed_shift(b));
    }
    Ok(a >> b.min(63))
}

/// Greatest common divisor, computed on magnitudes so `i64::MIN` is fine
/// as an operand; only a result of 2^63 overflows.
fn gcd(a: i64, b: i64) -> Result<i64, PrologError> {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    i64::try_from(a).map_err(|_| overflow())
}

fn int_pow(base: i64, exp: i64) -> Result<Number, PrologError> {
    if exp < 0 {
        return match base {
            1 => Ok(Number::Int(1)),
            -1 => Ok(Number::Int(if exp % 2 == 0 { 1 } else { -1 })),
            0 => Err(zero_divisor()),
            _ => Err(PrologError::type_error("float", Term::Integer(base))),
        };
    }
    let exp = u32::try_from(exp).map_err(|_| overflow())?;
    base.checked_pow(exp).map(Number::Int).ok_or_else(overflow)
}

/// Evaluate an arithmetic expression under the current bindings.
pub fn eval(term: &Term, m: &Machine) -> Result<Number, PrologError> {
    match m.bindings.deref(term) {
        Term::Integer(i) => Ok(Number::Int(*i)),
        Term::Float(f) => Ok(Number::Float(*f)),
        Term::Var(_) => Err(PrologError::instantiation()),
        Term::Atom(a) => match a.name() {
            "pi" => Ok(Number::Float(std::f64::consts::PI)),
            "e" => Ok(Number::Float(std::f64::consts::E)),
            "inf" | "infinite" => Ok(Number::Float(f64::INFINITY)),
            "max_tagged_integer" => Ok(Number::Int((1 << 60) - 1)),
            "min_tagged_integer" => Ok(Number::Int(-(1 << 60))),
            _ => Err(PrologError::type_error(
                "evaluable",
                PredicateKey::new(*a, 0).indicator(),
            )),
        },
        Term::List(cell) if matches!(m.bindings.deref(cell.tail()), Term::EmptyList) => {
            eval(cell.head(), m)
        }
        t @ Term::Struct(s) => match s.args() {
            [x] => unary(s.name().name(), eval(x, m)?, t),
            [x, y] => binary(s.name().name(), eval(x, m)?, eval(y, m)?, t),
            _ => Err(not_evaluable(t)),
        },
        other => Err(PrologError::type_error("evaluable", other.clone())),
    }
}

fn not_evaluable(term: &Term) -> PrologError {
    match term.key() {
        Some(key) => PrologError::type_error("evaluable", key.indicator()),
        None => PrologError::type_error("evaluable", term.clone()),
    }
}

fn unary(op: &str, x: Number, term: &Term) -> Result<Number, PrologError> {
    use Number::{Float, Int};
    Ok(match (op, x) {
        ("-", Int(i)) => Int(i.checked_neg().ok_or_else(overflow)?),
        ("-", Float(f)) => Float(-f),
        ("+", n) => n,
        ("abs", Int(i)) => Int(i.checked_abs().ok_or_else(overflow)?),
        ("abs", Float(f)) => Float(f.abs()),
        ("sign", Int(i)) => Int(i.signum()),
        ("sign", Float(f)) => Float(if f == 0.0 { 0.0 } else { f.signum() }),
        ("\\", n) => Int(!require_int(n)?),
        ("msb", n) => {
            let i = require_int(n)?;
            if i <= 0 {
                return Err(undefined());
            }
            Int(63 - i.leading_zeros() as i64)
        }
        ("float", n) => Float(n.as_f64()),
        ("integer", Int(i)) => Int(i),
        ("integer", Float(f)) => to_int(f.round())?,
        ("float_integer_part", n) => Float(n.as_f64().trunc()),
        ("float_fractional_part", n) => Float(n.as_f64().fract()),
        ("truncate" | "round" | "ceiling" | "floor", Int(i)) => Int(i),
        ("truncate", Float(f)) => to_int(f.trunc())?,
        ("round", Float(f)) => to_int(f.round())?,
        ("ceiling", Float(f)) => to_int(f.ceil())?,
        ("floor", Float(f)) => to_int(f.floor())?,
        ("sqrt", n) => {
            let f = n.as_f64();
            if f < 0.0 {
                return Err(undefined());
            }
            Float(f.sqrt())
        }
        ("exp", n) => checked_float(n.as_f64().exp())?,
        ("log", n) => {
            let f = n.as_f64();
            if f <= 0.0 {
                return Err(undefined());
            }
            Float(f.ln())
        }
        ("sin", n) => Float(n.as_f64().sin()),
        ("cos", n) => Float(n.as_f64().cos()),
        ("tan", n) => checked_float(n.as_f64().tan())?,
        ("asin", n) => checked_float(n.as_f64().asin())?,
        ("acos", n) => checked_float(n.as_f64().acos())?,
        ("atan", n) => Float(n.as_f64().atan()),
        _ => return Err(not_evaluable(term)),
    })
}

fn binary(op: &str, x: Number, y: Number, term: &Term) -> Result<Number, PrologError> {
    use Number::{Float, Int};
    Ok(match (op, x, y) {
        ("+", Int(a), Int(b)) => Int(a.checked_add(b).ok_or_else(overflow)?),
        ("-", Int(a), Int(b)) => Int(a.checked_sub(b).ok_or_else(overflow)?),
        ("*", Int(a), Int(b)) => Int(a.checked_mul(b).ok_or_else(overflow)?),
        ("+", a, b) => checked_float(a.as_f64() + b.as_f64())?,
        ("-", a, b) => checked_float(a.as_f64() - b.as_f64())?,
        ("*", a, b) => checked_float(a.as_f64() * b.as_f64())?,
        ("/", Int(_), Int(0)) => return Err(zero_divisor()),
        ("/", Int(a), Int(b)) => match a.checked_rem(b) {
            Some(0) => Int(a.checked_div(b).ok_or_else(overflow)?),
            _ => Float(a as f64 / b as f64),
        },
        ("/", a, b) => {
            if b.as_f64() == 0.0 {
                return Err(zero_divisor());
            }
            checked_float(a.as_f64() / b.as_f64())?
        }
        ("//" | "mod" | "rem" | "div", a, b) => {
            let (a, b) = (require_int(a)?, require_int(b)?);
            if b == 0 {
                return Err(zero_divisor());
            }
            let rem = a.checked_rem(b).ok_or_else(overflow)?;
            Int(match op {
                "//" => a.checked_div(b).ok_or_else(overflow)?,
                "rem" => rem,
                "mod" if rem != 0 && (rem < 0) != (b < 0) => rem + b,
                "mod" => rem,
                _ => {
                    let quotient = a.checked_div(b).ok_or_else(overflow)?;
                    if rem != 0 && (rem < 0) != (b < 0) {
                        quotient - 1
                    } else {
                        quotient
                    }
                }
            })
        }
        ("min", a, b) => {
            if b.cmp(a) == Ordering::Less {
                b
            } else {
                a
            }
        }
        ("max", a, b) => {
            if b.cmp(a) == Ordering::Greater {
                b
            } else {
                a
            }
        }
        ("**", Int(a), Int(b)) if b >= 0 => int_pow(a, b)?,
        ("^", Int(a), Int(b)) => int_pow(a, b)?,
        ("**" | "^", a, b) => {
            let (base, exp) = (a.as_f64(), b.as_f64());
            if base == 0.0 && exp < 0.0 {
                return Err(zero_divisor());
            }
            checked_float(base.powf(exp))?
        }
        ("atan2" | "atan", a, b) => Float(a.as_f64().atan2(b.as_f64())),
        ("copysign", a, b) => Float(a.as_f64().copysign(b.as_f64())),
        (">>", a, b) => Int(shift_right(require_int(a)?, require_int(b)?)?),
        ("<<", a, b) => Int(shift_left(require_int(a)?, require_int(b)?)?),
        ("/\\", a, b) => Int(require_int(a)? & require_int(b)?),
        ("\\/", a, b) => Int(require_int(a)? | require_int(b)?),
        ("xor", a, b) => Int(require_int(a)? ^ require_int(b)?),
        ("gcd", a, b) => Int(gcd(require_int(a)?, require_int(b)?)?),
        _ => return Err(not_evaluable(term)),
    })
}

fn numeric_order(a: &[Term], m: &Machine) -> Result<Ordering, PrologError> {
    let x = eval(&a[0], m)?;
    let y = eval(&a[1], m)?;
    Ok(x.cmp(y))
}

fn succ(a: &[Term], m: &mut Machine) -> Result<bool, PrologError> {
    match value(&a[0], m) {
        Term::Integer(x) if x < 0 => {
            Err(PrologError::type_error("not_less_than_zero", Term::Integer(x)))
        }
        Term::Integer(x) => {
            let y = x.checked_add(1).ok_or_else(overflow)?;
            Ok(m.unify(&a[1], &Term::Integer(y)))
        }
        Term::Var(_) => {
            let y = integer_arg(&a[1], m)?;
            if y < 0 {
                return Err(PrologError::type_error("not_less_than_zero", Term::Integer(y)));
            }
            Ok(y > 0 && m.unify(&a[0], &Term::Integer(y - 1)))
        }
        other => Err(PrologError::type_error("integer", other)),
    }
}

struct BetweenFactory;

impl PredicateFactory for BetweenFactory {
    fn predicate(&self, args: Args, m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        let low = integer_arg(&args[0], m)?;
        let high = match value(&args[1], m) {
            Term::Atom(a) if matches!(a.name(), "inf" | "infinite") => i64::MAX,
            _ => integer_arg(&args[1], m)?,
        };
        let fixed = match value(&args[2], m) {
            Term::Var(_) => None,
            Term::Integer(x) => Some(x),
            other => return Err(PrologError::type_error("integer", other)),
        };
        Ok(Box::new(Between {
            args,
            next: low,
            high,
            fixed,
            done: false,
        }))
    }
}

/// Enumerates `Low..=High` into the third argument, or checks it.
struct Between {
    args: Args,
    next: i64,
    high: i64,
    fixed: Option<i64>,
    done: bool,
}

impl Predicate for Between {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        m.backtrack_all(&self.args);
        if self.done {
            return Ok(false);
        }
        if let Some(x) = self.fixed {
            self.done = true;
            return Ok(self.next <= x && x <= self.high);
        }
        if self.next > self.high {
            self.done = true;
            return Ok(false);
        }
        let current = self.next;
        match current.checked_add(1) {
            Some(next) => self.next = next,
            None => self.done = true,
        }
        Ok(m.unify(&self.args[2], &Term::Integer(current)))
    }

    fn could_reevaluation_succeed(&self) -> bool {
        !self.done && self.fixed.is_none() && self.next <= self.high
    }
}
