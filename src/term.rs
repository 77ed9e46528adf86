use crate::symbol::{known, Atom};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Index of a variable's binding slot.
///
/// Inside a stored clause the index is clause-local (0..var_count); once a
/// clause or query is instantiated it indexes the machine's binding arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Argument vector for compound terms and goal evaluators.
pub type Args = SmallVec<[Term; 4]>;

/// A Prolog term.
///
/// Compound nodes are reference counted and never mutated after
/// construction; all mutability lives in the binding slots that
/// [`Term::Var`] points at.
#[derive(Clone)]
pub enum Term {
    Atom(Atom),
    Integer(i64),
    Float(f64),
    Var(VarId),
    Struct(Arc<Structure>),
    /// A `'.'/2` cons cell.
    List(Arc<Cons>),
    EmptyList,
}

/// A compound term of arity >= 1 other than a list cell.
pub struct Structure {
    name: Atom,
    args: Args,
    immutable: bool,
}

impl Structure {
    pub fn name(&self) -> Atom {
        self.name
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }
}

/// A list cell: `[head | tail]`.
pub struct Cons {
    cells: [Term; 2],
    immutable: bool,
}

impl Cons {
    pub fn head(&self) -> &Term {
        &self.cells[0]
    }

    pub fn tail(&self) -> &Term {
        &self.cells[1]
    }

    pub fn cells(&self) -> &[Term] {
        &self.cells
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }
}

impl Drop for Cons {
    // Unlink uniquely owned spines iteratively so dropping a long list
    // does not recurse once per cell.
    fn drop(&mut self) {
        let mut tail = std::mem::replace(&mut self.cells[1], Term::EmptyList);
        while let Term::List(cell) = tail {
            match Arc::try_unwrap(cell) {
                Ok(mut cons) => tail = std::mem::replace(&mut cons.cells[1], Term::EmptyList),
                Err(_) => break,
            }
        }
    }
}

impl Term {
    /// An atom. `[]` is normalised to [`Term::EmptyList`].
    pub fn atom(name: &str) -> Term {
        Term::from_atom(Atom::new(name))
    }

    pub fn from_atom(atom: Atom) -> Term {
        if atom == known().nil {
            Term::EmptyList
        } else {
            Term::Atom(atom)
        }
    }

    pub fn integer(value: i64) -> Term {
        Term::Integer(value)
    }

    pub fn float(value: f64) -> Term {
        Term::Float(value)
    }

    pub fn var(index: u32) -> Term {
        Term::Var(VarId(index))
    }

    /// Build `name(args...)`.
    ///
    /// Zero arguments yield an atom and `'.'/2` yields a list cell, so every
    /// construction path produces the canonical representation.
    pub fn compound(name: Atom, args: impl IntoIterator<Item = Term>) -> Term {
        let mut args: Args = args.into_iter().collect();
        if args.is_empty() {
            return Term::from_atom(name);
        }
        if name == known().dot && args.len() == 2 {
            if let (Some(tail), Some(head)) = (args.pop(), args.pop()) {
                return Term::cons(head, tail);
            }
        }
        let immutable = args.iter().all(Term::is_immutable);
        Term::Struct(Arc::new(Structure {
            name,
            args,
            immutable,
        }))
    }

    /// Convenience wrapper over [`Term::compound`] taking a name string.
    pub fn structure(name: &str, args: impl IntoIterator<Item = Term>) -> Term {
        Term::compound(Atom::new(name), args)
    }

    pub fn cons(head: Term, tail: Term) -> Term {
        let immutable = head.is_immutable() && tail.is_immutable();
        Term::List(Arc::new(Cons {
            cells: [head, tail],
            immutable,
        }))
    }

    /// A proper list of the given items.
    pub fn list<I>(items: I) -> Term
    where
        I: IntoIterator<Item = Term>,
        I::IntoIter: DoubleEndedIterator,
    {
        Term::list_with_tail(items, Term::EmptyList)
    }

    /// A list of the given items ending in `tail`.
    pub fn list_with_tail<I>(items: I, tail: Term) -> Term
    where
        I: IntoIterator<Item = Term>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Term::cons(item, acc))
    }

    /// True iff the term can never change during execution.
    ///
    /// Cached for compound terms at construction time.
    pub fn is_immutable(&self) -> bool {
        match self {
            Term::Atom(_) | Term::Integer(_) | Term::Float(_) | Term::EmptyList => true,
            Term::Var(_) => false,
            Term::Struct(s) => s.immutable,
            Term::List(c) => c.immutable,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Term::Atom(_) | Term::Struct(_) | Term::List(_) | Term::EmptyList
        )
    }

    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            Term::Atom(_) | Term::Integer(_) | Term::Float(_) | Term::EmptyList
        )
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Term::Struct(_) | Term::List(_))
    }

    /// The functor name of a callable term.
    pub fn name(&self) -> Option<Atom> {
        match self {
            Term::Atom(a) => Some(*a),
            Term::Struct(s) => Some(s.name),
            Term::List(_) => Some(known().dot),
            Term::EmptyList => Some(known().nil),
            _ => None,
        }
    }

    /// Arguments of a compound term; empty for everything else.
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Struct(s) => &s.args,
            Term::List(c) => &c.cells,
            _ => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.args().len()
    }

    /// Predicate key of a callable term.
    pub fn key(&self) -> Option<PredicateKey> {
        self.name()
            .map(|name| PredicateKey::new(name, self.arity() as u32))
    }

    /// True if the term is `name/arity` (after the caller has dereferenced it).
    pub fn has_functor(&self, name: Atom, arity: usize) -> bool {
        self.name() == Some(name) && self.arity() == arity
    }

    /// Human-readable category used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Term::Atom(_) => "atom",
            Term::Integer(_) => "integer",
            Term::Float(_) => "float",
            Term::Var(_) => "variable",
            Term::Struct(_) => "structure",
            Term::List(_) => "list",
            Term::EmptyList => "empty list",
        }
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Integer(value)
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Float(value)
    }
}

impl From<Atom> for Term {
    fn from(value: Atom) -> Self {
        Term::from_atom(value)
    }
}

/// Syntactic equality: variables compare by slot index and bound variables
/// are not followed. Resolve terms first for value equality.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: SmallVec<[(&Term, &Term); 16]> = SmallVec::new();
        pending.push((self, other));
        while let Some((a, b)) = pending.pop() {
            let same = match (a, b) {
                (Term::Atom(x), Term::Atom(y)) => x == y,
                (Term::Integer(x), Term::Integer(y)) => x == y,
                (Term::Float(x), Term::Float(y)) => x.to_bits() == y.to_bits(),
                (Term::Var(x), Term::Var(y)) => x == y,
                (Term::EmptyList, Term::EmptyList) => true,
                (Term::Struct(x), Term::Struct(y)) => {
                    if Arc::ptr_eq(x, y) {
                        true
                    } else if x.name != y.name || x.args.len() != y.args.len() {
                        false
                    } else {
                        pending.extend(x.args.iter().zip(y.args.iter()));
                        true
                    }
                }
                (Term::List(x), Term::List(y)) => {
                    if !Arc::ptr_eq(x, y) {
                        pending.push((x.tail(), y.tail()));
                        pending.push((x.head(), y.head()));
                    }
                    true
                }
                _ => false,
            };
            if !same {
                return false;
            }
        }
        true
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut pending: SmallVec<[&Term; 16]> = SmallVec::new();
        pending.push(self);
        while let Some(term) = pending.pop() {
            std::mem::discriminant(term).hash(state);
            match term {
                Term::Atom(a) => a.hash(state),
                Term::Integer(i) => i.hash(state),
                Term::Float(f) => f.to_bits().hash(state),
                Term::Var(v) => v.hash(state),
                Term::EmptyList => {}
                Term::Struct(s) => {
                    s.name.hash(state);
                    s.args.len().hash(state);
                    pending.extend(s.args.iter().rev());
                }
                Term::List(c) => {
                    pending.push(c.tail());
                    pending.push(c.head());
                }
            }
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A predicate's name and arity, e.g. `append/3`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredicateKey {
    pub name: Atom,
    pub arity: u32,
}

impl PredicateKey {
    pub fn new(name: Atom, arity: u32) -> Self {
        Self { name, arity }
    }

    pub fn of(name: &str, arity: u32) -> Self {
        Self::new(Atom::new(name), arity)
    }

    /// The `Name/Arity` indicator term.
    pub fn indicator(&self) -> Term {
        Term::compound(
            known().slash,
            [Term::from_atom(self.name), Term::Integer(self.arity as i64)],
        )
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

impl fmt::Debug for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
