//! Binding arena for variables.
//!
//! Every live variable is an index into `slots`; binding writes the slot and
//! backtracking clears it. There is no trail: whoever made a binding undoes
//! it by backtracking the term that contains the variable.

use crate::term::{Args, Cons, Term, VarId};
use hashbrown::{HashMap, HashSet};
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

/// Bound variables whose values are being expanded by one rebuild.
type Expanding = HashSet<VarId, BuildHasherDefault<FxHasher>>;

/// Map from original variables to their copies, shared across one copy
/// operation so repeated variables stay repeated.
pub type VarMap = HashMap<VarId, Term>;

#[derive(Debug, Default)]
pub struct Bindings {
    slots: Vec<Option<Term>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Allocate one unbound variable.
    pub fn fresh(&mut self) -> Term {
        let id = VarId(self.slots.len() as u32);
        self.slots.push(None);
        Term::Var(id)
    }

    /// Allocate `count` consecutive unbound variables, returning the first index.
    pub fn fresh_block(&mut self, count: u32) -> u32 {
        let base = self.slots.len() as u32;
        self.slots.resize(self.slots.len() + count as usize, None);
        base
    }

    /// Number of slots currently allocated.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Release every slot from `mark` on.
    ///
    /// Only sound once nothing alive refers to those slots: every binding
    /// made since `mark` was taken has been undone and the evaluators that
    /// held their terms are gone.
    pub fn truncate(&mut self, mark: usize) {
        self.slots.truncate(mark);
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The value directly stored in a variable's slot.
    pub fn value(&self, var: VarId) -> Option<&Term> {
        self.slots.get(var.index()).and_then(Option::as_ref)
    }

    pub fn is_bound(&self, var: VarId) -> bool {
        self.value(var).is_some()
    }

    pub fn bind(&mut self, var: VarId, value: Term) {
        let idx = var.index();
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        self.slots[idx] = Some(value);
    }

    pub fn unbind(&mut self, var: VarId) {
        if let Some(slot) = self.slots.get_mut(var.index()) {
            *slot = None;
        }
    }

    /// Follow bound variables to the current value.
    ///
    /// Unification never binds a variable to itself, so chains end.
    pub fn deref<'a>(&'a self, term: &'a Term) -> &'a Term {
        let mut current = term;
        while let Term::Var(var) = current {
            match self.value(*var) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Undo every binding on the variables occurring in `term`.
    ///
    /// Bound values are not followed. Immutable subterms are skipped and list
    /// spines are walked with an explicit stack.
    pub fn backtrack(&mut self, term: &Term) {
        let mut stack: SmallVec<[&Term; 16]> = SmallVec::new();
        stack.push(term);
        while let Some(t) = stack.pop() {
            match t {
                Term::Var(var) => self.unbind(*var),
                Term::Struct(s) if !s.is_immutable() => stack.extend(s.args().iter()),
                Term::List(c) if !c.is_immutable() => {
                    stack.push(c.tail());
                    stack.push(c.head());
                }
                _ => {}
            }
        }
    }

    pub fn backtrack_all(&mut self, terms: &[Term]) {
        for term in terms {
            self.backtrack(term);
        }
    }

    /// Replace every bound variable in `term` by its value.
    ///
    /// The result contains only variables that are unbound right now, so
    /// backtracking it later touches exactly the bindings made afterwards.
    /// Unchanged subterms are shared with the input.
    pub fn resolve(&self, term: &Term) -> Term {
        self.rebuild(term, true, &mut |_, _| None, &mut Expanding::default())
            .unwrap_or_else(|| term.clone())
    }

    pub fn resolve_args(&self, args: &[Term]) -> Args {
        args.iter().map(|arg| self.resolve(arg)).collect()
    }

    /// Copy `term` with every unbound variable replaced by a fresh one.
    ///
    /// Variables already present in `map` reuse their earlier copy.
    pub fn copy(&mut self, term: &Term, map: &mut VarMap) -> Term {
        let start = self.slots.len() as u32;
        let mut next = start;
        let copied = self
            .rebuild(
                term,
                true,
                &mut |var, _| {
                    Some(
                        map.entry(var)
                            .or_insert_with(|| {
                                let fresh = Term::Var(VarId(next));
                                next += 1;
                                fresh
                            })
                            .clone(),
                    )
                },
                &mut Expanding::default(),
            )
            .unwrap_or_else(|| term.clone());
        self.fresh_block(next - start);
        copied
    }

    /// Instantiate a clause-local template whose variables are `0..n`,
    /// offsetting them by `base` and substituting any binding those
    /// slots already hold.
    pub fn instantiate(&self, template: &Term, base: u32) -> Term {
        self.rebuild(
            template,
            false,
            &mut |var, this| Some(this.resolve(&Term::Var(VarId(base + var.0)))),
            &mut Expanding::default(),
        )
        .unwrap_or_else(|| template.clone())
    }

    /// Rename the unbound variables of `term` to `0..n` in order of first
    /// occurrence, returning the renamed term and `n`.
    ///
    /// Two terms are variants of each other iff their canonical forms are
    /// syntactically equal.
    pub fn canonical(&self, term: &Term) -> (Term, u32) {
        let mut map: HashMap<VarId, u32> = HashMap::new();
        let renamed = self
            .rebuild(
                term,
                true,
                &mut |var, _| {
                    let next = map.len() as u32;
                    Some(Term::var(*map.entry(var).or_insert(next)))
                },
                &mut Expanding::default(),
            )
            .unwrap_or_else(|| term.clone());
        (renamed, map.len() as u32)
    }

    /// Distinct unbound variables of `term` in order of first occurrence.
    pub fn variables(&self, term: &Term, out: &mut Vec<VarId>) {
        let mut stack: SmallVec<[&Term; 16]> = SmallVec::new();
        stack.push(term);
        while let Some(t) = stack.pop() {
            match self.deref(t) {
                Term::Var(var) => {
                    if !out.contains(var) {
                        out.push(*var);
                    }
                }
                Term::Struct(s) if !s.is_immutable() => stack.extend(s.args().iter().rev()),
                Term::List(c) if !c.is_immutable() => {
                    stack.push(c.tail());
                    stack.push(c.head());
                }
                _ => {}
            }
        }
    }

    pub fn is_ground(&self, term: &Term) -> bool {
        let mut vars = Vec::new();
        self.variables(term, &mut vars);
        vars.is_empty()
    }

    /// Walk a list, returning its items and the dereferenced tail.
    ///
    /// A proper list ends in [`Term::EmptyList`]; a partial list ends in a
    /// variable; anything else ends in the offending term.
    pub fn list_items(&self, term: &Term) -> (Vec<Term>, Term) {
        let mut items = Vec::new();
        let mut current = self.deref(term);
        while let Term::List(cell) = current {
            items.push(cell.head().clone());
            current = self.deref(cell.tail());
        }
        (items, current.clone())
    }

    /// Rebuild `term` bottom-up, asking `on_var` what each variable becomes.
    ///
    /// With `follow` set, bound variables are replaced by their values and
    /// `on_var` only sees unbound ones; without it every variable goes to
    /// `on_var` untouched (clause-local templates). Returns `None` when
    /// nothing changed. List spines are processed iteratively.
    ///
    /// A bound variable met again inside its own value is left in place,
    /// so cyclic bindings made without the occurs check still rebuild to a
    /// finite term.
    fn rebuild<F>(
        &self,
        term: &Term,
        follow: bool,
        on_var: &mut F,
        expanding: &mut Expanding,
    ) -> Option<Term>
    where
        F: FnMut(VarId, &Self) -> Option<Term>,
    {
        match term {
            Term::Var(var) => match self.value(*var) {
                Some(_) if follow && expanding.contains(var) => None,
                Some(bound) if follow => {
                    expanding.insert(*var);
                    let target = self.deref(bound);
                    let rebuilt = self
                        .rebuild(target, follow, on_var, expanding)
                        .unwrap_or_else(|| target.clone());
                    expanding.remove(var);
                    Some(rebuilt)
                }
                _ => on_var(*var, self),
            },
            Term::Struct(s) if !s.is_immutable() => {
                let mut changed: Option<Args> = None;
                for (i, arg) in s.args().iter().enumerate() {
                    match (self.rebuild(arg, follow, on_var, expanding), changed.as_mut()) {
                        (Some(new), Some(args)) => args.push(new),
                        (Some(new), None) => {
                            let mut args: Args = s.args()[..i].iter().cloned().collect();
                            args.push(new);
                            changed = Some(args);
                        }
                        (None, Some(args)) => args.push(arg.clone()),
                        (None, None) => {}
                    }
                }
                changed.map(|args| Term::compound(s.name(), args))
            }
            Term::List(c) if !c.is_immutable() => self.rebuild_list(c, follow, on_var, expanding),
            _ => None,
        }
    }

    fn rebuild_list<F>(
        &self,
        first: &Arc<Cons>,
        follow: bool,
        on_var: &mut F,
        expanding: &mut Expanding,
    ) -> Option<Term>
    where
        F: FnMut(VarId, &Self) -> Option<Term>,
    {
        let mut heads: Vec<Term> = Vec::new();
        let mut spine: SmallVec<[VarId; 8]> = SmallVec::new();
        let mut changed = false;
        let mut current = Term::List(Arc::clone(first));
        loop {
            let next = match &current {
                Term::List(cell) if !cell.is_immutable() => {
                    match self.rebuild(cell.head(), follow, on_var, expanding) {
                        Some(head) => {
                            changed = true;
                            heads.push(head);
                        }
                        None => heads.push(cell.head().clone()),
                    }
                    cell.tail().clone()
                }
                Term::Var(var) if follow && self.is_bound(*var) && !expanding.contains(var) => {
                    changed = true;
                    expanding.insert(*var);
                    spine.push(*var);
                    match self.value(*var) {
                        Some(value) => value.clone(),
                        None => break,
                    }
                }
                _ => break,
            };
            current = next;
        }
        let tail = match self.rebuild(&current, follow, on_var, expanding) {
            Some(tail) => {
                changed = true;
                tail
            }
            None => current,
        };
        for var in &spine {
            expanding.remove(var);
        }
        changed.then(|| Term::list_with_tail(heads, tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{app, atom, setup};
    use crate::unify::unify;

    #[test]
    fn resolve_stops_at_cyclic_bindings() {
        let mut b = setup();
        let x = b.fresh();
        let fx = app("f", vec![x.clone()]);
        assert!(unify(&x, &fx, &mut b));
        assert_eq!(b.resolve(&x), fx);
        assert_eq!(
            b.resolve(&app("g", vec![x.clone(), x.clone()])),
            app("g", vec![fx.clone(), fx.clone()])
        );

        let l = b.fresh();
        let looped = Term::list_with_tail(vec![atom("a")], l.clone());
        assert!(unify(&l, &looped, &mut b));
        assert_eq!(b.resolve(&l), looped);
    }

    #[test]
    fn truncate_releases_only_later_slots() {
        let mut b = setup();
        let kept = b.fresh();
        let mark = b.len();
        let base = b.fresh_block(5);
        assert!(unify(&Term::var(base), &atom("a"), &mut b));
        b.backtrack(&Term::var(base));
        b.truncate(mark);
        assert_eq!(b.len(), 1);
        assert_eq!(b.fresh(), Term::var(1));
        assert!(!b.is_bound(VarId(0)));
        assert_eq!(b.deref(&kept), &kept);
    }
}
