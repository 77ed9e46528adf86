//! `findall/3,4`, `bagof/3` and `setof/3`.
//!
//! Each drives its goal to exhaustion behind a cut barrier and snapshots
//! the template per solution with [`Bindings::canonical`](crate::bindings::Bindings::canonical),
//! so collected answers never share variables with later solutions.

use crate::compare::sort_terms;
use crate::control::Opaque;
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Outcome, Predicate, PredicateFactory, Signal};
use crate::preprocess::prepare;
use crate::symbol::known;
use crate::term::{Args, PredicateKey, Term, VarId};
use hashbrown::HashMap;
use std::sync::Arc;

pub fn register(kb: &KnowledgeBase) {
    kb.register(PredicateKey::of("findall", 3), Arc::new(FindallFactory::default()));
    kb.register(
        PredicateKey::of("findall", 4),
        Arc::new(FindallFactory {
            with_tail: true,
            goal: None,
        }),
    );
    kb.register(PredicateKey::of("bagof", 3), Arc::new(BagofFactory::new(false)));
    kb.register(PredicateKey::of("setof", 3), Arc::new(BagofFactory::new(true)));
}

/// Copy `template` once per solution of `goal`, in discovery order.
///
/// Snapshots are held as canonical templates, outside the binding arena,
/// while the goal runs: its calls release their variables as they fail.
/// They get fresh variables once the goal is exhausted and all of its
/// bindings are undone.
fn collect(m: &mut Machine, template: &Term, goal: &mut Opaque) -> Result<Vec<Term>, Signal> {
    let mut snapshots = Vec::new();
    while goal.next(m)? {
        snapshots.push(m.bindings.canonical(template));
    }
    Ok(snapshots
        .into_iter()
        .map(|(snapshot, var_count)| {
            let base = m.bindings.fresh_block(var_count);
            m.bindings.instantiate(&snapshot, base)
        })
        .collect())
}

#[derive(Default)]
struct FindallFactory {
    with_tail: bool,
    goal: Option<Arc<dyn PredicateFactory>>,
}

impl PredicateFactory for FindallFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Findall {
            goal: Opaque::new(args[1].clone(), self.goal.clone()),
            args,
            done: false,
        }))
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        Some(Arc::new(FindallFactory {
            with_tail: self.with_tail,
            goal: prepare(&args[1], kb),
        }))
    }
}

struct Findall {
    args: Args,
    goal: Opaque,
    done: bool,
}

impl Predicate for Findall {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        if self.done {
            m.backtrack_all(&self.args);
            return Ok(false);
        }
        self.done = true;
        let items = collect(m, &self.args[0], &mut self.goal)?;
        let tail = self.args.get(3).cloned().unwrap_or(Term::EmptyList);
        let list = Term::list_with_tail(items, tail);
        if m.unify(&self.args[2], &list) {
            return Ok(true);
        }
        m.backtrack_all(&self.args);
        Ok(false)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        !self.done
    }
}

/// Peel `V^Goal` layers, returning the inner goal.
fn strip_existential<'a>(goal: &'a Term, m: &'a Machine, bound: &mut Vec<VarId>) -> &'a Term {
    let caret = known().caret;
    let mut goal = m.bindings.deref(goal);
    while goal.has_functor(caret, 2) {
        m.bindings.variables(&goal.args()[0], bound);
        goal = m.bindings.deref(&goal.args()[1]);
    }
    goal
}

struct BagofFactory {
    sorted: bool,
    goal: Option<Arc<dyn PredicateFactory>>,
}

impl BagofFactory {
    fn new(sorted: bool) -> Self {
        Self { sorted, goal: None }
    }
}

impl PredicateFactory for BagofFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Bagof {
            args,
            sorted: self.sorted,
            factory: self.goal.clone(),
            witness: Term::from_atom(known().witness),
            groups: None,
            next: 0,
        }))
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        let caret = known().caret;
        let mut goal = &args[1];
        while goal.has_functor(caret, 2) {
            goal = &goal.args()[1];
        }
        Some(Arc::new(BagofFactory {
            sorted: self.sorted,
            goal: prepare(goal, kb),
        }))
    }
}

/// One group of solutions sharing a witness, up to variable renaming.
struct Group {
    witness: Term,
    items: Vec<Term>,
}

/// `bagof/3` and `setof/3`: one solution per distinct binding of the free
/// variables of the goal, in the order those bindings were first found.
struct Bagof {
    args: Args,
    sorted: bool,
    factory: Option<Arc<dyn PredicateFactory>>,
    /// `'$witness'(W1, ..., Wn)` over the free variables of the goal.
    witness: Term,
    groups: Option<Vec<Group>>,
    next: usize,
}

impl Bagof {
    fn collect_groups(&mut self, m: &mut Machine) -> Result<Vec<Group>, Signal> {
        let template = self.args[0].clone();
        let mut bound = Vec::new();
        m.bindings.variables(&template, &mut bound);
        let goal = strip_existential(&self.args[1], m, &mut bound).clone();

        let mut free = Vec::new();
        m.bindings.variables(&goal, &mut free);
        free.retain(|var| !bound.contains(var));
        let free: Args = free.into_iter().map(Term::Var).collect();
        self.witness = Term::compound(known().witness, free);

        let pair = Term::compound(known().minus, [self.witness.clone(), template]);
        let mut runner = Opaque::new(goal, self.factory.clone());
        let solutions = collect(m, &pair, &mut runner)?;

        let mut groups: Vec<Group> = Vec::new();
        let mut by_variant: HashMap<Term, usize> = HashMap::new();
        for solution in solutions {
            let (witness, item) = match solution.args() {
                [w, t] => (w.clone(), t.clone()),
                _ => continue,
            };
            let (variant, _) = m.bindings.canonical(&witness);
            match by_variant.get(&variant) {
                Some(&i) => {
                    // Variants unify; this makes the group's items share
                    // the first witness's variables.
                    m.unify(&groups[i].witness, &witness);
                    groups[i].items.push(item);
                }
                None => {
                    by_variant.insert(variant, groups.len());
                    groups.push(Group {
                        witness,
                        items: vec![item],
                    });
                }
            }
        }

        if self.sorted {
            for group in &mut groups {
                sort_terms(&mut group.items, &m.bindings, true);
            }
        }
        Ok(groups)
    }
}

impl Predicate for Bagof {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        let groups = match self.groups.take() {
            Some(groups) => {
                m.backtrack_all(&self.args);
                groups
            }
            None => self.collect_groups(m)?,
        };

        let mut found = false;
        while self.next < groups.len() {
            let group = &groups[self.next];
            self.next += 1;
            let list = Term::list(group.items.iter().cloned());
            if m.unify(&self.witness, &group.witness) && m.unify(&self.args[2], &list) {
                found = true;
                break;
            }
            m.backtrack_all(&self.args);
        }
        self.groups = Some(groups);
        Ok(found)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        match &self.groups {
            None => true,
            Some(groups) => self.next < groups.len(),
        }
    }
}

#[cfg(test)]
#[path = "tests/aggregate.rs"]
mod tests;
