//! Control constructs: conjunction, disjunction, if-then(-else), negation,
//! cut and the `call/N` family.
//!
//! Cut travels as [`Signal::Cut`] returned while backtracking into a `!`.
//! Conjunction, disjunction and the branches of if-then-else pass it on;
//! clause boundaries, `call/N`, `once/1`, `ignore/1`, negation, if-then
//! conditions and aggregation goals stop it.

mod call;
mod conjunction;
mod disjunction;
mod if_then;
mod negation;

pub use call::{CallFactory, CaretFactory, IgnoreFactory, OnceFactory};
pub use conjunction::ConjunctionFactory;
pub use disjunction::DisjunctionFactory;
pub use if_then::IfThenElseFactory;
pub use negation::NegationFactory;

use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Det, Outcome, Predicate, PredicateFactory, Signal, Subgoal};
use crate::term::{Args, PredicateKey, Term};
use std::sync::Arc;

pub fn register(kb: &KnowledgeBase) {
    kb.register(PredicateKey::of(",", 2), Arc::new(ConjunctionFactory::default()));
    kb.register(PredicateKey::of(";", 2), Arc::new(DisjunctionFactory::default()));
    kb.register(PredicateKey::of("->", 2), Arc::new(IfThenElseFactory::if_then()));
    kb.register(PredicateKey::of("\\+", 1), Arc::new(NegationFactory::default()));
    kb.register(PredicateKey::of("not", 1), Arc::new(NegationFactory::default()));
    for arity in 1..=8 {
        kb.register(PredicateKey::of("call", arity), Arc::new(CallFactory::new(arity as usize - 1)));
    }
    kb.register(PredicateKey::of("once", 1), Arc::new(OnceFactory::default()));
    kb.register(PredicateKey::of("ignore", 1), Arc::new(IgnoreFactory::default()));
    kb.register(PredicateKey::of("^", 2), Arc::new(CaretFactory));

    kb.register(PredicateKey::of("true", 0), Arc::new(Det::new(|_, _| Ok(true))));
    kb.register(PredicateKey::of("fail", 0), Arc::new(Det::new(|_, _| Ok(false))));
    kb.register(PredicateKey::of("false", 0), Arc::new(Det::new(|_, _| Ok(false))));
    kb.register(PredicateKey::of("!", 0), Arc::new(CutFactory));
    kb.register(PredicateKey::of("repeat", 0), Arc::new(RepeatFactory));
}

/// A goal run behind a cut barrier.
///
/// Solutions come one per [`Opaque::next`]; a cut inside the goal ends
/// them, and is reported as plain failure with the goal's bindings undone.
pub struct Opaque {
    goal: Term,
    factory: Option<Arc<dyn PredicateFactory>>,
    inner: Option<Subgoal>,
    done: bool,
}

impl Opaque {
    /// `goal` must be resolved, as evaluator arguments are.
    pub fn new(goal: Term, factory: Option<Arc<dyn PredicateFactory>>) -> Self {
        Self {
            goal,
            factory,
            inner: None,
            done: false,
        }
    }

    pub fn goal(&self) -> &Term {
        &self.goal
    }

    pub fn next(&mut self, m: &mut Machine) -> Outcome {
        if self.done {
            return Ok(false);
        }
        let outcome = match self.inner.as_mut() {
            Some(inner) => inner.retry(m),
            None => {
                let mut inner = m.solve(&self.goal, self.factory.as_ref())?;
                let outcome = inner.evaluate(m);
                self.inner = Some(inner);
                outcome
            }
        };
        match outcome {
            Ok(true) => Ok(true),
            Ok(false) => {
                self.finish();
                Ok(false)
            }
            Err(Signal::Cut) => {
                self.undo(m);
                self.finish();
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn could_reevaluation_succeed(&self) -> bool {
        !self.done
            && self
                .inner
                .as_ref()
                .map_or(true, Subgoal::could_reevaluation_succeed)
    }

    /// Release every binding the goal made.
    pub fn undo(&self, m: &mut Machine) {
        m.backtrack(&self.goal);
    }

    fn finish(&mut self) {
        self.done = true;
        self.inner = None;
    }
}

struct CutFactory;

impl PredicateFactory for CutFactory {
    fn predicate(&self, _args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Cut { passed: false }))
    }
}

/// Succeeds once; backtracking into it raises the cut.
struct Cut {
    passed: bool,
}

impl Predicate for Cut {
    fn evaluate(&mut self, _m: &mut Machine) -> Outcome {
        if self.passed {
            return Err(Signal::Cut);
        }
        self.passed = true;
        Ok(true)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        // Not a solution, but the caller must come back to receive the cut.
        true
    }
}

struct RepeatFactory;

impl PredicateFactory for RepeatFactory {
    fn predicate(&self, _args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Repeat))
    }
}

struct Repeat;

impl Predicate for Repeat {
    fn evaluate(&mut self, _m: &mut Machine) -> Outcome {
        Ok(true)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "../tests/control.rs"]
mod tests;
