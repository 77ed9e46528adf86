//! The goal evaluator contract.
//!
//! A [`PredicateFactory`] turns resolved argument terms into a single-use
//! [`Predicate`]. The predicate is a small state machine: each call to
//! `evaluate` produces the first or next solution, and
//! `could_reevaluation_succeed` says whether another call is worth making.

use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::term::{Args, Term};
use std::sync::Arc;

/// Non-boolean ways out of an evaluator.
#[derive(Debug)]
pub enum Signal {
    /// Backtracking reached a `!`: every choice point back to the nearest
    /// cut barrier is discarded.
    Cut,
    Error(PrologError),
}

impl From<PrologError> for Signal {
    fn from(e: PrologError) -> Self {
        Signal::Error(e)
    }
}

/// `Ok(true)`: a solution, bindings left in place.
/// `Ok(false)`: no (more) solutions, and no bindings left behind.
pub type Outcome = Result<bool, Signal>;

pub trait Predicate {
    /// Find the first solution, or the next one on later calls.
    ///
    /// A retry starts by undoing the previous solution's bindings.
    fn evaluate(&mut self, m: &mut Machine) -> Outcome;

    /// `false` guarantees another `evaluate` would fail.
    fn could_reevaluation_succeed(&self) -> bool;
}

pub trait PredicateFactory: Send + Sync {
    /// Create an evaluator for one call.
    ///
    /// `args` are resolved: every variable in them is unbound right now, so
    /// backtracking them later undoes exactly the bindings made by this call.
    fn predicate(&self, args: Args, m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError>;

    /// Whether an evaluator from this factory can ever succeed twice.
    fn is_retryable(&self) -> bool {
        true
    }

    /// Specialize for a known goal shape before execution.
    ///
    /// `args` are the goal's arguments as written, variables unbound.
    /// `None` keeps this factory.
    fn preprocess(&self, _args: &[Term], _kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        None
    }
}

/// Free stack left before evaluating a sub-goal; below it the evaluation
/// continues on a fresh segment of `STACK_SEGMENT` bytes.
const RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// A running sub-goal together with the resolved goal term it was created
/// from, which is what gets backtracked to undo it.
///
/// Sub-goals nest as deep as the proof, so evaluating and dropping them
/// grows the stack on demand instead of overflowing the caller's thread.
pub struct Subgoal {
    goal: Term,
    pred: Box<dyn Predicate>,
}

impl Subgoal {
    pub fn new(goal: Term, pred: Box<dyn Predicate>) -> Self {
        Self { goal, pred }
    }

    pub fn goal(&self) -> &Term {
        &self.goal
    }

    pub fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || self.pred.evaluate(m))
    }

    pub fn could_reevaluation_succeed(&self) -> bool {
        self.pred.could_reevaluation_succeed()
    }

    /// Ask for another solution, or undo the last one if none can follow.
    pub fn retry(&mut self, m: &mut Machine) -> Outcome {
        if self.pred.could_reevaluation_succeed() {
            self.evaluate(m)
        } else {
            self.undo(m);
            Ok(false)
        }
    }

    /// Release every binding this sub-goal made.
    pub fn undo(&self, m: &mut Machine) {
        m.backtrack(&self.goal);
    }
}

impl Drop for Subgoal {
    fn drop(&mut self) {
        let pred = std::mem::replace(&mut self.pred, Box::new(Spent));
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, move || drop(pred));
    }
}

/// Stands in for an evaluator that has been dropped.
struct Spent;

impl Predicate for Spent {
    fn evaluate(&mut self, _m: &mut Machine) -> Outcome {
        Ok(false)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        false
    }
}

/// Body of a deterministic built-in: `Ok(true)` succeeds once.
pub type DetFn = fn(&[Term], &mut Machine) -> Result<bool, PrologError>;

/// Factory for built-ins that succeed at most once.
pub struct Det {
    run: DetFn,
}

impl Det {
    pub fn new(run: DetFn) -> Self {
        Self { run }
    }
}

impl PredicateFactory for Det {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(DetPredicate {
            run: self.run,
            args,
            done: false,
        }))
    }

    fn is_retryable(&self) -> bool {
        false
    }
}

struct DetPredicate {
    run: DetFn,
    args: Args,
    done: bool,
}

impl Predicate for DetPredicate {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        if self.done {
            m.backtrack_all(&self.args);
            return Ok(false);
        }
        self.done = true;
        let ok = (self.run)(&self.args, m)?;
        if !ok {
            m.backtrack_all(&self.args);
        }
        Ok(ok)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        !self.done
    }
}

/// Evaluator with a fixed answer: succeeds `true` once or fails.
pub struct Constant {
    succeeds: bool,
    done: bool,
}

impl Constant {
    pub fn boxed(succeeds: bool) -> Box<dyn Predicate> {
        Box::new(Self {
            succeeds,
            done: false,
        })
    }
}

impl Predicate for Constant {
    fn evaluate(&mut self, _m: &mut Machine) -> Outcome {
        let first = !self.done;
        self.done = true;
        Ok(first && self.succeeds)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        !self.done && self.succeeds
    }
}
