use super::Opaque;
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Outcome, Predicate, PredicateFactory, Subgoal};
use crate::preprocess::prepare;
use crate::term::{Args, Term};
use std::sync::Arc;

type Prepared = Option<Arc<dyn PredicateFactory>>;

/// `->/2` on its own, or the if-then-else form of `;/2` once prepared.
pub struct IfThenElseFactory {
    with_else: bool,
    factories: [Prepared; 3],
}

impl IfThenElseFactory {
    pub fn if_then() -> Self {
        Self {
            with_else: false,
            factories: [None, None, None],
        }
    }

    pub(super) fn prepared(cond: Prepared, then: Prepared, otherwise: Prepared) -> Self {
        Self {
            with_else: true,
            factories: [cond, then, otherwise],
        }
    }
}

impl PredicateFactory for IfThenElseFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        let (cond, then, otherwise) = if self.with_else {
            let branches = args[0].args();
            (branches[0].clone(), branches[1].clone(), Some(args[1].clone()))
        } else {
            (args[0].clone(), args[1].clone(), None)
        };
        Ok(Box::new(IfThenElse::new(cond, then, otherwise, self.factories.clone())))
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        if self.with_else {
            return None;
        }
        Some(Arc::new(IfThenElseFactory {
            with_else: false,
            factories: [prepare(&args[0], kb), prepare(&args[1], kb), None],
        }))
    }
}

enum State {
    Start,
    Then(Subgoal),
    Else(Subgoal),
    Done,
}

/// Proves the condition once, then commits to one branch.
///
/// The condition is opaque to cut and never retried. Its bindings stay in
/// place for the then-branch and are undone when that branch runs out.
pub(super) struct IfThenElse {
    cond: Term,
    then: Term,
    otherwise: Option<Term>,
    factories: [Prepared; 3],
    state: State,
}

impl IfThenElse {
    pub(super) fn new(cond: Term, then: Term, otherwise: Option<Term>, factories: [Prepared; 3]) -> Self {
        Self {
            cond,
            then,
            otherwise,
            factories,
            state: State::Start,
        }
    }

    fn start(&mut self, m: &mut Machine) -> Outcome {
        let mut cond = Opaque::new(self.cond.clone(), self.factories[0].clone());
        if cond.next(m)? {
            // Dropping the condition discards its remaining alternatives.
            let mut then = m.solve(&self.then, self.factories[1].as_ref())?;
            if then.evaluate(m)? {
                self.state = State::Then(then);
                return Ok(true);
            }
            cond.undo(m);
            return Ok(false);
        }
        let Some(otherwise) = &self.otherwise else {
            return Ok(false);
        };
        let mut branch = m.solve(otherwise, self.factories[2].as_ref())?;
        if branch.evaluate(m)? {
            self.state = State::Else(branch);
            return Ok(true);
        }
        Ok(false)
    }
}

impl Predicate for IfThenElse {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        match std::mem::replace(&mut self.state, State::Done) {
            State::Start => self.start(m),
            State::Then(mut then) => {
                if then.retry(m)? {
                    self.state = State::Then(then);
                    return Ok(true);
                }
                m.backtrack(&self.cond);
                Ok(false)
            }
            State::Else(mut branch) => {
                if branch.retry(m)? {
                    self.state = State::Else(branch);
                    return Ok(true);
                }
                Ok(false)
            }
            State::Done => Ok(false),
        }
    }

    fn could_reevaluation_succeed(&self) -> bool {
        match &self.state {
            State::Start => true,
            State::Then(branch) | State::Else(branch) => branch.could_reevaluation_succeed(),
            State::Done => false,
        }
    }
}
