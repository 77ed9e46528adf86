use super::if_then::{IfThenElse, IfThenElseFactory};
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Outcome, Predicate, PredicateFactory, Subgoal};
use crate::preprocess::prepare;
use crate::symbol::known;
use crate::term::{Args, Term};
use std::sync::Arc;

/// `;/2`. A left operand of the form `Cond -> Then` makes it if-then-else.
#[derive(Default)]
pub struct DisjunctionFactory {
    left: Option<Arc<dyn PredicateFactory>>,
    right: Option<Arc<dyn PredicateFactory>>,
}

fn is_if_then(term: &Term) -> bool {
    term.has_functor(known().if_then, 2)
}

impl PredicateFactory for DisjunctionFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        if is_if_then(&args[0]) {
            let branches = args[0].args();
            return Ok(Box::new(IfThenElse::new(
                branches[0].clone(),
                branches[1].clone(),
                Some(args[1].clone()),
                [None, None, None],
            )));
        }
        Ok(Box::new(Disjunction {
            left_goal: args[0].clone(),
            right_goal: args[1].clone(),
            left_factory: self.left.clone(),
            right_factory: self.right.clone(),
            state: State::Start,
        }))
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        if is_if_then(&args[0]) {
            let branches = args[0].args();
            return Some(Arc::new(IfThenElseFactory::prepared(
                prepare(&branches[0], kb),
                prepare(&branches[1], kb),
                prepare(&args[1], kb),
            )));
        }
        Some(Arc::new(DisjunctionFactory {
            left: prepare(&args[0], kb),
            right: prepare(&args[1], kb),
        }))
    }
}

enum State {
    Start,
    Left(Subgoal),
    Right(Subgoal),
    Done,
}

/// Every solution of the left goal, then every solution of the right.
struct Disjunction {
    left_goal: Term,
    right_goal: Term,
    left_factory: Option<Arc<dyn PredicateFactory>>,
    right_factory: Option<Arc<dyn PredicateFactory>>,
    state: State,
}

impl Predicate for Disjunction {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        match std::mem::replace(&mut self.state, State::Done) {
            State::Start => {
                let mut left = m.solve(&self.left_goal, self.left_factory.as_ref())?;
                if left.evaluate(m)? {
                    self.state = State::Left(left);
                    return Ok(true);
                }
            }
            State::Left(mut left) => {
                if left.retry(m)? {
                    self.state = State::Left(left);
                    return Ok(true);
                }
            }
            State::Right(mut right) => {
                if right.retry(m)? {
                    self.state = State::Right(right);
                    return Ok(true);
                }
                return Ok(false);
            }
            State::Done => return Ok(false),
        }

        let mut right = m.solve(&self.right_goal, self.right_factory.as_ref())?;
        if right.evaluate(m)? {
            self.state = State::Right(right);
            return Ok(true);
        }
        Ok(false)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        match &self.state {
            State::Start | State::Left(_) => true,
            State::Right(right) => right.could_reevaluation_succeed(),
            State::Done => false,
        }
    }
}
