use super::Opaque;
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Outcome, Predicate, PredicateFactory};
use crate::preprocess::prepare;
use crate::term::{Args, Term};
use std::sync::Arc;

/// `\+/1` and `not/1`.
#[derive(Default)]
pub struct NegationFactory {
    goal: Option<Arc<dyn PredicateFactory>>,
}

impl PredicateFactory for NegationFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Negation {
            goal: Opaque::new(args[0].clone(), self.goal.clone()),
            done: false,
        }))
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        Some(Arc::new(NegationFactory {
            goal: prepare(&args[0], kb),
        }))
    }
}

/// Succeeds iff the goal has no solution; never binds anything.
struct Negation {
    goal: Opaque,
    done: bool,
}

impl Predicate for Negation {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        if self.done {
            return Ok(false);
        }
        self.done = true;
        let proved = self.goal.next(m)?;
        if proved {
            self.goal.undo(m);
        }
        Ok(!proved)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        !self.done
    }
}
