use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Outcome, Predicate, PredicateFactory, Subgoal};
use crate::preprocess::prepare;
use crate::term::{Args, Term};
use std::sync::Arc;

/// `,/2`. Prepared instances carry the factories of both conjuncts.
#[derive(Default)]
pub struct ConjunctionFactory {
    first: Option<Arc<dyn PredicateFactory>>,
    second: Option<Arc<dyn PredicateFactory>>,
}

impl PredicateFactory for ConjunctionFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Conjunction {
            first_goal: args[0].clone(),
            second_goal: args[1].clone(),
            first_factory: self.first.clone(),
            second_factory: self.second.clone(),
            first: None,
            second: None,
            exhausted: false,
        }))
    }

    fn is_retryable(&self) -> bool {
        match (&self.first, &self.second) {
            (Some(first), Some(second)) => first.is_retryable() || second.is_retryable(),
            _ => true,
        }
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        Some(Arc::new(ConjunctionFactory {
            first: prepare(&args[0], kb),
            second: prepare(&args[1], kb),
        }))
    }
}

/// Runs the second goal once per solution of the first.
///
/// The second goal is started afresh from its original term after every
/// new solution of the first, so it sees the first goal's current bindings
/// and nothing left over from an earlier attempt.
struct Conjunction {
    first_goal: Term,
    second_goal: Term,
    first_factory: Option<Arc<dyn PredicateFactory>>,
    second_factory: Option<Arc<dyn PredicateFactory>>,
    first: Option<Subgoal>,
    second: Option<Subgoal>,
    exhausted: bool,
}

impl Conjunction {
    fn advance_first(&mut self, m: &mut Machine) -> Outcome {
        if let Some(first) = self.first.as_mut() {
            return first.retry(m);
        }
        let mut first = m.solve(&self.first_goal, self.first_factory.as_ref())?;
        let found = first.evaluate(m)?;
        self.first = Some(first);
        Ok(found)
    }
}

impl Predicate for Conjunction {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        if self.exhausted {
            return Ok(false);
        }
        if let Some(second) = self.second.as_mut() {
            if second.retry(m)? {
                return Ok(true);
            }
            self.second = None;
        }
        loop {
            if !self.advance_first(m)? {
                self.exhausted = true;
                self.first = None;
                return Ok(false);
            }
            let mut second = m.solve(&self.second_goal, self.second_factory.as_ref())?;
            if second.evaluate(m)? {
                self.second = Some(second);
                return Ok(true);
            }
        }
    }

    fn could_reevaluation_succeed(&self) -> bool {
        if self.exhausted {
            return false;
        }
        match (&self.first, &self.second) {
            (None, _) => true,
            (Some(first), second) => {
                first.could_reevaluation_succeed()
                    || second
                        .as_ref()
                        .is_some_and(Subgoal::could_reevaluation_succeed)
            }
        }
    }
}
