use super::Opaque;
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::predicate::{Outcome, Predicate, PredicateFactory};
use crate::preprocess::prepare;
use crate::term::{Args, Term};
use std::sync::Arc;

/// `call/1..8`: the goal with any extra arguments appended, opaque to cut.
pub struct CallFactory {
    extra: usize,
    goal: Option<Arc<dyn PredicateFactory>>,
}

impl CallFactory {
    pub fn new(extra: usize) -> Self {
        Self { extra, goal: None }
    }
}

/// `Goal` extended with `extra` arguments.
fn extend_goal(goal: &Term, extra: &[Term]) -> Result<Term, PrologError> {
    if extra.is_empty() {
        return Ok(goal.clone());
    }
    match goal {
        Term::Var(_) => Err(PrologError::instantiation()),
        g if g.is_callable() => {
            let name = g.name().ok_or_else(|| PrologError::type_error("callable", g.clone()))?;
            let args: Args = g.args().iter().chain(extra).cloned().collect();
            Ok(Term::compound(name, args))
        }
        g => Err(PrologError::type_error("callable", g.clone())),
    }
}

impl PredicateFactory for CallFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        let goal = extend_goal(&args[0], &args[1..=self.extra])?;
        Ok(Box::new(Call(Opaque::new(goal, self.goal.clone()))))
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        if self.extra > 0 || args[0].is_var() {
            return None;
        }
        Some(Arc::new(CallFactory {
            extra: 0,
            goal: prepare(&args[0], kb),
        }))
    }
}

struct Call(Opaque);

impl Predicate for Call {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        self.0.next(m)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        self.0.could_reevaluation_succeed()
    }
}

/// `V^Goal` called as a goal proves `Goal`.
pub struct CaretFactory;

impl PredicateFactory for CaretFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Call(Opaque::new(args[1].clone(), None))))
    }
}

/// `once/1`.
#[derive(Default)]
pub struct OnceFactory {
    goal: Option<Arc<dyn PredicateFactory>>,
}

impl PredicateFactory for OnceFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Once {
            goal: Opaque::new(args[0].clone(), self.goal.clone()),
            ignore: false,
            done: false,
        }))
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        let goal = prepare(&args[0], kb)?;
        // A goal that never succeeds twice and cannot raise a cut needs no wrapper.
        if !goal.is_retryable() {
            return Some(goal);
        }
        Some(Arc::new(OnceFactory { goal: Some(goal) }))
    }
}

/// `ignore/1`: like `once/1` but succeeds when the goal fails.
#[derive(Default)]
pub struct IgnoreFactory {
    goal: Option<Arc<dyn PredicateFactory>>,
}

impl PredicateFactory for IgnoreFactory {
    fn predicate(&self, args: Args, _m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        Ok(Box::new(Once {
            goal: Opaque::new(args[0].clone(), self.goal.clone()),
            ignore: true,
            done: false,
        }))
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn preprocess(&self, args: &[Term], kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
        Some(Arc::new(IgnoreFactory {
            goal: prepare(&args[0], kb),
        }))
    }
}

struct Once {
    goal: Opaque,
    ignore: bool,
    done: bool,
}

impl Predicate for Once {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        if self.done {
            self.goal.undo(m);
            return Ok(false);
        }
        self.done = true;
        let proved = self.goal.next(m)?;
        Ok(proved || self.ignore)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        !self.done
    }
}
