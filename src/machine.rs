//! Per-query execution state shared by every evaluator of one search.

use crate::bindings::Bindings;
use crate::error::PrologError;
use crate::kb::KnowledgeBase;
use crate::metrics::EvalMetrics;
use crate::predicate::{PredicateFactory, Subgoal};
use crate::term::Term;
use crate::unify::unify;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Destination of `write/1` and friends.
pub type Output = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn stdout_output() -> Output {
    let stdout: Box<dyn Write + Send> = Box::new(std::io::stdout());
    Arc::new(Mutex::new(stdout))
}

/// The binding arena plus the knowledge base a query resolves against.
///
/// Not shared between threads: one machine drives one query.
pub struct Machine {
    pub bindings: Bindings,
    kb: Arc<KnowledgeBase>,
    output: Output,
    metrics: EvalMetrics,
}

impl Machine {
    pub fn new(kb: Arc<KnowledgeBase>, output: Output) -> Self {
        Self {
            bindings: Bindings::new(),
            kb,
            output,
            metrics: EvalMetrics::new(),
        }
    }

    pub fn kb(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn metrics(&self) -> &EvalMetrics {
        &self.metrics
    }

    pub fn unify(&mut self, a: &Term, b: &Term) -> bool {
        unify(a, b, &mut self.bindings)
    }

    pub fn backtrack(&mut self, term: &Term) {
        self.bindings.backtrack(term);
    }

    pub fn backtrack_all(&mut self, terms: &[Term]) {
        self.bindings.backtrack_all(terms);
    }

    pub fn deref(&self, term: &Term) -> Term {
        self.bindings.deref(term).clone()
    }

    pub fn resolve(&self, term: &Term) -> Term {
        self.bindings.resolve(term)
    }

    /// Start a goal, using `prepared` when the goal was specialized ahead of
    /// time and looking its predicate up otherwise.
    ///
    /// The goal is resolved first, so the returned sub-goal can later undo
    /// itself by backtracking that resolved term.
    pub fn solve(
        &mut self,
        goal: &Term,
        prepared: Option<&Arc<dyn PredicateFactory>>,
    ) -> Result<Subgoal, PrologError> {
        let goal = self.bindings.resolve(goal);
        if goal.is_var() {
            return Err(PrologError::instantiation());
        }
        let Some(key) = goal.key() else {
            return Err(PrologError::type_error("callable", goal));
        };
        let factory = match prepared {
            Some(factory) => Arc::clone(factory),
            None => self.kb.factory(key),
        };
        let args = goal.args().iter().cloned().collect();
        let pred = factory.predicate(args, self)?;
        Ok(Subgoal::new(goal, pred))
    }
}
