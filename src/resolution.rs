//! Resolution of user-defined predicates against their clauses.

use crate::clause::{ClauseModel, IndexKey};
use crate::error::PrologError;
use crate::kb::{ClauseList, ClauseTable, Unknown};
use crate::machine::Machine;
use crate::predicate::{Constant, Outcome, Predicate, PredicateFactory, Signal, Subgoal};
use crate::symbol::known;
use crate::term::{Args, PredicateKey, Term};
use std::sync::{Arc, Weak};

#[cfg(feature = "tracing")]
use crate::trace::{debug, trace};

/// Factory handed out by the knowledge base for a user-defined key.
///
/// Holds the clause table weakly: prepared clause bodies keep factories
/// alive, and the table owns those bodies.
pub struct UserFactory {
    key: PredicateKey,
    table: Weak<ClauseTable>,
}

impl UserFactory {
    pub fn new(key: PredicateKey, table: Weak<ClauseTable>) -> Self {
        Self { key, table }
    }
}

impl PredicateFactory for UserFactory {
    fn predicate(&self, args: Args, m: &mut Machine) -> Result<Box<dyn Predicate>, PrologError> {
        let table = match self.table.upgrade() {
            Some(table) if table.is_defined() => table,
            _ => {
                return match m.kb().unknown() {
                    Unknown::Error => Err(PrologError::unknown_predicate(self.key)),
                    Unknown::Fail => Ok(Constant::boxed(false)),
                };
            }
        };

        m.metrics().record_call();
        #[cfg(feature = "tracing")]
        trace!(pred = %self.key, "call");

        let index = args.first().and_then(IndexKey::of);
        let mut pred = UserPredicate {
            key: self.key,
            mark: m.bindings.len(),
            args,
            clauses: table.snapshot(),
            index,
            next: 0,
            active: Active::Idle,
        };
        pred.skip_unmatched();
        Ok(Box::new(pred))
    }
}

/// What the last solution came from.
enum Active {
    Idle,
    Fact,
    Body {
        body: Subgoal,
        head: Term,
    },
}

/// One call of a user-defined predicate.
///
/// Tries clauses in order against a snapshot of the table. `next` always
/// points at the next clause whose first argument could match, so the
/// retry hint is exact once the last candidate's body is exhausted.
///
/// Variables created by a clause attempt live above `mark`; once the
/// attempt has failed they are released before the next one starts.
struct UserPredicate {
    key: PredicateKey,
    mark: usize,
    args: Args,
    clauses: ClauseList,
    index: Option<IndexKey>,
    next: usize,
    active: Active,
}

impl UserPredicate {
    fn skip_unmatched(&mut self) {
        while self.next < self.clauses.len() && !self.clauses[self.next].may_match(self.index) {
            self.next += 1;
        }
    }

    /// A cut in the running clause body: no other clause may be tried.
    fn commit_failure(&mut self, m: &mut Machine) -> bool {
        m.metrics().record_cut();
        #[cfg(feature = "tracing")]
        debug!(pred = %self.key, "cut");
        self.next = self.clauses.len();
        self.active = Active::Idle;
        m.backtrack_all(&self.args);
        m.bindings.truncate(self.mark);
        false
    }

    fn framed(&self, e: PrologError, head: &Term, body: &Term, m: &Machine) -> Signal {
        #[cfg(feature = "tracing")]
        debug!(pred = %self.key, error = %e, "error");
        let clause = Term::compound(known().neck, [m.resolve(head), m.resolve(body)]);
        Signal::Error(e.in_clause(self.key, clause))
    }

    fn head_matches(&self, head: &Term, m: &mut Machine) -> bool {
        for (h, a) in head.args().iter().zip(self.args.iter()) {
            if !m.unify(h, a) {
                m.metrics().record_unification_failure();
                return false;
            }
        }
        m.metrics().record_unification();
        true
    }

    fn next_solution(&mut self, m: &mut Machine) -> Outcome {
        while self.next < self.clauses.len() {
            m.bindings.truncate(self.mark);
            let clause: Arc<ClauseModel> = Arc::clone(&self.clauses[self.next]);
            self.next += 1;
            self.skip_unmatched();

            let base = m.bindings.fresh_block(clause.var_count());
            let head = m.bindings.instantiate(clause.head(), base);
            if !self.head_matches(&head, m) {
                m.backtrack_all(&self.args);
                continue;
            }
            if clause.is_fact() {
                self.active = Active::Fact;
                #[cfg(feature = "tracing")]
                trace!(pred = %self.key, "exit");
                return Ok(true);
            }

            let goal = m.bindings.instantiate(clause.body(), base);
            let mut body = match m.solve(&goal, clause.body_factory()) {
                Ok(body) => body,
                Err(e) => return Err(self.framed(e, &head, &goal, m)),
            };
            match body.evaluate(m) {
                Ok(true) => {
                    self.active = Active::Body { body, head };
                    #[cfg(feature = "tracing")]
                    trace!(pred = %self.key, "exit");
                    return Ok(true);
                }
                Ok(false) => {
                    m.metrics().record_backtrack();
                    m.backtrack_all(&self.args);
                }
                Err(Signal::Cut) => return Ok(self.commit_failure(m)),
                Err(Signal::Error(e)) => return Err(self.framed(e, &head, &goal, m)),
            }
        }
        m.bindings.truncate(self.mark);
        #[cfg(feature = "tracing")]
        trace!(pred = %self.key, "fail");
        Ok(false)
    }
}

impl Predicate for UserPredicate {
    fn evaluate(&mut self, m: &mut Machine) -> Outcome {
        match std::mem::replace(&mut self.active, Active::Idle) {
            Active::Idle => {}
            Active::Fact => {
                m.metrics().record_redo();
                m.backtrack_all(&self.args);
            }
            Active::Body { mut body, head } => {
                m.metrics().record_redo();
                #[cfg(feature = "tracing")]
                trace!(pred = %self.key, "redo");
                match body.retry(m) {
                    Ok(true) => {
                        self.active = Active::Body { body, head };
                        return Ok(true);
                    }
                    Ok(false) => {
                        m.metrics().record_backtrack();
                        m.backtrack_all(&self.args);
                    }
                    Err(Signal::Cut) => return Ok(self.commit_failure(m)),
                    Err(Signal::Error(e)) => {
                        let goal = body.goal().clone();
                        return Err(self.framed(e, &head, &goal, m));
                    }
                }
            }
        }
        self.next_solution(m)
    }

    fn could_reevaluation_succeed(&self) -> bool {
        match &self.active {
            Active::Body { body, .. } if body.could_reevaluation_succeed() => true,
            _ => self.next < self.clauses.len(),
        }
    }
}
