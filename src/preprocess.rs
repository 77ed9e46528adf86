//! Ahead-of-time specialization of goals.
//!
//! A clause body or query goal is prepared once: its predicate is looked
//! up, and the factory may return a specialized version for the shape of
//! its arguments. Control constructs use this to resolve the factories of
//! their sub-goals once instead of on every call.

use crate::kb::KnowledgeBase;
use crate::predicate::PredicateFactory;
use crate::term::Term;
use std::sync::Arc;

/// The factory to run `goal` with, or `None` when the goal's predicate
/// cannot be known before it runs (a variable or a non-callable term).
pub fn prepare(goal: &Term, kb: &KnowledgeBase) -> Option<Arc<dyn PredicateFactory>> {
    let key = goal.key()?;
    let factory = kb.factory(key);
    Some(factory.preprocess(goal.args(), kb).unwrap_or(factory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::Unknown;
    use crate::term::PredicateKey;
    use crate::test_utils::{app, atom, int};

    #[test]
    fn variables_and_numbers_are_not_prepared() {
        let kb = KnowledgeBase::with_builtins(Unknown::Error);
        assert!(prepare(&Term::var(0), &kb).is_none());
        assert!(prepare(&int(1), &kb).is_none());
    }

    #[test]
    fn conjunction_is_specialized() {
        let kb = KnowledgeBase::with_builtins(Unknown::Error);
        let plain = kb.factory(PredicateKey::of(",", 2));
        let goal = app(",", vec![atom("true"), atom("fail")]);
        let prepared = prepare(&goal, &kb).unwrap();
        assert!(!Arc::ptr_eq(&plain, &prepared));
        assert!(!prepared.is_retryable(), "both conjuncts are deterministic");
    }

    #[test]
    fn unknown_callee_gets_a_placeholder() {
        let kb = KnowledgeBase::with_builtins(Unknown::Error);
        let goal = app("not_yet_defined", vec![Term::var(0)]);
        assert!(prepare(&goal, &kb).is_some());
        assert!(!kb.is_defined(PredicateKey::of("not_yet_defined", 1)));
    }
}
