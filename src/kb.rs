//! Predicate registry: built-in factories and user clause tables.

use crate::clause::{clause_key, ClauseModel};
use crate::error::PrologError;
use crate::predicate::PredicateFactory;
use crate::resolution::UserFactory;
use crate::term::{PredicateKey, Term};
use hashbrown::HashMap;
use parking_lot::RwLock;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use crate::trace::debug;

type FxBuild = BuildHasherDefault<FxHasher>;

/// What a call to a predicate with no clauses and no declaration does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Unknown {
    #[default]
    Error,
    Fail,
}

pub type ClauseList = Arc<Vec<Arc<ClauseModel>>>;

/// Clauses of one user-defined predicate.
///
/// Updates replace the shared list, so a call that already took a snapshot
/// keeps iterating the clauses that existed when it started.
pub struct ClauseTable {
    key: PredicateKey,
    clauses: RwLock<ClauseList>,
    defined: AtomicBool,
}

impl ClauseTable {
    fn new(key: PredicateKey) -> Self {
        Self {
            key,
            clauses: RwLock::new(Arc::new(Vec::new())),
            defined: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> PredicateKey {
        self.key
    }

    pub fn snapshot(&self) -> ClauseList {
        Arc::clone(&*self.clauses.read())
    }

    pub fn len(&self) -> usize {
        self.clauses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Has the predicate ever had clauses or been declared dynamic?
    pub fn is_defined(&self) -> bool {
        self.defined.load(Ordering::Acquire)
    }

    fn mark_defined(&self) {
        self.defined.store(true, Ordering::Release);
    }

    fn insert(&self, clause: Arc<ClauseModel>, front: bool) {
        let mut guard = self.clauses.write();
        let list = Arc::make_mut(&mut *guard);
        if front {
            list.insert(0, clause);
        } else {
            list.push(clause);
        }
        drop(guard);
        self.mark_defined();
    }

    /// Remove this exact clause; false if another update already did.
    pub fn remove(&self, clause: &Arc<ClauseModel>) -> bool {
        let mut guard = self.clauses.write();
        match guard.iter().position(|c| Arc::ptr_eq(c, clause)) {
            Some(pos) => {
                Arc::make_mut(&mut *guard).remove(pos);
                true
            }
            None => false,
        }
    }
}

enum Entry {
    BuiltIn(Arc<dyn PredicateFactory>),
    User {
        table: Arc<ClauseTable>,
        factory: Arc<dyn PredicateFactory>,
    },
}

impl Entry {
    fn user(key: PredicateKey) -> Self {
        let table = Arc::new(ClauseTable::new(key));
        let factory: Arc<dyn PredicateFactory> =
            Arc::new(UserFactory::new(key, Arc::downgrade(&table)));
        Entry::User { table, factory }
    }

    fn factory(&self) -> &Arc<dyn PredicateFactory> {
        match self {
            Entry::BuiltIn(factory) => factory,
            Entry::User { factory, .. } => factory,
        }
    }
}

pub struct KnowledgeBase {
    predicates: RwLock<HashMap<PredicateKey, Entry, FxBuild>>,
    unknown: Unknown,
}

impl KnowledgeBase {
    /// An empty knowledge base with no built-ins.
    pub fn new(unknown: Unknown) -> Self {
        Self {
            predicates: RwLock::new(HashMap::default()),
            unknown,
        }
    }

    /// A knowledge base with every native built-in registered.
    pub fn with_builtins(unknown: Unknown) -> Self {
        let kb = Self::new(unknown);
        crate::builtins::register(&kb);
        kb
    }

    pub fn unknown(&self) -> Unknown {
        self.unknown
    }

    /// Register a built-in, replacing whatever was there.
    pub fn register(&self, key: PredicateKey, factory: Arc<dyn PredicateFactory>) {
        self.predicates.write().insert(key, Entry::BuiltIn(factory));
    }

    pub fn is_builtin(&self, key: PredicateKey) -> bool {
        matches!(self.predicates.read().get(&key), Some(Entry::BuiltIn(_)))
    }

    /// Factory for `key`. Unknown keys get an empty user-defined entry so a
    /// reference prepared now sees clauses added later.
    pub fn factory(&self, key: PredicateKey) -> Arc<dyn PredicateFactory> {
        if let Some(entry) = self.predicates.read().get(&key) {
            return Arc::clone(entry.factory());
        }
        let mut predicates = self.predicates.write();
        let entry = predicates.entry(key).or_insert_with(|| Entry::user(key));
        Arc::clone(entry.factory())
    }

    /// Clause table of a user-defined predicate, created if missing.
    pub fn table(&self, key: PredicateKey, action: &'static str) -> Result<Arc<ClauseTable>, PrologError> {
        if let Some(entry) = self.predicates.read().get(&key) {
            return match entry {
                Entry::User { table, .. } => Ok(Arc::clone(table)),
                Entry::BuiltIn(_) => Err(PrologError::permission(action, key)),
            };
        }
        let mut predicates = self.predicates.write();
        match predicates.entry(key).or_insert_with(|| Entry::user(key)) {
            Entry::User { table, .. } => Ok(Arc::clone(table)),
            Entry::BuiltIn(_) => Err(PrologError::permission(action, key)),
        }
    }

    /// Existing clause table of `key`, if it is user-defined.
    pub fn existing_table(&self, key: PredicateKey) -> Option<Arc<ClauseTable>> {
        match self.predicates.read().get(&key) {
            Some(Entry::User { table, .. }) => Some(Arc::clone(table)),
            _ => None,
        }
    }

    /// Add a clause numbered `0..var_count`, last (`assertz`) or first (`asserta`).
    pub fn add_clause(&self, term: &Term, var_count: u32, front: bool) -> Result<(), PrologError> {
        let key = clause_key(term)?;
        let table = self.table(key, "modify")?;
        // Prepared outside the registry lock: preparing looks up other keys.
        let clause = ClauseModel::new(term, var_count, self)?;
        #[cfg(feature = "tracing")]
        debug!(pred = %key, front, "add_clause");
        table.insert(Arc::new(clause), front);
        Ok(())
    }

    pub fn declare_dynamic(&self, key: PredicateKey) -> Result<(), PrologError> {
        self.table(key, "declare dynamic")?.mark_defined();
        Ok(())
    }

    /// Built-in, or user-defined with clauses or a declaration.
    pub fn is_defined(&self, key: PredicateKey) -> bool {
        match self.predicates.read().get(&key) {
            Some(Entry::BuiltIn(_)) => true,
            Some(Entry::User { table, .. }) => table.is_defined(),
            None => false,
        }
    }

    /// Defined user predicates, sorted by name then arity.
    pub fn user_predicates(&self) -> Vec<Arc<ClauseTable>> {
        let mut tables: Vec<Arc<ClauseTable>> = self
            .predicates
            .read()
            .values()
            .filter_map(|entry| match entry {
                Entry::User { table, .. } if table.is_defined() => Some(Arc::clone(table)),
                _ => None,
            })
            .collect();
        tables.sort_by(|a, b| {
            a.key()
                .name
                .name()
                .cmp(b.key().name.name())
                .then(a.key().arity.cmp(&b.key().arity))
        });
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::{app, atom};

    #[test]
    fn lookup_creates_placeholder_that_later_fills() {
        let kb = KnowledgeBase::new(Unknown::Error);
        let key = PredicateKey::of("later", 1);
        let _factory = kb.factory(key);
        assert!(!kb.is_defined(key));

        kb.add_clause(&app("later", vec![atom("x")]), 0, false).unwrap();
        assert!(kb.is_defined(key));
        assert_eq!(kb.existing_table(key).unwrap().len(), 1);
    }

    #[test]
    fn asserta_prepends_and_assertz_appends() {
        let kb = KnowledgeBase::new(Unknown::Error);
        kb.add_clause(&app("p", vec![atom("b")]), 0, false).unwrap();
        kb.add_clause(&app("p", vec![atom("c")]), 0, false).unwrap();
        kb.add_clause(&app("p", vec![atom("a")]), 0, true).unwrap();
        let table = kb.existing_table(PredicateKey::of("p", 1)).unwrap();
        let heads: Vec<Term> = table.snapshot().iter().map(|c| c.head().clone()).collect();
        assert_eq!(
            heads,
            vec![
                app("p", vec![atom("a")]),
                app("p", vec![atom("b")]),
                app("p", vec![atom("c")]),
            ]
        );
    }

    #[test]
    fn snapshot_is_unaffected_by_later_updates() {
        let kb = KnowledgeBase::new(Unknown::Error);
        kb.add_clause(&app("p", vec![atom("a")]), 0, false).unwrap();
        let table = kb.existing_table(PredicateKey::of("p", 1)).unwrap();
        let before = table.snapshot();
        kb.add_clause(&app("p", vec![atom("b")]), 0, false).unwrap();
        assert!(table.remove(&before[0]));
        assert_eq!(before.len(), 1);
        assert_eq!(table.len(), 1);
        assert!(!table.remove(&before[0]), "already removed");
        assert!(kb.is_defined(PredicateKey::of("p", 1)), "stays defined");
    }

    #[test]
    fn clauses_for_builtins_are_rejected() {
        let kb = KnowledgeBase::with_builtins(Unknown::Error);
        let err = kb
            .add_clause(&app("atom", vec![atom("x")]), 0, false)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Permission { .. }));
    }

    #[test]
    fn listing_is_sorted() {
        let kb = KnowledgeBase::new(Unknown::Error);
        kb.add_clause(&atom("zed"), 0, false).unwrap();
        kb.add_clause(&atom("alpha"), 0, false).unwrap();
        kb.declare_dynamic(PredicateKey::of("mid", 2)).unwrap();
        let _ = kb.factory(PredicateKey::of("undefined", 0));
        let names: Vec<String> = kb
            .user_predicates()
            .iter()
            .map(|t| t.key().to_string())
            .collect();
        assert_eq!(names, vec!["alpha/0", "mid/2", "zed/0"]);
    }
}
