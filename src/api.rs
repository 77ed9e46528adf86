//! Public API: an [`Engine`] owning a knowledge base, and [`Query`]
//! iterators over the solutions of a goal.
//!
//! ```rust,ignore
//! let engine = Engine::new();
//! engine.consult_str("parent(tom, bob). parent(bob, ann).")?;
//! let mut q = engine.query("parent(X, ann)")?;
//! while q.evaluate()? {
//!     println!("{}", q.binding("X")?);
//! }
//! ```

use crate::builtins::LIBRARY;
use crate::clause::normalize_body;
use crate::control::Opaque;
use crate::error::PrologError;
use crate::kb::{KnowledgeBase, Unknown};
use crate::machine::{stdout_output, Machine, Output};
use crate::metrics::MetricsReport;
use crate::parser::{parse_sentences, parse_term, Sentence};
use crate::predicate::Signal;
use crate::preprocess::prepare;
use crate::symbol::known;
use crate::term::Term;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use crate::trace::{debug, warn};

/// Engine settings.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Consult the bundled list library (`member/2`, `append/3`, ...).
    pub load_library: bool,
    pub unknown: Unknown,
    /// Answers the REPL prints for `more` without a count.
    pub max_answers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            load_library: true,
            unknown: Unknown::Error,
            max_answers: 10,
        }
    }
}

impl EngineConfig {
    pub fn with_library(mut self, load: bool) -> Self {
        self.load_library = load;
        self
    }

    pub fn with_unknown(mut self, unknown: Unknown) -> Self {
        self.unknown = unknown;
        self
    }

    pub fn with_max_answers(mut self, n: usize) -> Self {
        self.max_answers = n;
        self
    }
}

/// A knowledge base plus the settings queries against it run with.
pub struct Engine {
    kb: Arc<KnowledgeBase>,
    config: EngineConfig,
    output: Output,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let engine = Self {
            kb: Arc::new(KnowledgeBase::with_builtins(config.unknown)),
            config,
            output: stdout_output(),
        };
        if engine.config.load_library {
            if let Err(_e) = engine.consult_str(LIBRARY) {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, "library failed to load");
            }
        }
        engine
    }

    /// Send `write/1` output somewhere other than stdout.
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn kb(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Add every clause of `text`; `:- Goal` directives run once, in order.
    ///
    /// A directive that raises stops consulting with its error. One that
    /// fails is skipped.
    pub fn consult_str(&self, text: &str) -> Result<(), PrologError> {
        let k = known();
        for sentence in parse_sentences(text)? {
            let term = &sentence.term;
            if term.has_functor(k.neck, 1) || term.has_functor(k.query, 1) {
                let goal = Sentence {
                    term: term.args()[0].clone(),
                    var_names: sentence.var_names.clone(),
                    var_count: sentence.var_count,
                };
                let mut query = self.prepare_query(goal)?;
                if !query.evaluate()? {
                    #[cfg(feature = "tracing")]
                    warn!(directive = %term, "directive failed");
                }
                continue;
            }
            self.kb.add_clause(term, sentence.var_count, false)?;
        }
        #[cfg(feature = "tracing")]
        debug!(predicates = self.kb.user_predicates().len(), "consulted");
        Ok(())
    }

    pub fn consult_file(&self, path: impl AsRef<Path>) -> Result<(), PrologError> {
        let text = std::fs::read_to_string(path)?;
        self.consult_str(&text)
    }

    /// Start a query. Nothing runs until [`Query::evaluate`].
    pub fn query(&self, text: &str) -> Result<Query, PrologError> {
        self.prepare_query(parse_term(text)?)
    }

    fn prepare_query(&self, sentence: Sentence) -> Result<Query, PrologError> {
        let template = normalize_body(&sentence.term)?;
        let factory = prepare(&template, &self.kb);
        let mut machine = Machine::new(Arc::clone(&self.kb), Arc::clone(&self.output));
        let base = machine.bindings.fresh_block(sentence.var_count);
        let goal = machine.bindings.instantiate(&template, base);
        let vars = sentence
            .var_names
            .into_iter()
            .map(|(name, index)| (name, Term::var(base + index)))
            .collect();
        Ok(Query {
            goal: Opaque::new(goal, factory),
            machine,
            vars,
            done: false,
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// A running query: each [`evaluate`](Query::evaluate) finds the next
/// solution. A cut at the top of the query ends the search after the
/// current solution.
pub struct Query {
    machine: Machine,
    goal: Opaque,
    vars: Vec<(String, Term)>,
    done: bool,
}

impl Query {
    /// Find the next solution; `false` once there are no more.
    ///
    /// An error ends the query.
    pub fn evaluate(&mut self) -> Result<bool, PrologError> {
        if self.done {
            return Ok(false);
        }
        match self.goal.next(&mut self.machine) {
            Ok(true) => {
                self.machine.metrics().record_solution();
                Ok(true)
            }
            Ok(false) | Err(Signal::Cut) => {
                self.done = true;
                Ok(false)
            }
            Err(Signal::Error(e)) => {
                self.done = true;
                Err(e)
            }
        }
    }

    /// `false` guarantees another `evaluate` would return `false`.
    pub fn could_reevaluation_succeed(&self) -> bool {
        !self.done && self.goal.could_reevaluation_succeed()
    }

    /// Current value of a named query variable, fully resolved.
    pub fn binding(&self, name: &str) -> Result<Term, PrologError> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, var)| self.machine.resolve(var))
            .ok_or_else(|| PrologError::unknown_variable(name))
    }

    /// Names of the query's variables, in order of first occurrence.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|(name, _)| name.as_str())
    }

    /// The next solution as printable bindings.
    pub fn next_answer(&mut self) -> Result<Option<Answer>, PrologError> {
        if !self.evaluate()? {
            return Ok(None);
        }
        let bindings = self
            .vars
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .filter_map(|(name, var)| {
                let value = self.machine.resolve(var);
                (value != *var).then(|| (name.clone(), value))
            })
            .collect();
        Ok(Some(Answer { bindings }))
    }

    pub fn metrics(&self) -> MetricsReport {
        self.machine.metrics().report()
    }

    /// Variable slots currently allocated in the query's binding arena.
    pub fn arena_len(&self) -> usize {
        self.machine.bindings.len()
    }
}

/// Variable bindings of one solution.
#[derive(Clone, Debug, PartialEq)]
pub struct Answer {
    pub bindings: Vec<(String, Term)>,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bindings.is_empty() {
            return f.write_str("true");
        }
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}
