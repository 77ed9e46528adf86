use crate::api::{Engine, Query};
use crate::bindings::Bindings;
use crate::parser::parse_term;
use crate::term::Term;

pub(crate) fn setup() -> Bindings {
    Bindings::new()
}

pub(crate) fn atom(name: &str) -> Term {
    Term::atom(name)
}

pub(crate) fn int(value: i64) -> Term {
    Term::integer(value)
}

pub(crate) fn app(name: &str, args: Vec<Term>) -> Term {
    Term::structure(name, args)
}

/// Parse `text` and instantiate its variables in `bindings`.
///
/// Returns the term and the live variables by name.
pub(crate) fn parse_in(bindings: &mut Bindings, text: &str) -> (Term, Vec<(String, Term)>) {
    let sentence = parse_term(text).unwrap();
    let base = bindings.fresh_block(sentence.var_count);
    let term = bindings.instantiate(&sentence.term, base);
    let vars = sentence
        .var_names
        .iter()
        .map(|(name, index)| (name.clone(), Term::var(base + index)))
        .collect();
    (term, vars)
}

pub(crate) fn engine_with(program: &str) -> Engine {
    let engine = Engine::new();
    engine.consult_str(program).unwrap();
    engine
}

/// Every answer of `query`, each rendered as the value of `var`.
pub(crate) fn answers(engine: &Engine, query: &str, var: &str) -> Vec<String> {
    let mut q = engine.query(query).unwrap();
    let mut out = Vec::new();
    while q.evaluate().unwrap() {
        out.push(q.binding(var).unwrap().to_string());
    }
    out
}

/// Number of times `query` succeeds.
pub(crate) fn count(engine: &Engine, query: &str) -> usize {
    let mut q = engine.query(query).unwrap();
    let mut n = 0;
    while q.evaluate().unwrap() {
        n += 1;
    }
    n
}

pub(crate) fn succeeds(engine: &Engine, query: &str) -> bool {
    engine.query(query).unwrap().evaluate().unwrap()
}

pub(crate) fn first(engine: &Engine, query: &str) -> Query {
    let mut q = engine.query(query).unwrap();
    assert!(q.evaluate().unwrap(), "expected `{}` to succeed", query);
    q
}
