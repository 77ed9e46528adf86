//! Domain errors raised while resolving goals.
//!
//! Ordinary failure is not an error: it is `Ok(false)` from an evaluator.
//! Everything here aborts the current query and carries the chain of
//! clauses that were active when it was raised.

use crate::parser::ParseError;
use crate::term::{PredicateKey, Term};
use std::fmt;

#[derive(Debug)]
pub enum ErrorKind {
    /// An argument was unbound where a value is required.
    Instantiation,
    /// An argument had the wrong type, e.g. an atom where a number is needed.
    Type { expected: &'static str, culprit: Term },
    /// An argument had the right type but an unacceptable value.
    Domain { expected: &'static str, culprit: Term },
    /// Arithmetic failed: zero divisor, overflow, undefined result.
    Evaluation(&'static str),
    /// A call to a predicate that was never defined.
    UnknownPredicate(PredicateKey),
    /// A query was asked for a variable it does not contain.
    UnknownVariable(String),
    /// An attempt to change a built-in predicate.
    Permission {
        action: &'static str,
        key: PredicateKey,
    },
    Syntax(ParseError),
    Io(std::io::Error),
}

/// One active clause at the point an error was raised.
#[derive(Debug, Clone)]
pub struct Frame {
    pub key: PredicateKey,
    pub clause: Term,
}

#[derive(Debug)]
pub struct PrologError {
    kind: ErrorKind,
    frames: Vec<Frame>,
}

impl PrologError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            frames: Vec::new(),
        }
    }

    pub fn instantiation() -> Self {
        Self::new(ErrorKind::Instantiation)
    }

    pub fn type_error(expected: &'static str, culprit: Term) -> Self {
        Self::new(ErrorKind::Type { expected, culprit })
    }

    pub fn domain_error(expected: &'static str, culprit: Term) -> Self {
        Self::new(ErrorKind::Domain { expected, culprit })
    }

    pub fn evaluation(what: &'static str) -> Self {
        Self::new(ErrorKind::Evaluation(what))
    }

    pub fn unknown_predicate(key: PredicateKey) -> Self {
        Self::new(ErrorKind::UnknownPredicate(key))
    }

    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownVariable(name.into()))
    }

    pub fn permission(action: &'static str, key: PredicateKey) -> Self {
        Self::new(ErrorKind::Permission { action, key })
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Active clauses, innermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Record that the error crossed the boundary of `clause` of `key`.
    pub fn in_clause(mut self, key: PredicateKey, clause: Term) -> Self {
        self.frames.push(Frame { key, clause });
        self
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Instantiation => write!(f, "instantiation error: argument is not sufficiently bound"),
            ErrorKind::Type { expected, culprit } => write!(
                f,
                "type error: expected {} but got {} `{}`",
                expected,
                culprit.type_name(),
                culprit
            ),
            ErrorKind::Domain { expected, culprit } => write!(
                f,
                "domain error: expected {} but got {} `{}`",
                expected,
                culprit.type_name(),
                culprit
            ),
            ErrorKind::Evaluation(what) => write!(f, "evaluation error: {}", what),
            ErrorKind::UnknownPredicate(key) => write!(f, "unknown predicate: {}", key),
            ErrorKind::UnknownVariable(name) => write!(f, "unknown variable: {}", name),
            ErrorKind::Permission { action, key } => {
                write!(f, "permission error: cannot {} built-in {}", action, key)
            }
            ErrorKind::Syntax(e) => write!(f, "syntax error: {}", e),
            ErrorKind::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl fmt::Display for PrologError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for frame in &self.frames {
            write!(f, "\n  in {}: {}", frame.key, frame.clause)?;
        }
        Ok(())
    }
}

impl std::error::Error for PrologError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(e) => Some(e),
            ErrorKind::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for PrologError {
    fn from(e: ParseError) -> Self {
        Self::new(ErrorKind::Syntax(e))
    }
}

impl From<std::io::Error> for PrologError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn type_error_names_culprit_type_and_value() {
        let e = PrologError::type_error("evaluable", Term::atom("foo"));
        assert_eq!(
            e.to_string(),
            "type error: expected evaluable but got atom `foo`"
        );
    }

    #[test]
    fn frames_render_innermost_first() {
        let e = PrologError::instantiation()
            .in_clause(PredicateKey::of("inner", 0), Term::atom("inner"))
            .in_clause(PredicateKey::of("outer", 0), Term::atom("outer"));
        let text = e.to_string();
        let inner = text.find("in inner/0").unwrap();
        let outer = text.find("in outer/0").unwrap();
        assert!(inner < outer);
        assert_eq!(e.frames().len(), 2);
    }

    #[test]
    fn io_error_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pl");
        let e = PrologError::from(io);
        assert!(e.source().is_some());
        assert!(e.to_string().contains("missing.pl"));
    }
}
