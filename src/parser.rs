//! Operator-precedence reader for Prolog terms and clauses.
//!
//! Syntax follows the standard: names, variables, numbers, quoted atoms,
//! `"text"` as a list of character codes, lists with `|` tails, `{}`
//! terms, and the operators of [`crate::ops`]. Arguments and list
//! elements are read at priority 999; a `|` between terms reads as `;`.

use crate::lexer::{Lexer, Spanned, Token};
use crate::ops::ops;
use crate::symbol::{known, Atom};
use crate::term::{Args, Term};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// One read term with its variables numbered `0..var_count`.
#[derive(Clone, Debug)]
pub struct Sentence {
    pub term: Term,
    /// Named variables (not `_`) in order of first occurrence.
    pub var_names: Vec<(String, u32)>,
    pub var_count: u32,
}

/// Read a single term, with or without a terminating `.`.
pub fn parse_term(text: &str) -> Result<Sentence, ParseError> {
    let mut parser = Parser::new(Lexer::new(text).tokenize()?);
    let term = parser.parse(1200)?;
    if parser.peek() == Some(&Token::End) {
        parser.pos += 1;
    }
    if parser.pos < parser.tokens.len() {
        return Err(parser.error("operator expected"));
    }
    Ok(parser.finish(term))
}

/// Read every `.`-terminated clause of a source text.
pub fn parse_sentences(text: &str) -> Result<Vec<Sentence>, ParseError> {
    let mut parser = Parser::new(Lexer::new(text).tokenize()?);
    let mut sentences = Vec::new();
    while parser.pos < parser.tokens.len() {
        let term = parser.parse(1200)?;
        parser.expect(&Token::End, "end of clause expected")?;
        sentences.push(parser.finish(term));
    }
    Ok(sentences)
}

/// Read the text of an atom as a number, as `atom_number/2` does.
pub fn parse_number(text: &str) -> Option<Term> {
    let tokens = Lexer::new(text.trim()).tokenize().ok()?;
    match tokens.as_slice() {
        [n] => number(&n.token, false),
        [sign, n] if !n.layout_before => match &sign.token {
            Token::Name(s) if s == "-" => number(&n.token, true),
            Token::Name(s) if s == "+" => number(&n.token, false),
            _ => None,
        },
        _ => None,
    }
}

fn number(token: &Token, negate: bool) -> Option<Term> {
    match *token {
        Token::Int(i) if negate => Some(Term::Integer(i.checked_neg()?)),
        Token::Int(i) => Some(Term::Integer(i)),
        Token::Float(f) if negate => Some(Term::Float(-f)),
        Token::Float(f) => Some(Term::Float(f)),
        _ => None,
    }
}

fn codes(text: &str) -> Term {
    Term::list(text.chars().map(|c| Term::Integer(c as i64)).collect::<Vec<_>>())
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    var_names: Vec<(String, u32)>,
    var_count: u32,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            var_names: Vec::new(),
            var_count: 0,
        }
    }

    /// Package a term and start numbering variables afresh.
    fn finish(&mut self, term: Term) -> Sentence {
        let sentence = Sentence {
            term,
            var_names: std::mem::take(&mut self.var_names),
            var_count: self.var_count,
        };
        self.var_count = 0;
        sentence
    }

    fn error(&self, message: &str) -> ParseError {
        match self.tokens.get(self.pos).or(self.tokens.last()) {
            Some(t) => ParseError::new(message, t.line, t.column),
            None => ParseError::new(message, 1, 1),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_spanned(&self, ahead: usize) -> Option<&Spanned> {
        self.tokens.get(self.pos + ahead)
    }

    fn next(&mut self) -> Result<Spanned, ParseError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.peek() == Some(token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn variable(&mut self, name: String) -> Term {
        if name == "_" {
            self.var_count += 1;
            return Term::var(self.var_count - 1);
        }
        if let Some((_, id)) = self.var_names.iter().find(|(n, _)| *n == name) {
            return Term::var(*id);
        }
        let id = self.var_count;
        self.var_count += 1;
        self.var_names.push((name, id));
        Term::var(id)
    }

    /// Can the next token start a term? Used to tell a prefix operator
    /// applied to an operand from the operator used as an atom.
    fn starts_term(&self) -> bool {
        match self.peek() {
            None | Some(Token::End | Token::RParen | Token::RBracket | Token::RBrace) => false,
            Some(Token::Comma | Token::Bar) => false,
            Some(Token::Name(name)) => {
                let followed_by_paren = self
                    .peek_spanned(1)
                    .is_some_and(|t| t.token == Token::LParen && !t.layout_before);
                followed_by_paren
                    || ops().prefix(name).is_some()
                    || (ops().infix(name).is_none() && ops().postfix(name).is_none())
            }
            Some(_) => true,
        }
    }

    /// Read a term of priority at most `max`.
    fn parse(&mut self, max: u32) -> Result<Term, ParseError> {
        let (left, priority) = self.primary(max)?;
        self.operators(left, priority, max)
    }

    fn primary(&mut self, max: u32) -> Result<(Term, u32), ParseError> {
        let token = self.next()?;
        let (line, column) = (token.line, token.column);
        let term = match token.token {
            Token::Int(i) => Term::Integer(i),
            Token::Float(f) => Term::Float(f),
            Token::Var(name) => self.variable(name),
            Token::Str(text) | Token::BackQuoted(text) => codes(&text),
            Token::LParen => {
                let inner = self.parse(1200)?;
                self.expect(&Token::RParen, "')' expected")?;
                inner
            }
            Token::LBracket => {
                if self.peek() == Some(&Token::RBracket) {
                    self.pos += 1;
                    return self.name_term("[]".to_string(), max);
                }
                self.list()?
            }
            Token::LBrace => {
                if self.peek() == Some(&Token::RBrace) {
                    self.pos += 1;
                    return self.name_term("{}".to_string(), max);
                }
                let inner = self.parse(1200)?;
                self.expect(&Token::RBrace, "'}' expected")?;
                Term::compound(known().curly, [inner])
            }
            Token::Name(name) => {
                if name == "-" || name == "+" {
                    if let Some(next) = self.peek_spanned(0).filter(|t| !t.layout_before) {
                        if let Some(n) = number(&next.token, name == "-") {
                            self.pos += 1;
                            return Ok((n, 0));
                        }
                    }
                }
                return self.name_term(name, max);
            }
            Token::Quoted(name) => return self.name_term(name, max),
            Token::End => return Err(ParseError::new("unexpected end of clause", line, column)),
            _ => return Err(ParseError::new("term expected", line, column)),
        };
        Ok((term, 0))
    }

    /// A name: functional notation, a prefix operator application, or an atom.
    fn name_term(&mut self, name: String, max: u32) -> Result<(Term, u32), ParseError> {
        let functional = self
            .peek_spanned(0)
            .is_some_and(|t| t.token == Token::LParen && !t.layout_before);
        if functional {
            self.pos += 1;
            let args = self.arguments(&Token::RParen, "')' expected")?;
            return Ok((Term::compound(Atom::new(&name), args), 0));
        }

        let atom = if name == "[]" {
            Term::EmptyList
        } else {
            Term::atom(&name)
        };
        if let Some(op) = ops().prefix(&name) {
            if self.starts_term() {
                let (priority, arg_max) = if op.priority > max {
                    (999, 999)
                } else {
                    (op.priority, op.right_max())
                };
                let arg = self.parse(arg_max)?;
                return Ok((Term::compound(Atom::new(&name), [arg]), priority));
            }
        }
        Ok((atom, 0))
    }

    /// Comma-separated arguments at priority 999 up to `close`.
    fn arguments(&mut self, close: &Token, message: &str) -> Result<Args, ParseError> {
        let mut args = Args::new();
        loop {
            args.push(self.parse(999)?);
            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                continue;
            }
            self.expect(close, message)?;
            return Ok(args);
        }
    }

    /// List items after `[`, through the closing `]`.
    fn list(&mut self) -> Result<Term, ParseError> {
        let mut items = Vec::new();
        loop {
            items.push(self.parse(999)?);
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::Bar) => {
                    self.pos += 1;
                    let tail = self.parse(999)?;
                    self.expect(&Token::RBracket, "']' expected")?;
                    return Ok(Term::list_with_tail(items, tail));
                }
                _ => {
                    self.expect(&Token::RBracket, "']' expected")?;
                    return Ok(Term::list(items));
                }
            }
        }
    }

    /// Fold infix and postfix operators onto `left`.
    fn operators(&mut self, mut left: Term, mut left_priority: u32, max: u32) -> Result<Term, ParseError> {
        loop {
            let name = match self.peek() {
                Some(Token::Name(name)) | Some(Token::Quoted(name)) => name.clone(),
                Some(Token::Comma) => ",".to_string(),
                Some(Token::Bar) => "|".to_string(),
                _ => return Ok(left),
            };
            if let Some(op) = ops().infix(&name) {
                if op.priority <= max && left_priority <= op.left_max() {
                    self.pos += 1;
                    let right = self.parse(op.right_max())?;
                    let functor = if name == "|" {
                        known().semicolon
                    } else {
                        Atom::new(&name)
                    };
                    left = Term::compound(functor, [left, right]);
                    left_priority = op.priority;
                    continue;
                }
            }
            if let Some(op) = ops().postfix(&name) {
                if op.priority <= max && left_priority <= op.left_max() {
                    self.pos += 1;
                    left = Term::compound(Atom::new(&name), [left]);
                    left_priority = op.priority;
                    continue;
                }
            }
            return Ok(left);
        }
    }
}

#[cfg(test)]
#[path = "tests/parser.rs"]
mod tests;
