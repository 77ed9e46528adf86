//! Writing terms as text.
//!
//! Operators are written in operator form, with parentheses only where
//! priorities require them. Quoted output (`writeq/1`, `Display`) quotes
//! atoms that would not read back as themselves; unbound variables print
//! as `_G<n>`.

use crate::ops::{ops, OpDef};
use crate::term::Term;
use std::fmt::{self, Write};

/// Text of a float that reads back as a float: always has a `.` or an
/// exponent.
pub fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return if f.is_nan() {
            "nan".to_string()
        } else if f > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }
    let magnitude = f.abs();
    let text = if magnitude != 0.0 && !(1e-4..1e15).contains(&magnitude) {
        format!("{f:e}")
    } else {
        format!("{f}")
    };
    match text.find('e') {
        Some(e) if !text[..e].contains('.') => format!("{}.0{}", &text[..e], &text[e..]),
        None if !text.contains('.') => format!("{text}.0"),
        _ => text,
    }
}

/// Does `name` read back as the same atom without quotes?
fn is_plain_atom(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => false,
        Some(c) if c.is_lowercase() => chars.all(|c| c.is_alphanumeric() || c == '_'),
        Some(_) if matches!(name, "[]" | "!" | ";" | "{}") => true,
        Some(_) => name.chars().all(|c| "+-*/\\^<>=~:.?@#&$".contains(c)),
    }
}

fn quote_atom(name: &str, out: &mut String) {
    out.push('\'');
    for c in name.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

fn is_symbolic(c: char) -> bool {
    "+-*/\\^<>=~:.?@#&$".contains(c)
}

struct Writer {
    quoted: bool,
    out: String,
}

impl Writer {
    fn atom(&mut self, name: &str) {
        if self.quoted && !is_plain_atom(name) {
            quote_atom(name, &mut self.out);
        } else {
            self.out.push_str(name);
        }
    }

    /// Append `text` after a space if it would otherwise glue onto what
    /// was written before and read back as one token.
    fn separate(&mut self, next: &str) {
        let (Some(prev), Some(first)) = (self.out.chars().last(), next.chars().next()) else {
            return;
        };
        let glue = (is_symbolic(prev) && is_symbolic(first))
            || (prev.is_alphanumeric() && (first.is_alphanumeric() || first == '_'));
        if glue {
            self.out.push(' ');
        }
    }

    fn render(&self, term: &Term, max: u32) -> String {
        let mut sub = Writer {
            quoted: self.quoted,
            out: String::new(),
        };
        sub.write(term, max);
        sub.out
    }

    fn write(&mut self, term: &Term, max: u32) {
        match term {
            Term::Var(v) => {
                let _ = write!(self.out, "_G{}", v.0);
            }
            Term::Integer(i) => {
                let _ = write!(self.out, "{i}");
            }
            Term::Float(f) => self.out.push_str(&format_float(*f)),
            Term::Atom(a) => {
                let name = a.name();
                let priority = ops().infix(name).or(ops().prefix(name)).map_or(0, |op| op.priority);
                let parens = self.open(priority, max);
                self.atom(name);
                self.close(parens);
            }
            Term::EmptyList => self.out.push_str("[]"),
            Term::List(_) => self.list(term),
            Term::Struct(s) => {
                let name = s.name().name();
                match s.args() {
                    [arg] if name == "{}" => {
                        self.out.push('{');
                        self.write(arg, 1200);
                        self.out.push('}');
                    }
                    [left, right] => match ops().infix(name) {
                        Some(op) => self.infix(name, op, left, right, max),
                        None => self.canonical(name, s.args()),
                    },
                    [arg] => match (ops().prefix(name), ops().postfix(name)) {
                        (Some(op), _) => self.prefix(name, op, arg, max),
                        (None, Some(op)) => self.postfix(name, op, arg, max),
                        _ => self.canonical(name, s.args()),
                    },
                    args => self.canonical(name, args),
                }
            }
        }
    }

    fn canonical(&mut self, name: &str, args: &[Term]) {
        self.atom(name);
        self.out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write(arg, 999);
        }
        self.out.push(')');
    }

    fn list(&mut self, term: &Term) {
        self.out.push('[');
        let mut current = term;
        let mut first = true;
        while let Term::List(cell) = current {
            if !first {
                self.out.push(',');
            }
            first = false;
            self.write(cell.head(), 999);
            current = cell.tail();
        }
        if !matches!(current, Term::EmptyList) {
            self.out.push('|');
            self.write(current, 999);
        }
        self.out.push(']');
    }

    fn open(&mut self, priority: u32, max: u32) -> bool {
        let parens = priority > max;
        if parens {
            self.out.push('(');
        }
        parens
    }

    fn close(&mut self, parens: bool) {
        if parens {
            self.out.push(')');
        }
    }

    fn infix(&mut self, name: &str, op: OpDef, left: &Term, right: &Term, max: u32) {
        let parens = self.open(op.priority, max);
        self.write(left, op.left_max());
        let mut symbol = String::new();
        if self.quoted && !is_plain_atom(name) && name != "," && name != "|" {
            quote_atom(name, &mut symbol);
        } else {
            symbol.push_str(name);
        }
        if name == "," {
            self.out.push(',');
        } else if symbol.starts_with(|c: char| c.is_alphabetic()) || name == "->" || name == ":-" {
            self.out.push(' ');
            self.out.push_str(&symbol);
            self.out.push(' ');
        } else {
            self.separate(&symbol);
            self.out.push_str(&symbol);
        }
        let rendered = self.render(right, op.right_max());
        self.separate(&rendered);
        self.out.push_str(&rendered);
        self.close(parens);
    }

    fn prefix(&mut self, name: &str, op: OpDef, arg: &Term, max: u32) {
        let parens = self.open(op.priority, max);
        self.atom(name);
        let rendered = self.render(arg, op.right_max());
        let numeric = matches!(arg, Term::Integer(_) | Term::Float(_));
        if numeric || rendered.starts_with('(') || name.starts_with(|c: char| c.is_alphabetic()) {
            self.out.push(' ');
        } else {
            self.separate(&rendered);
        }
        self.out.push_str(&rendered);
        self.close(parens);
    }

    fn postfix(&mut self, name: &str, op: OpDef, arg: &Term, max: u32) {
        let parens = self.open(op.priority, max);
        self.write(arg, op.left_max());
        self.separate(name);
        self.atom(name);
        self.close(parens);
    }
}

/// Text of `term`, quoted as `writeq/1` does or plain as `write/1` does.
pub fn to_text(term: &Term, quoted: bool) -> String {
    let mut writer = Writer {
        quoted,
        out: String::new(),
    };
    writer.write(term, 1200);
    writer.out
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_text(self, true))
    }
}
