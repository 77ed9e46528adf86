//! Term output: `write/1`, `print/1`, `writeq/1`, `writeln/1` and `nl/0`.

use super::det;
use crate::error::PrologError;
use crate::format::to_text;
use crate::kb::KnowledgeBase;
use crate::machine::Machine;
use crate::term::Term;
use std::io::Write;

pub(super) fn register(kb: &KnowledgeBase) {
    det(kb, "write", 1, |a, m| emit(m, &a[0], false, ""));
    det(kb, "print", 1, |a, m| emit(m, &a[0], false, ""));
    det(kb, "writeq", 1, |a, m| emit(m, &a[0], true, ""));
    det(kb, "writeln", 1, |a, m| emit(m, &a[0], false, "\n"));
    det(kb, "nl", 0, |_, m| put(m, "\n"));
}

fn emit(m: &mut Machine, term: &Term, quoted: bool, suffix: &str) -> Result<bool, PrologError> {
    let mut text = to_text(&m.resolve(term), quoted);
    text.push_str(suffix);
    put(m, &text)
}

fn put(m: &mut Machine, text: &str) -> Result<bool, PrologError> {
    let mut out = m.output().lock();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(true)
}
