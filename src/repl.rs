//! Line-oriented command processor behind the `backlog` binary.
//!
//! Supports:
//! - `?- Goal.` or a bare goal to run a query and show its first answer
//! - `next` / `more <n>` to show further answers of the active query
//! - `add <clause>.` to append a clause, `consult <file>` to load a file
//! - `list`, `reset`, `help`, `quit`/`exit`
//! - `stats` for the metrics of the last query (with the `tracing` feature)

use crate::api::{Engine, EngineConfig, Query};
use crate::format::to_text;
use crate::metrics::MetricsReport;
use crate::parser::parse_term;
use std::io::{self, BufRead, Write};

/// REPL state.
pub struct Repl {
    engine: Engine,
    active: Option<Query>,
    active_answer_count: usize,
    last_metrics: Option<MetricsReport>,
}

impl Repl {
    pub fn new() -> Self {
        Self::with_engine(Engine::new())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_engine(Engine::with_config(config))
    }

    pub fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            active: None,
            active_answer_count: 0,
            last_metrics: None,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Read commands until `quit` or end of input, prompting with `?- `.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> io::Result<()> {
        writeln!(output, "backlog - type 'help' for commands, 'quit' to exit.")?;
        loop {
            write!(output, "?- ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(());
            }

            match self.process_input(&line) {
                Ok(Some(text)) => writeln!(output, "{}", text.trim_end())?,
                Ok(None) => {}
                Err(e) if e == "quit" => return Ok(()),
                Err(e) => writeln!(output, "Error: {e}")?,
            }
        }
    }

    /// Process a single command line.
    ///
    /// `Err("quit")` asks the caller to stop; other errors are messages
    /// for the user.
    pub fn process_input(&mut self, input: &str) -> Result<Option<String>, String> {
        let line = input.trim();

        if line.is_empty() || line.starts_with('%') {
            return Ok(None);
        }

        match line {
            "help" => return Ok(Some(help_text().to_string())),
            "quit" | "exit" | "halt." | "halt" => return Err("quit".to_string()),
            "list" => return Ok(Some(self.list_predicates())),
            "next" => return self.next_answers(1),
            "stats" => return Ok(Some(self.stats())),
            "reset" => {
                self.finish_active_query();
                return Ok(Some("Query reset.".to_string()));
            }
            _ => {}
        }

        if let Some(rest) = line
            .strip_prefix("more")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            let rest = rest.trim();
            let count = if rest.is_empty() {
                self.engine.config().max_answers
            } else {
                rest.parse()
                    .map_err(|_| "Invalid count for 'more'. Usage: more <n>".to_string())?
            };
            if count == 0 {
                return Err("Count for 'more' must be > 0".to_string());
            }
            return self.next_answers(count);
        }

        if let Some(path) = line.strip_prefix("consult ") {
            self.finish_active_query();
            let path = path.trim().trim_end_matches('.').trim_matches('\'');
            self.engine
                .consult_file(path)
                .map_err(|e| format!("Failed to consult '{path}': {e}"))?;
            return Ok(Some(format!("Consulted '{path}'.")));
        }

        if let Some(clause) = line.strip_prefix("add ") {
            self.finish_active_query();
            let sentence = parse_term(clause).map_err(|e| e.to_string())?;
            self.engine
                .kb()
                .add_clause(&sentence.term, sentence.var_count, false)
                .map_err(|e| e.to_string())?;
            return Ok(Some(format!("Added {}.", sentence.term)));
        }

        let goal = line.strip_prefix("?-").unwrap_or(line).trim();
        self.run_query(goal)
    }

    fn list_predicates(&self) -> String {
        let tables = self.engine.kb().user_predicates();
        if tables.is_empty() {
            return "No predicates defined.".to_string();
        }
        let mut out = String::new();
        for table in tables {
            out.push_str(&format!("% {}\n", table.key()));
            for clause in table.snapshot().iter() {
                out.push_str(&to_text(&clause.to_term(), true));
                out.push_str(".\n");
            }
        }
        out
    }

    fn stats(&self) -> String {
        if !cfg!(feature = "tracing") {
            return "Metrics are only collected when built with the 'tracing' feature.".to_string();
        }
        match (&self.active, &self.last_metrics) {
            (Some(query), _) => query.metrics().to_string(),
            (None, Some(report)) => report.to_string(),
            (None, None) => "No query has run yet.".to_string(),
        }
    }

    fn run_query(&mut self, goal: &str) -> Result<Option<String>, String> {
        self.finish_active_query();
        let query = self.engine.query(goal).map_err(|e| e.to_string())?;
        self.active = Some(query);
        self.next_answers(1)
    }

    fn next_answers(&mut self, count: usize) -> Result<Option<String>, String> {
        let Some(query) = self.active.as_mut() else {
            return Ok(Some("No active query. Run a query first.".to_string()));
        };

        let mut output = String::new();
        let mut exhausted = false;
        for _ in 0..count {
            match query.next_answer() {
                Ok(Some(answer)) => {
                    self.active_answer_count += 1;
                    output.push_str(&format!("{}. {}\n", self.active_answer_count, answer));
                }
                Ok(None) => {
                    exhausted = true;
                    break;
                }
                Err(e) => {
                    self.finish_active_query();
                    return Err(e.to_string());
                }
            }
        }
        if !exhausted && !query.could_reevaluation_succeed() {
            exhausted = true;
        }

        if exhausted {
            let first = self.active_answer_count == 0;
            self.finish_active_query();
            if first {
                return Ok(Some("false.".to_string()));
            }
            output.push_str("No more answers.\n");
        } else {
            output.push_str("Type 'next' for more answers.\n");
        }
        Ok(Some(output))
    }

    fn finish_active_query(&mut self) {
        if let Some(query) = self.active.take() {
            self.last_metrics = Some(query.metrics());
        }
        self.active_answer_count = 0;
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn help_text() -> &'static str {
    r#"backlog - a Prolog interpreter

Commands:
  ?- <goal>.       Run a query and show its first answer (the ?- is optional)
  next             Show the next answer of the active query
  more [n]         Show the next n answers of the active query
  reset            Drop the active query
  add <clause>.    Append a clause to the database
  consult <file>   Load clauses and run directives from a file
  list             List user-defined predicates
  stats            Resolution metrics of the last query
  help             Show this help
  quit/exit        Leave
"#
}

#[cfg(test)]
#[path = "tests/repl.rs"]
mod tests;
