use super::*;
use std::io::Cursor;

fn repl_with(program: &str) -> Repl {
    let repl = Repl::new();
    repl.engine().consult_str(program).unwrap();
    repl
}

fn run(repl: &mut Repl, line: &str) -> String {
    repl.process_input(line).unwrap().unwrap_or_default()
}

#[test]
fn blank_lines_and_comments_are_ignored() {
    let mut repl = Repl::new();
    assert_eq!(repl.process_input("   ").unwrap(), None);
    assert_eq!(repl.process_input("% note").unwrap(), None);
}

#[test]
fn query_shows_first_answer_then_next() {
    let mut repl = repl_with("color(red). color(green).");
    let out = run(&mut repl, "?- color(X).");
    assert!(out.contains("1. X = red"), "{out}");
    assert!(out.contains("Type 'next' for more answers."), "{out}");

    let out = run(&mut repl, "next");
    assert!(out.contains("2. X = green"), "{out}");

    let out = run(&mut repl, "next");
    assert!(
        out.contains("No more answers.") || out.contains("No active query"),
        "{out}"
    );
}

#[test]
fn query_prefix_is_optional() {
    let mut repl = repl_with("p(1).");
    let out = run(&mut repl, "p(X)");
    assert!(out.starts_with("1. X = 1"), "{out}");
}

#[test]
fn failing_query_prints_false() {
    let mut repl = repl_with("p(1).");
    assert_eq!(run(&mut repl, "p(2)."), "false.");
    assert_eq!(run(&mut repl, "fail."), "false.");
}

#[test]
fn ground_query_prints_true() {
    let mut repl = repl_with("p(1).");
    let out = run(&mut repl, "p(1).");
    assert!(out.starts_with("1. true"), "{out}");
}

#[test]
fn more_shows_several_answers() {
    let mut repl = Repl::new();
    run(&mut repl, "between(1, 10, X).");
    let out = run(&mut repl, "more 3");
    assert!(out.contains("2. X = 2"), "{out}");
    assert!(out.contains("4. X = 4"), "{out}");
    assert!(!out.contains("5. X = 5"), "{out}");

    let out = run(&mut repl, "more");
    assert!(out.contains("10. X = 10"), "{out}");
    assert!(out.contains("No more answers."), "{out}");
}

#[test]
fn more_rejects_bad_counts() {
    let mut repl = Repl::new();
    assert!(repl.process_input("more abc").is_err());
    assert!(repl.process_input("more 0").is_err());
}

#[test]
fn add_then_query_and_list() {
    let mut repl = Repl::with_config(EngineConfig::default().with_library(false));
    assert_eq!(run(&mut repl, "list"), "No predicates defined.");
    let out = run(&mut repl, "add likes(mary, wine).");
    assert_eq!(out, "Added likes(mary,wine).");
    run(&mut repl, "add likes(john, X) :- likes(mary, X).");

    let out = run(&mut repl, "likes(john, W).");
    assert!(out.contains("W = wine"), "{out}");

    let listing = run(&mut repl, "list");
    assert!(listing.contains("% likes/2"), "{listing}");
    assert!(listing.contains("likes(mary,wine)."), "{listing}");
    assert!(listing.contains(":-"), "{listing}");
}

#[test]
fn add_reports_syntax_errors() {
    let mut repl = Repl::new();
    let err = repl.process_input("add foo(.").unwrap_err();
    assert!(err.contains("syntax error"), "{err}");
}

#[test]
fn query_errors_are_reported_and_clear_the_query() {
    let mut repl = Repl::new();
    let err = repl.process_input("X is foo + 1.").unwrap_err();
    assert!(err.contains("type error"), "{err}");
    assert!(run(&mut repl, "next").contains("No active query"));

    let err = repl.process_input("undefined_pred(1).").unwrap_err();
    assert!(err.contains("unknown predicate"), "{err}");
}

#[test]
fn reset_drops_the_active_query() {
    let mut repl = Repl::new();
    run(&mut repl, "member(X, [a, b, c]).");
    assert_eq!(run(&mut repl, "reset"), "Query reset.");
    assert!(run(&mut repl, "next").contains("No active query"));
}

#[test]
fn consult_missing_file_is_an_error() {
    let mut repl = Repl::new();
    let err = repl
        .process_input("consult /nonexistent/backlog/missing.pl")
        .unwrap_err();
    assert!(err.starts_with("Failed to consult"), "{err}");
}

#[test]
fn consult_loads_a_file() {
    let path = std::env::temp_dir().join(format!("backlog-repl-{}.pl", std::process::id()));
    std::fs::write(&path, "greeting(hello).\n:- dynamic(seen/1).\n").unwrap();
    let mut repl = Repl::new();
    let out = run(&mut repl, &format!("consult {}", path.display()));
    assert!(out.starts_with("Consulted"), "{out}");
    assert!(run(&mut repl, "greeting(G).").contains("G = hello"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn quit_commands_stop_the_loop() {
    let mut repl = Repl::new();
    for command in ["quit", "exit", "halt", "halt."] {
        assert_eq!(repl.process_input(command).unwrap_err(), "quit");
    }
}

#[test]
fn help_lists_commands() {
    let mut repl = Repl::new();
    let help = run(&mut repl, "help");
    assert!(help.contains("next"));
    assert!(help.contains("consult"));
}

#[test]
fn run_drives_a_session() {
    let mut repl = repl_with("p(1). p(2).");
    let mut input = Cursor::new("p(X).\nnext\nbad(\nquit\n");
    let mut output = Vec::new();
    repl.run(&mut input, &mut output).unwrap();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("1. X = 1"), "{text}");
    assert!(text.contains("2. X = 2"), "{text}");
    assert!(text.contains("Error: syntax error"), "{text}");
    assert!(text.matches("?- ").count() >= 4, "{text}");
}

#[test]
fn run_stops_at_end_of_input() {
    let mut repl = Repl::new();
    let mut input = Cursor::new("true.\n");
    let mut output = Vec::new();
    repl.run(&mut input, &mut output).unwrap();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("1. true"), "{text}");
}
