use crate::error::ErrorKind;
use crate::test_utils::{answers, count, engine_with, first, succeeds};

const COLORS: &str = "
    color(red). color(green). color(blue).
    size(small). size(large).
";

#[test]
fn conjunction_enumerates_in_order() {
    let engine = engine_with(COLORS);
    let mut q = engine.query("color(C), size(S)").unwrap();
    let mut seen = Vec::new();
    while q.evaluate().unwrap() {
        seen.push(format!("{}-{}", q.binding("C").unwrap(), q.binding("S").unwrap()));
    }
    assert_eq!(
        seen,
        vec![
            "red-small",
            "red-large",
            "green-small",
            "green-large",
            "blue-small",
            "blue-large"
        ]
    );
}

#[test]
fn conjunction_failure_leaves_no_bindings() {
    let engine = engine_with(COLORS);
    let mut q = engine.query("X = 1, Y = 2, fail").unwrap();
    assert!(!q.evaluate().unwrap());
    assert!(q.binding("X").unwrap().is_var());
    assert!(q.binding("Y").unwrap().is_var());
}

#[test]
fn disjunction_tries_left_then_right() {
    let engine = engine_with(COLORS);
    assert_eq!(answers(&engine, "(X = a ; X = b ; X = c)", "X"), vec!["a", "b", "c"]);
    assert_eq!(answers(&engine, "(fail ; X = right)", "X"), vec!["right"]);
}

#[test]
fn if_then_else_commits_to_first_condition_solution() {
    let engine = engine_with(COLORS);
    assert_eq!(
        answers(&engine, "(color(C) -> X = C ; X = none)", "X"),
        vec!["red"]
    );
    assert_eq!(answers(&engine, "(fail -> X = yes ; X = no)", "X"), vec!["no"]);
    assert_eq!(count(&engine, "(fail -> true)"), 0);
    assert_eq!(
        answers(&engine, "(true -> color(X) ; X = none)", "X"),
        vec!["red", "green", "blue"]
    );
}

#[test]
fn negation_succeeds_without_bindings() {
    let engine = engine_with(COLORS);
    let q = first(&engine, "\\+ color(purple), X = done");
    assert_eq!(q.binding("X").unwrap().to_string(), "done");
    assert!(!succeeds(&engine, "\\+ color(red)"));
    let q = first(&engine, "\\+ \\+ X = bound");
    assert!(q.binding("X").unwrap().is_var());
    assert!(succeeds(&engine, "not(color(purple))"));
}

#[test]
fn cut_prunes_clause_alternatives() {
    let engine = engine_with(
        "
        first_color(C) :- color(C), !.
        classify(X, small) :- X < 10, !.
        classify(_, big).
        ",
    );
    assert_eq!(answers(&engine, "first_color(C)", "C"), vec!["red"]);
    assert_eq!(answers(&engine, "classify(3, S)", "S"), vec!["small"]);
    assert_eq!(answers(&engine, "classify(30, S)", "S"), vec!["big"]);
}

#[test]
fn cut_is_local_to_its_clause() {
    let engine = engine_with(
        "
        color(red). color(green).
        one(C) :- color(C), !.
        both(A, B) :- color(A), one(B).
        ",
    );
    assert_eq!(count(&engine, "both(A, B)"), 2);
}

#[test]
fn cut_inside_call_is_opaque() {
    let engine = engine_with(COLORS);
    assert_eq!(count(&engine, "call((color(C), !)), size(S)"), 2);
    assert_eq!(count(&engine, "color(C), call(!)"), 3);
}

#[test]
fn cut_through_disjunction_cuts_the_clause() {
    let engine = engine_with(
        "
        pick(X) :- ( X = a, ! ; X = b ).
        pick(c).
        ",
    );
    assert_eq!(answers(&engine, "pick(X)", "X"), vec!["a"]);
}

#[test]
fn repeat_with_cut_fails_after_one_evaluate() {
    let engine = engine_with("");
    let mut q = engine.query("repeat, !, fail").unwrap();
    assert!(!q.evaluate().unwrap());
    assert!(!q.could_reevaluation_succeed());
}

#[test]
fn repeat_is_bounded_by_once() {
    let engine = engine_with("");
    assert_eq!(count(&engine, "once(repeat)"), 1);
}

#[test]
fn call_with_extra_arguments() {
    let engine = engine_with("add(X, Y, Z) :- Z is X + Y.");
    assert_eq!(answers(&engine, "call(add(1), 2, Z)", "Z"), vec!["3"]);
    let engine = engine_with(COLORS);
    assert_eq!(answers(&engine, "G = color(X), call(G)", "X"), vec!["red", "green", "blue"]);
    assert_eq!(answers(&engine, "G = color, call(G, X)", "X"), vec!["red", "green", "blue"]);
}

#[test]
fn call_of_unbound_goal_is_an_instantiation_error() {
    let engine = engine_with("");
    let err = engine.query("call(G)").unwrap().evaluate().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Instantiation));
    let err = engine.query("call(1)").unwrap().evaluate().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Type { expected: "callable", .. }));
}

#[test]
fn variable_goal_in_body_is_called() {
    let engine = engine_with("run(G) :- G. twice(G) :- G, G.");
    assert!(succeeds(&engine, "run(true)"));
    assert!(!succeeds(&engine, "run(fail)"));
    assert!(succeeds(&engine, "twice(X = 1)"));
}

#[test]
fn once_and_ignore() {
    let engine = engine_with(COLORS);
    assert_eq!(answers(&engine, "once(color(C))", "C"), vec!["red"]);
    assert_eq!(count(&engine, "ignore(color(purple))"), 1);
    assert_eq!(answers(&engine, "ignore(color(C))", "C"), vec!["red"]);
}

#[test]
fn caret_calls_its_goal() {
    let engine = engine_with(COLORS);
    assert_eq!(count(&engine, "X^color(X)"), 3);
}

#[test]
fn deep_recursion_with_backtracking() {
    let engine = engine_with(
        "
        count_down(0) :- !.
        count_down(N) :- N1 is N - 1, count_down(N1).
        ",
    );
    assert!(succeeds(&engine, "count_down(300)"));
}
