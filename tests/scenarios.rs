//! End-to-end scenarios through the public API.

use backlog::{Engine, EngineConfig, ErrorKind, Query};

fn engine(program: &str) -> Engine {
    let engine = Engine::new();
    engine.consult_str(program).unwrap();
    engine
}

fn collect(query: &mut Query, var: &str) -> Vec<String> {
    let mut out = Vec::new();
    while query.evaluate().unwrap() {
        out.push(query.binding(var).unwrap().to_string());
    }
    out
}

#[test]
fn facts_enumerate_in_clause_order() {
    let engine = engine("test(a). test(b). test(c).");
    let mut q = engine.query("test(X)").unwrap();
    assert_eq!(collect(&mut q, "X"), vec!["a", "b", "c"]);
    assert!(!q.could_reevaluation_succeed());
    assert!(!q.evaluate().unwrap());
}

#[test]
fn failed_query_leaves_variables_unbound() {
    let engine = engine("");
    let mut q = engine.query("X = 1, Y = 2, fail").unwrap();
    assert!(!q.evaluate().unwrap());
    assert!(q.binding("X").unwrap().is_var());
    assert!(q.binding("Y").unwrap().is_var());
}

#[test]
fn repeat_cut_fail_terminates() {
    let engine = engine("");
    let mut q = engine.query("repeat, !, fail").unwrap();
    assert!(!q.evaluate().unwrap());
    assert!(!q.could_reevaluation_succeed());
}

#[test]
fn cut_commits_to_first_clause() {
    let engine = engine(
        "
        max(X, Y, X) :- X >= Y, !.
        max(_, Y, Y).
        ",
    );
    let mut q = engine.query("max(3, 7, M)").unwrap();
    assert_eq!(collect(&mut q, "M"), vec!["7"]);
    let mut q = engine.query("max(9, 7, M)").unwrap();
    assert_eq!(collect(&mut q, "M"), vec!["9"]);
}

#[test]
fn aggregation_edge_cases() {
    let engine = engine("");
    let mut q = engine.query("findall(X, fail, L)").unwrap();
    assert_eq!(collect(&mut q, "L"), vec!["[]"]);
    assert!(!engine.query("bagof(X, fail, L)").unwrap().evaluate().unwrap());
    assert!(!engine.query("setof(X, fail, L)").unwrap().evaluate().unwrap());
    let mut q = engine.query("setof(X, member(X, [3, 1, 2, 1]), L)").unwrap();
    assert_eq!(collect(&mut q, "L"), vec!["[1,2,3]"]);
}

#[test]
fn recursive_program() {
    let engine = engine(
        "
        nat(0).
        nat(s(N)) :- nat(N).

        plus(0, Y, Y).
        plus(s(X), Y, s(Z)) :- plus(X, Y, Z).

        fib(0, 0).
        fib(1, 1).
        fib(N, F) :- N > 1, A is N - 1, B is N - 2, fib(A, FA), fib(B, FB), F is FA + FB.
        ",
    );
    let mut q = engine.query("plus(X, Y, s(s(0)))").unwrap();
    let mut splits = 0;
    while q.evaluate().unwrap() {
        splits += 1;
    }
    assert_eq!(splits, 3);

    let mut q = engine.query("fib(15, F)").unwrap();
    assert!(q.evaluate().unwrap());
    assert_eq!(q.binding("F").unwrap().to_string(), "610");

    let mut q = engine.query("nat(N), N = s(s(s(_))), !").unwrap();
    assert!(q.evaluate().unwrap());
    assert!(q.binding("N").unwrap().to_string().starts_with("s(s(s("));
}

#[test]
fn deep_recursion_runs_on_an_ordinary_thread() {
    let engine = engine(
        "
        count(0) :- !.
        count(N) :- N1 is N - 1, count(N1).

        len([], 0).
        len([_|T], N) :- len(T, M), N is M + 1.
        ",
    );
    assert!(engine.query("count(20000)").unwrap().evaluate().unwrap());

    let mut q = engine
        .query("length(L, 3000), append(L, [end], R), len(R, N)")
        .unwrap();
    assert!(q.evaluate().unwrap());
    assert_eq!(q.binding("N").unwrap().to_string(), "3001");
}

#[test]
fn failure_driven_loops_run_in_bounded_memory() {
    let engine = engine("p(X) :- Y = f(X, A, B, C), Y = f(_, A, B, C).");
    let arena_after = |n: u32| {
        let mut q = engine
            .query(&format!("between(1, {n}, X), p(X), fail"))
            .unwrap();
        assert!(!q.evaluate().unwrap());
        q.arena_len()
    };
    assert_eq!(arena_after(10), arena_after(10_000));
}

#[test]
fn collected_answers_keep_their_own_variables() {
    let engine = engine("gen(_). gen(f(_)). gen(g(X, X)).");
    let mut q = engine
        .query("findall(T, gen(T), [A, f(B), g(C, D)]), A \\== B, B \\== C, C == D")
        .unwrap();
    assert!(q.evaluate().unwrap());

    let mut q = engine
        .query("bagof(T, gen(T), L), L = [1, f(P), g(Q, R)], P \\== Q, Q == R")
        .unwrap();
    assert!(q.evaluate().unwrap());
}

#[test]
fn cyclic_bindings_stay_usable() {
    let engine = engine("");
    let mut q = engine.query("X = f(X), Y = X").unwrap();
    assert!(q.evaluate().unwrap());
    assert!(q.binding("Y").unwrap().to_string().starts_with("f("));

    let mut q = engine.query("L = [a|L], M = L, M = [H|_]").unwrap();
    assert!(q.evaluate().unwrap());
    assert_eq!(q.binding("H").unwrap().to_string(), "a");
}

#[test]
fn float_first_arguments_match_across_signed_zero() {
    let engine = engine("zero(0.0, pos). zero(-1.0, neg).");
    let mut q = engine.query("zero(-0.0, S)").unwrap();
    assert_eq!(collect(&mut q, "S"), vec!["pos"]);
}

#[test]
fn errors_report_the_active_clause() {
    let engine = engine("half(X, Y) :- Y is X / 0.");
    let err = engine.query("half(4, Y)").unwrap().evaluate().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Evaluation("zero_divisor")));
    assert!(err.to_string().contains("in half/2"), "{err}");
}

#[test]
fn unknown_predicates_can_fail_quietly() {
    let config = EngineConfig::default().with_unknown(backlog::kb::Unknown::Fail);
    let engine = Engine::with_config(config);
    assert!(!engine.query("nothing_here").unwrap().evaluate().unwrap());
    let engine = Engine::new();
    let err = engine.query("nothing_here").unwrap().evaluate().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnknownPredicate(_)));
}

#[test]
fn consult_runs_directives_and_reports_syntax_errors() {
    let engine = engine(":- dynamic(log/1).\n:- assertz(log(loaded)).");
    let mut q = engine.query("log(X)").unwrap();
    assert_eq!(collect(&mut q, "X"), vec!["loaded"]);

    let err = engine.consult_str("ok(1).\nbroken(.\n").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Syntax(_)));
}

#[test]
fn answers_hide_underscore_variables() {
    let engine = engine("pair(1, 2).");
    let mut q = engine.query("pair(X, _Y)").unwrap();
    let answer = q.next_answer().unwrap().unwrap();
    assert_eq!(answer.to_string(), "X = 1");
}
