use crate::test_utils::{answers, count, engine_with, first, succeeds};

const FAMILY: &str = "
    age(peter, 7).
    age(ann, 11).
    age(pat, 8).
    age(tom, 5).
    age(mike, 11).

    parent(tom, bob).
    parent(tom, liz).
    parent(bob, ann).
    parent(bob, pat).
    parent(pat, jim).
";

#[test]
fn findall_collects_in_order() {
    let engine = engine_with(FAMILY);
    assert_eq!(
        answers(&engine, "findall(N, age(N, _), L)", "L"),
        vec!["[peter,ann,pat,tom,mike]"]
    );
}

#[test]
fn findall_of_no_solutions_is_empty() {
    let engine = engine_with(FAMILY);
    assert_eq!(answers(&engine, "findall(X, age(X, 99), L)", "L"), vec!["[]"]);
}

#[test]
fn findall_copies_unbound_template_variables() {
    let engine = engine_with("p(_). p(_).");
    let q = first(&engine, "findall(X, p(X), [A, B])");
    let a = q.binding("A").unwrap();
    let b = q.binding("B").unwrap();
    assert!(a.is_var() && b.is_var());
    assert_ne!(a, b);
}

#[test]
fn findall_with_tail() {
    let engine = engine_with(FAMILY);
    assert_eq!(
        answers(&engine, "findall(C, parent(bob, C), L, [end])", "L"),
        vec!["[ann,pat,end]"]
    );
}

#[test]
fn findall_does_not_bind_goal_variables() {
    let engine = engine_with(FAMILY);
    let q = first(&engine, "findall(C, parent(P, C), L)");
    assert!(q.binding("P").unwrap().is_var());
    assert!(q.binding("C").unwrap().is_var());
}

#[test]
fn findall_result_mismatch_fails() {
    let engine = engine_with(FAMILY);
    assert!(!succeeds(&engine, "findall(C, parent(bob, C), [pat, ann])"));
}

#[test]
fn bagof_groups_by_free_variables() {
    let engine = engine_with(FAMILY);
    let mut q = engine.query("bagof(C, parent(P, C), L)").unwrap();
    let mut groups = Vec::new();
    while q.evaluate().unwrap() {
        groups.push(format!("{}: {}", q.binding("P").unwrap(), q.binding("L").unwrap()));
    }
    assert_eq!(groups, vec!["tom: [bob,liz]", "bob: [ann,pat]", "pat: [jim]"]);
}

#[test]
fn bagof_with_existential_is_one_group() {
    let engine = engine_with(FAMILY);
    assert_eq!(
        answers(&engine, "bagof(C, P^parent(P, C), L)", "L"),
        vec!["[bob,liz,ann,pat,jim]"]
    );
}

#[test]
fn bagof_and_setof_fail_without_solutions() {
    let engine = engine_with(FAMILY);
    assert_eq!(count(&engine, "bagof(X, age(X, 99), L)"), 0);
    assert_eq!(count(&engine, "setof(X, age(X, 99), L)"), 0);
}

#[test]
fn setof_sorts_and_removes_duplicates() {
    let engine = engine_with(FAMILY);
    assert_eq!(
        answers(&engine, "setof(X, member(X, [3, 1, 2, 1]), L)", "L"),
        vec!["[1,2,3]"]
    );
    assert_eq!(
        answers(&engine, "setof(A-N, age(N, A), L)", "L"),
        vec!["[5-tom,7-peter,8-pat,11-ann,11-mike]"]
    );
}

#[test]
fn setof_groups_by_age() {
    let engine = engine_with(FAMILY);
    let mut q = engine.query("setof(N, age(N, A), L)").unwrap();
    let mut groups = Vec::new();
    while q.evaluate().unwrap() {
        groups.push(format!("{}: {}", q.binding("A").unwrap(), q.binding("L").unwrap()));
    }
    assert_eq!(
        groups,
        vec!["7: [peter]", "11: [ann,mike]", "8: [pat]", "5: [tom]"]
    );
}

#[test]
fn variant_witnesses_share_a_group() {
    let engine = engine_with("q(_, a). q(_, b).");
    let mut q = engine.query("bagof(X, q(W, X), L)").unwrap();
    assert!(q.evaluate().unwrap());
    assert_eq!(q.binding("L").unwrap().to_string(), "[a,b]");
    assert!(q.binding("W").unwrap().is_var());
    assert!(!q.evaluate().unwrap());
}

#[test]
fn nested_aggregates() {
    let engine = engine_with(FAMILY);
    assert_eq!(
        answers(
            &engine,
            "findall(P-Cs, bagof(C, parent(P, C), Cs), L)",
            "L"
        ),
        vec!["[tom-[bob,liz],bob-[ann,pat],pat-[jim]]"]
    );
}

#[test]
fn cut_inside_findall_goal_stays_inside() {
    let engine = engine_with(FAMILY);
    assert_eq!(
        answers(&engine, "findall(C, (parent(tom, C), !), L)", "L"),
        vec!["[bob]"]
    );
    assert_eq!(count(&engine, "findall(C, (parent(tom, C), !), L), age(_, _)"), 5);
}
