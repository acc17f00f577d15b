use std::cell::Cell;
use std::rc::Rc;

use crate::syntax::{Node, elem, epsilon, failure, one_of, recursive};
use crate::test_utils::{Kind, Sx, Tok, Val, a, b};
use crate::value::Value;

#[test]
fn sequencing_successes_fuses_into_one_success() {
    let fused: Sx = epsilon(Val::atom(1)).then(epsilon(Val::atom(2)));
    let Node::Success(value) = fused.node() else {
        panic!("expected a success node, got {fused:?}");
    };
    assert_eq!(*value, Val::pair(Val::atom(1), Val::atom(2)));
}

#[test]
fn failure_short_circuits_sequences() {
    assert!(a().then(failure()).is_failure());
    assert!(failure().then(a()).is_failure());
    assert!(a().concat(failure()).is_failure());
    assert!(failure().concat(a()).is_failure());
}

#[test]
fn failure_is_the_disjunction_identity() {
    let left: Sx = failure().or(a());
    assert!(matches!(left.node(), Node::Elem(Kind::A)));
    let right: Sx = a().or(failure());
    assert!(matches!(right.node(), Node::Elem(Kind::A)));
}

#[test]
fn transform_over_failure_is_failure() {
    let mapped: Sx = failure().map(|v| v);
    assert!(mapped.is_failure());
}

#[test]
fn concat_chains_lean_right() {
    let s = || -> Sx { epsilon(Val::empty_seq()) };
    let chained = s().concat(s()).concat(s());
    let Node::Concat(head, tail) = chained.node() else {
        panic!("expected a concat node");
    };
    assert!(matches!(head.node(), Node::Success(_)));
    assert!(matches!(tail.node(), Node::Concat(_, _)));
}

#[test]
fn recursive_nodes_get_distinct_identities() {
    let first: Sx = recursive(|_| a());
    let second: Sx = recursive(|_| a());
    let (Node::Recursive(r1), Node::Recursive(r2)) = (first.node(), second.node()) else {
        panic!("expected recursive nodes");
    };
    assert_ne!(r1.id, r2.id);
}

#[test]
fn recursive_definition_runs_on_first_observation() {
    let forced = Rc::new(Cell::new(false));
    let flag = Rc::clone(&forced);
    let lazy: Sx = recursive(move |_| {
        flag.set(true);
        a()
    });
    assert!(!forced.get());
    assert!(lazy.nullable().is_none());
    assert!(forced.get());
}

#[test]
fn bitor_is_disjunction() {
    let either = a() | b();
    assert!(either.apply([Tok::B]).is_parsed());
}

#[test]
fn one_of_folds_alternatives_in_order() {
    let any = one_of([a(), b(), elem(Kind::C)]);
    assert!(any.apply([Tok::C]).is_parsed());
    assert!(!any.apply([Tok::Num(0)]).is_parsed());
    let none: Sx = one_of([]);
    assert!(none.is_failure());
}

#[test]
fn debug_output_cuts_recursive_cycles() {
    let repeated = a().many();
    assert!(repeated.nullable().is_some());
    let printed = format!("{repeated:?}");
    assert!(printed.contains("rec#"), "{printed}");
}
