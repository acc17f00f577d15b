use crate::parse::ParseResult;
use crate::test_utils::{Kind, Tok, Val, a, b, expr_grammar};

fn to_token(kind: Kind) -> Option<Tok> {
    match kind {
        Kind::A => Some(Tok::A),
        Kind::B => Some(Tok::B),
        Kind::C => Some(Tok::C),
        Kind::Num => Some(Tok::Num(0)),
        Kind::LParen => Some(Tok::LParen),
        Kind::RParen => Some(Tok::RParen),
    }
}

fn samples(kind: Kind) -> Vec<Tok> {
    to_token(kind).into_iter().collect()
}

#[test]
fn filter_rejects_kinds() {
    let p = (a() | b()).filter(|kind| kind == Kind::A);
    assert!(p.apply([Tok::A]).is_parsed());
    assert!(!p.apply([Tok::B]).is_parsed());
    assert_eq!(p.trails().collect::<Vec<_>>(), vec![vec![Kind::A]]);
}

#[test]
fn filter_rebuilds_recursive_grammars() {
    let expr = expr_grammar();
    let flat = expr.filter(|kind| kind != Kind::LParen);
    assert_eq!(flat.trails().collect::<Vec<_>>(), vec![vec![Kind::Num]]);
    // The original grammar is untouched.
    assert!(
        expr.apply([Tok::LParen, Tok::Num(1), Tok::RParen]).is_parsed()
    );
}

#[test]
fn filters_of_one_term_are_independent() {
    let p = a() | b();
    let only_a = p.filter(|kind| kind == Kind::A);
    let only_b = p.filter(|kind| kind == Kind::B);
    assert!(only_a.apply([Tok::A]).is_parsed());
    assert!(only_b.apply([Tok::B]).is_parsed());
    assert!(!only_a.apply([Tok::B]).is_parsed());
}

#[test]
fn completions_enumerate_shortest_first() {
    let expr = expr_grammar();
    let results: Vec<_> = expr.completions(samples).take(2).collect();
    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(result.value(), Some(&Val::atom(0)));
    }
    let ParseResult::Parsed { rest, .. } = &results[0] else {
        panic!("completions replay accepted inputs");
    };
    assert!(rest.nullable().is_some());
}

#[test]
fn completions_skip_kinds_without_samples() {
    let expr = expr_grammar();
    let only_numbers =
        |kind: Kind| if kind == Kind::Num { vec![Tok::Num(0)] } else { Vec::new() };
    let results: Vec<_> = expr.completions(only_numbers).collect();
    // Parenthesized trails need LParen samples, so one completion remains.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].value(), Some(&Val::atom(0)));
}

#[test]
fn complete_finishes_a_partial_parse() {
    let expr = expr_grammar();
    let ParseResult::UnexpectedEnd { rest } = expr.apply([Tok::LParen]) else {
        panic!("a lone open paren is incomplete");
    };
    let completed = rest.complete(to_token);
    assert!(completed.nullable().is_some());
}

#[test]
fn complete_prefers_the_empty_completion() {
    let p = a().opt();
    let completed = p.complete(to_token);
    // The shortest completion is the empty one, so the residual is the
    // parser itself, still able to take an A.
    assert_eq!(completed.nullable(), Some(Val::none()));
    assert!(completed.apply([Tok::A]).is_parsed());
}

#[test]
fn complete_without_samples_fails() {
    let completed = a().complete(|_| None);
    assert!(!completed.is_productive());
}
