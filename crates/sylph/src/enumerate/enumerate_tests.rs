use crate::syntax::recursive;
use crate::test_utils::{Kind, Sx, Tok, Val, a, b, expr_grammar};

#[test]
fn repetition_trails_grow_one_kind_at_a_time() {
    let trails: Vec<_> = a().many().trails().take(5).collect();
    assert_eq!(
        trails,
        vec![
            vec![],
            vec![Kind::A],
            vec![Kind::A; 2],
            vec![Kind::A; 3],
            vec![Kind::A; 4],
        ]
    );
}

#[test]
fn disjunction_trails_enumerate_left_first() {
    let trails: Vec<_> = (a() | b()).trails().collect();
    assert_eq!(trails, vec![vec![Kind::A], vec![Kind::B]]);
}

#[test]
fn expr_trails_enumerate_nesting_depth() {
    let trails: Vec<_> = expr_grammar().trails().take(3).collect();
    assert_eq!(
        trails,
        vec![
            vec![Kind::Num],
            vec![Kind::LParen, Kind::Num, Kind::RParen],
            vec![Kind::LParen, Kind::LParen, Kind::Num, Kind::RParen, Kind::RParen],
        ]
    );
}

#[test]
fn trails_never_shrink() {
    let lengths: Vec<_> = expr_grammar().trails().take(8).map(|t| t.len()).collect();
    assert!(lengths.windows(2).all(|w| w[0] <= w[1]), "{lengths:?}");
}

#[test]
fn every_trail_parses_with_matching_tokens() {
    fn sample(kind: Kind) -> Tok {
        match kind {
            Kind::A => Tok::A,
            Kind::B => Tok::B,
            Kind::C => Tok::C,
            Kind::Num => Tok::Num(0),
            Kind::LParen => Tok::LParen,
            Kind::RParen => Tok::RParen,
        }
    }
    let expr = expr_grammar();
    for trail in expr.trails().take(6) {
        let tokens: Vec<_> = trail.into_iter().map(sample).collect();
        assert!(expr.apply(tokens.clone()).is_parsed(), "{tokens:?}");
    }
}

#[test]
fn unproductive_recursion_has_no_trails() {
    let p: Sx = recursive(|p| a().then(p));
    assert_eq!(p.trails().next(), None);
}

#[test]
fn tokens_of_a_repetition_spell_out_its_elements() {
    let target = Val::seq(vec![Val::token(Tok::A), Val::token(Tok::A)]);
    let mut tokens = a().many().tokens_of(&target);
    assert_eq!(tokens.next(), Some(vec![Tok::A, Tok::A]));
    assert_eq!(tokens.next(), None);
}

#[test]
fn expr_tokens_round_trip_through_parsing() {
    let expr = expr_grammar();
    let target = Val::atom(5);
    let sequences: Vec<_> = expr.tokens_of(&target).take(3).collect();
    assert_eq!(sequences[0], vec![Tok::Num(5)]);
    assert_eq!(sequences[1], vec![Tok::LParen, Tok::Num(5), Tok::RParen]);
    for tokens in sequences {
        assert_eq!(expr.apply(tokens).into_value(), Some(target.clone()));
    }
}

#[test]
fn transforms_without_inverses_yield_no_tokens() {
    let p = a().void();
    assert_eq!(p.tokens_of(&Val::Unit).next(), None);
}

#[test]
fn unit_declares_the_reverse_candidate() {
    let p = a().unit(Val::token(Tok::A));
    let mut tokens = p.tokens_of(&Val::Unit);
    assert_eq!(tokens.next(), Some(vec![Tok::A]));
    assert_eq!(tokens.next(), None);
}

#[test]
fn tokens_respect_the_target_value() {
    let mut tokens = a().tokens_of(&Val::token(Tok::B));
    assert_eq!(tokens.next(), None);
    let mut tokens = a().tokens_of(&Val::token(Tok::A));
    assert_eq!(tokens.next(), Some(vec![Tok::A]));
}
