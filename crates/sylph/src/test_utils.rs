//! Shared grammar fixtures.

use crate::syntax::{Syntax, elem, recursive};
use crate::token::Token;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    A,
    B,
    C,
    Num,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    A,
    B,
    C,
    Num(i64),
    LParen,
    RParen,
}

impl Token for Tok {
    type Kind = Kind;

    fn kind(&self) -> Kind {
        match self {
            Tok::A => Kind::A,
            Tok::B => Kind::B,
            Tok::C => Kind::C,
            Tok::Num(_) => Kind::Num,
            Tok::LParen => Kind::LParen,
            Tok::RParen => Kind::RParen,
        }
    }
}

/// Fixture syntax: `Tok` tokens, `i64` payloads.
pub type Sx = Syntax<Tok, i64>;
/// Fixture values.
pub type Val = Value<Tok, i64>;

pub fn a() -> Sx {
    elem(Kind::A)
}

pub fn b() -> Sx {
    elem(Kind::B)
}

/// `expr := NUM | "(" expr ")"`, producing the number as an atom.
///
/// Both branches carry inverses, so the grammar supports reverse token
/// enumeration.
pub fn expr_grammar() -> Sx {
    recursive(|expr| {
        let number = elem(Kind::Num).map_with_inverse(
            |value| match value {
                Value::Token(Tok::Num(n)) => Value::atom(n),
                _ => unreachable!("elem produces the consumed token"),
            },
            |target| match target {
                Value::Atom(n) => vec![Value::token(Tok::Num(*n))],
                _ => Vec::new(),
            },
        );
        let parens = elem(Kind::LParen)
            .then(expr)
            .then(elem(Kind::RParen))
            .map_with_inverse(
                |value| match value {
                    Value::Pair(open_inner, _close) => match *open_inner {
                        Value::Pair(_open, inner) => *inner,
                        _ => unreachable!("sequence values are pairs"),
                    },
                    _ => unreachable!("sequence values are pairs"),
                },
                |target| {
                    vec![Value::pair(
                        Value::pair(Value::token(Tok::LParen), target.clone()),
                        Value::token(Tok::RParen),
                    )]
                },
            );
        number.or(parens)
    })
}
