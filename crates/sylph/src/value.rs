//! Dynamic semantic values.
//!
//! Parser terms are heterogeneous: each node logically produces its own value
//! type. The term graph erases those types into a single [`Value`] enum and
//! transforms re-establish shape at the boundary. The caller picks one
//! payload type `A` (typically its AST type) for everything a grammar
//! computes beyond tokens and structure.

use crate::token::{Atom, Token};

/// A value produced by a parser.
///
/// `Pair` is the dedicated record for sequenced values (`a` then `b`); it is
/// distinct from any user payload so reverse token enumeration can split it.
/// `Seq` carries sequence-typed values, the domain of concatenation and
/// repetition. Structural equality is what reverse enumeration matches
/// targets with.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<T: Token, A: Atom> {
    /// The unit value, produced by voided parsers and empty prefixes.
    Unit,
    /// A consumed token.
    Token(T),
    /// A caller payload.
    Atom(A),
    /// The value of a sequence: left's value, then right's.
    Pair(Box<Value<T, A>>, Box<Value<T, A>>),
    /// A sequence-typed value, produced by concatenation and repetition.
    Seq(Vec<Value<T, A>>),
    /// An optional value, produced by [`opt`](crate::Syntax::opt).
    Maybe(Option<Box<Value<T, A>>>),
}

impl<T: Token, A: Atom> Value<T, A> {
    pub fn atom(payload: A) -> Self {
        Value::Atom(payload)
    }

    pub fn token(token: T) -> Self {
        Value::Token(token)
    }

    pub fn pair(first: Self, second: Self) -> Self {
        Value::Pair(Box::new(first), Box::new(second))
    }

    pub fn seq(items: Vec<Self>) -> Self {
        Value::Seq(items)
    }

    pub fn empty_seq() -> Self {
        Value::Seq(Vec::new())
    }

    pub fn some(inner: Self) -> Self {
        Value::Maybe(Some(Box::new(inner)))
    }

    pub fn none() -> Self {
        Value::Maybe(None)
    }

    pub fn as_token(&self) -> Option<&T> {
        match self {
            Value::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&A> {
        match self {
            Value::Atom(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value<T, A>]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(&Value<T, A>, &Value<T, A>)> {
        match self {
            Value::Pair(first, second) => Some((first, second)),
            _ => None,
        }
    }

    /// Concatenate two sequence-typed values.
    ///
    /// Panics on non-`Seq` operands: concatenation is only defined on
    /// sequence-typed parsers.
    pub(crate) fn concat_seqs(left: Self, right: Self) -> Self {
        match (left, right) {
            (Value::Seq(mut front), Value::Seq(back)) => {
                front.extend(back);
                Value::Seq(front)
            }
            _ => panic!("concatenation applied to non-sequence values"),
        }
    }

    /// Turn `Pair(head, Seq(tail))` into `Seq([head, tail...])`.
    ///
    /// This is the mapping repetition combinators apply to `p ~ rest`
    /// sequences; it is public so hand-rolled recursive grammars can use the
    /// same shape. Panics on any other value shape.
    pub fn cons(self) -> Self {
        match self {
            Value::Pair(head, tail) => match *tail {
                Value::Seq(mut items) => {
                    items.insert(0, *head);
                    Value::Seq(items)
                }
                _ => panic!("cons applied to a pair without a sequence tail"),
            },
            _ => panic!("cons applied to a non-pair value"),
        }
    }

    /// Candidate `Pair(head, Seq(tail))` splits of a sequence value; empty
    /// for empty sequences and non-sequence values. The inverse of
    /// [`cons`](Value::cons).
    pub fn uncons(&self) -> Vec<Self> {
        match self.as_seq() {
            Some([head, tail @ ..]) => {
                vec![Value::pair(head.clone(), Value::Seq(tail.to_vec()))]
            }
            _ => Vec::new(),
        }
    }

    /// Turn `Pair(Seq(front), last)` into `Seq([front..., last])`.
    pub fn snoc(self) -> Self {
        match self {
            Value::Pair(front, last) => match *front {
                Value::Seq(mut items) => {
                    items.push(*last);
                    Value::Seq(items)
                }
                _ => panic!("snoc applied to a pair without a sequence front"),
            },
            _ => panic!("snoc applied to a non-pair value"),
        }
    }

    /// Candidate `Pair(Seq(front), last)` splits of a sequence value. The
    /// inverse of [`snoc`](Value::snoc).
    pub fn unsnoc(&self) -> Vec<Self> {
        match self.as_seq() {
            Some([front @ .., last]) => {
                vec![Value::pair(Value::Seq(front.to_vec()), last.clone())]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{Tok, Val};

    #[test]
    fn cons_prepends_to_sequences() {
        let v = Val::pair(Val::token(Tok::A), Val::seq(vec![Val::token(Tok::B)]));
        assert_eq!(
            v.cons(),
            Val::seq(vec![Val::token(Tok::A), Val::token(Tok::B)])
        );
    }

    #[test]
    fn uncons_splits_nonempty_sequences() {
        let v = Val::seq(vec![Val::atom(1), Val::atom(2)]);
        assert_eq!(
            v.uncons(),
            vec![Val::pair(Val::atom(1), Val::seq(vec![Val::atom(2)]))]
        );
        assert!(Val::empty_seq().uncons().is_empty());
        assert!(Val::Unit.uncons().is_empty());
    }

    #[test]
    fn snoc_and_unsnoc_are_inverse() {
        let v = Val::seq(vec![Val::atom(1), Val::atom(2)]);
        let splits = v.unsnoc();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].clone().snoc(), v);
    }
}
