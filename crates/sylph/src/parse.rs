//! Token-by-token derivatives and the parse loop.
//!
//! Consuming a token turns a parser into the residual parser for the rest of
//! the input. The loop derives once per token and checks that the residual
//! still accepts something; the first token whose residual accepts nothing is
//! the reported failure point. No backtracking ever happens, so each token is
//! examined exactly once.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::syntax::{Node, RecId, Syntax, epsilon, failure};
use crate::token::{Atom, Token};
use crate::value::Value;

/// The outcome of feeding a token stream to a parser.
///
/// Every variant carries the residual parser at the point the loop stopped,
/// so callers can diagnose (`expected`), resume with more input, or complete.
#[derive(Debug, Clone)]
pub enum ParseResult<T: Token, A: Atom> {
    /// The input was consumed and accepted.
    Parsed {
        value: Value<T, A>,
        rest: Syntax<T, A>,
    },
    /// `token` arrived while the parser could not accept its kind.
    UnexpectedToken { token: T, rest: Syntax<T, A> },
    /// The input ended while the parser still required more.
    UnexpectedEnd { rest: Syntax<T, A> },
}

/// A parse failure stripped down to an error value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError<T: Token> {
    #[error("unexpected token {token:?}, expected one of {expected:?}")]
    UnexpectedToken {
        token: T,
        expected: IndexSet<T::Kind>,
    },

    #[error("unexpected end of input, expected one of {expected:?}")]
    UnexpectedEnd { expected: IndexSet<T::Kind> },
}

impl<T: Token, A: Atom> ParseResult<T, A> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseResult::Parsed { .. })
    }

    /// The parsed value, when the input was accepted.
    pub fn value(&self) -> Option<&Value<T, A>> {
        match self {
            ParseResult::Parsed { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value<T, A>> {
        match self {
            ParseResult::Parsed { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The residual parser at the point the loop stopped.
    pub fn rest(&self) -> &Syntax<T, A> {
        match self {
            ParseResult::Parsed { rest, .. }
            | ParseResult::UnexpectedToken { rest, .. }
            | ParseResult::UnexpectedEnd { rest } => rest,
        }
    }

    /// The kinds the residual parser would have accepted.
    pub fn expected(&self) -> IndexSet<T::Kind> {
        self.rest().first()
    }

    /// Convert into a `Result`, losing the residual.
    pub fn into_result(self) -> Result<(Value<T, A>, Syntax<T, A>), ParseError<T>> {
        match self {
            ParseResult::Parsed { value, rest } => Ok((value, rest)),
            ParseResult::UnexpectedToken { token, rest } => Err(ParseError::UnexpectedToken {
                token,
                expected: rest.first(),
            }),
            ParseResult::UnexpectedEnd { rest } => Err(ParseError::UnexpectedEnd {
                expected: rest.first(),
            }),
        }
    }
}

impl<T: Token, A: Atom> Syntax<T, A> {
    /// The residual parser after consuming `token`.
    ///
    /// Defined for every term; a term that cannot consume the token derives
    /// to `failure`. Left-recursive terms derive to `failure` as well rather
    /// than recursing forever - their parse behavior is unspecified, but the
    /// derivative of any term terminates.
    pub fn derive(&self, token: T) -> Syntax<T, A> {
        let kind = token.kind();
        self.derive_in(token, kind, &mut HashSet::new())
    }

    fn derive_in(&self, token: T, kind: T::Kind, visited: &mut HashSet<RecId>) -> Syntax<T, A> {
        match self.node() {
            Node::Success(_) | Node::Failure => failure(),
            Node::Elem(accepted) => {
                if *accepted == kind {
                    epsilon(Value::Token(token))
                } else {
                    failure()
                }
            }
            Node::Transform(transform) => transform
                .inner
                .derive_in(token, kind, visited)
                .transform(Rc::clone(&transform.map), transform.inverse.clone()),
            Node::Sequence(left, right) => {
                let derived = left.derive_in(token.clone(), kind, visited);
                if derived.is_productive() {
                    derived.then(right.clone())
                } else if let Some(value) = left.nullable() {
                    epsilon(value).then(right.derive_in(token, kind, visited))
                } else {
                    failure()
                }
            }
            Node::Concat(left, right) => {
                let derived = left.derive_in(token.clone(), kind, visited);
                if derived.is_productive() {
                    derived.concat(right.clone())
                } else if let Some(value) = left.nullable() {
                    epsilon(value).concat(right.derive_in(token, kind, visited))
                } else {
                    failure()
                }
            }
            Node::Disjunction(left, right) => {
                // One token of look-ahead selects the side; the left side
                // wins when both could start with this kind.
                if left.first().contains(&kind) {
                    left.derive_in(token, kind, visited)
                } else if right.first().contains(&kind) {
                    right.derive_in(token, kind, visited)
                } else {
                    failure()
                }
            }
            Node::Recursive(rec) => {
                if !visited.insert(rec.id) {
                    return failure();
                }
                let derived = rec.inner(self).derive_in(token, kind, visited);
                visited.remove(&rec.id);
                derived
            }
        }
    }

    /// Run the parse loop over `tokens`.
    ///
    /// Each token is consumed by one derivative step; the loop stops at the
    /// first token whose residual accepts nothing. At end of input the
    /// residual's nullability decides between [`ParseResult::Parsed`] and
    /// [`ParseResult::UnexpectedEnd`].
    pub fn apply(&self, tokens: impl IntoIterator<Item = T>) -> ParseResult<T, A> {
        let mut current = self.clone();
        for token in tokens {
            let kind = token.kind();
            log::trace!("deriving over {token:?} ({kind:?})");
            let next = current.derive(token.clone());
            if !next.is_productive() {
                log::debug!("parse stopped at {token:?}");
                return ParseResult::UnexpectedToken { token, rest: current };
            }
            current = next;
        }
        match current.nullable() {
            Some(value) => ParseResult::Parsed { value, rest: current },
            None => ParseResult::UnexpectedEnd { rest: current },
        }
    }
}
