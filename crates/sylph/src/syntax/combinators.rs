//! Derived combinators, all expressed through the core constructors.
//!
//! Every mapping here carries an inverse, so grammars built from these
//! combinators support reverse token enumeration out of the box. The one
//! exception is `void`, which forgets its value irrecoverably; `unit`
//! is the invertible variant.

use crate::syntax::{Syntax, epsilon, failure, recursive};
use crate::token::{Atom, Token};
use crate::value::Value;

/// The disjunction of all `alternatives`, in order. Empty input yields
/// `failure`.
pub fn one_of<T: Token, A: Atom>(
    alternatives: impl IntoIterator<Item = Syntax<T, A>>,
) -> Syntax<T, A> {
    alternatives.into_iter().fold(failure(), Syntax::or)
}

impl<T: Token, A: Atom> Syntax<T, A> {
    /// Zero or one occurrence, producing [`Value::Maybe`].
    pub fn opt(self) -> Self {
        self.map_with_inverse(Value::some, |target| match target {
            Value::Maybe(Some(inner)) => vec![(**inner).clone()],
            _ => Vec::new(),
        })
        .or(epsilon(Value::none()))
    }

    /// Forget the produced value.
    ///
    /// The result produces [`Value::Unit`] and contributes no reverse-token
    /// candidates; use [`unit`](Syntax::unit) where invertibility matters.
    pub fn void(self) -> Self {
        self.map(|_| Value::Unit)
    }

    /// Forget the produced value, declaring `default` as the value to
    /// reconstruct when enumerating tokens in reverse.
    pub fn unit(self, default: Value<T, A>) -> Self {
        self.map_with_inverse(
            |_| Value::Unit,
            move |target| {
                if *target == Value::Unit {
                    vec![default.clone()]
                } else {
                    Vec::new()
                }
            },
        )
    }

    /// Sequence, keeping only the right value.
    ///
    /// The discarded left side should be unit-valued (see
    /// [`void`](Syntax::void) / [`unit`](Syntax::unit)); reverse enumeration
    /// reconstructs it as [`Value::Unit`].
    pub fn ignore_then(self, other: Self) -> Self {
        self.then(other).map_with_inverse(
            |value| match value {
                Value::Pair(_, second) => *second,
                _ => unreachable!("sequence values are pairs"),
            },
            |target| vec![Value::pair(Value::Unit, target.clone())],
        )
    }

    /// Sequence, keeping only the left value.
    ///
    /// The discarded right side should be unit-valued.
    pub fn then_ignore(self, other: Self) -> Self {
        self.then(other).map_with_inverse(
            |value| match value {
                Value::Pair(first, _) => *first,
                _ => unreachable!("sequence values are pairs"),
            },
            |target| vec![Value::pair(target.clone(), Value::Unit)],
        )
    }

    /// An element followed by a sequence-typed parser, producing the
    /// sequence with the element at the front.
    pub fn prepend(self, rest: Self) -> Self {
        self.then(rest).map_with_inverse(Value::cons, Value::uncons)
    }

    /// A sequence-typed parser followed by an element, producing the
    /// sequence with the element at the back.
    pub fn append(self, last: Self) -> Self {
        self.then(last).map_with_inverse(Value::snoc, Value::unsnoc)
    }

    /// Zero or more occurrences, producing [`Value::Seq`].
    pub fn many(self) -> Self {
        recursive(move |rep| {
            self.then(rep)
                .map_with_inverse(Value::cons, Value::uncons)
                .or(epsilon(Value::empty_seq()))
        })
    }

    /// One or more occurrences, producing a non-empty [`Value::Seq`].
    pub fn many1(self) -> Self {
        self.clone()
            .then(self.many())
            .map_with_inverse(Value::cons, Value::uncons)
    }

    /// One or more occurrences separated by `separator`, producing the
    /// occurrences as a [`Value::Seq`] and dropping the separators.
    ///
    /// The separator should be unit-valued.
    pub fn rep1sep(self, separator: Self) -> Self {
        self.clone()
            .then(separator.ignore_then(self).many())
            .map_with_inverse(Value::cons, Value::uncons)
    }

    /// Zero or more occurrences separated by `separator`.
    pub fn repsep(self, separator: Self) -> Self {
        self.rep1sep(separator).or(epsilon(Value::empty_seq()))
    }
}
