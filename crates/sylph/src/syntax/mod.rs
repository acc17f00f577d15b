//! The combinator term graph.
//!
//! A [`Syntax`] is a cheap handle to an immutable node; combinators build new
//! nodes over shared subterms. Recursion is the only source of cycles:
//! [`recursive`] allocates a node with a globally unique identity and a
//! deferred definition, forced and memoized on first observation.
//!
//! Construction normalizes eagerly - failures short-circuit, adjacent
//! successes fuse, concatenations lean right - because every analysis
//! assumes those invariants.
//!
//! Module organization:
//! - `mod.rs` - node variants, handles, recursion identity, core combinators
//! - `combinators` - derived combinators (`opt`, `many`, `repsep`, ...)

mod combinators;

#[cfg(test)]
mod syntax_tests;

use std::cell::{OnceCell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::analyze::properties::PropertyCaches;
use crate::token::{Atom, Token};
use crate::value::Value;

pub use combinators::one_of;

/// The identity of a recursive node.
///
/// Identities are issued by a global monotone counter, so two recursive
/// nodes are the same term exactly when their identities are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecId(u64);

static NEXT_REC_ID: AtomicU64 = AtomicU64::new(0);

impl RecId {
    fn fresh() -> Self {
        RecId(NEXT_REC_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

pub(crate) type MapFn<T, A> = dyn Fn(Value<T, A>) -> Value<T, A>;
pub(crate) type InverseFn<T, A> = dyn Fn(&Value<T, A>) -> Vec<Value<T, A>>;

pub(crate) struct Transform<T: Token, A: Atom> {
    pub(crate) map: Rc<MapFn<T, A>>,
    pub(crate) inverse: Option<Rc<InverseFn<T, A>>>,
    pub(crate) inner: Syntax<T, A>,
}

pub(crate) struct Recursive<T: Token, A: Atom> {
    pub(crate) id: RecId,
    inner: OnceCell<Syntax<T, A>>,
    definition: RefCell<Option<Box<dyn FnOnce(Syntax<T, A>) -> Syntax<T, A>>>>,
    pub(crate) caches: PropertyCaches<T, A>,
}

impl<T: Token, A: Atom> Recursive<T, A> {
    /// The defining term, forced and memoized on first observation.
    ///
    /// `handle` must be the syntax owning this node; it is what the deferred
    /// definition receives as the self-reference.
    pub(crate) fn inner(&self, handle: &Syntax<T, A>) -> &Syntax<T, A> {
        if self.inner.get().is_none() {
            let definition = self
                .definition
                .borrow_mut()
                .take()
                .expect("recursive syntax observed while its definition runs");
            let inner = definition(handle.clone());
            let _ = self.inner.set(inner);
        }
        self.inner.get().unwrap()
    }
}

pub(crate) enum Node<T: Token, A: Atom> {
    Success(Value<T, A>),
    Failure,
    Elem(T::Kind),
    Transform(Transform<T, A>),
    Sequence(Syntax<T, A>, Syntax<T, A>),
    Concat(Syntax<T, A>, Syntax<T, A>),
    Disjunction(Syntax<T, A>, Syntax<T, A>),
    Recursive(Recursive<T, A>),
}

/// A parser term: an immutable, shareable node of the combinator graph.
///
/// Cloning is cheap (a reference count) and every combinator takes its
/// operands by value, so grammars clone subterms where they are reused.
/// Recursive terms form reference cycles on purpose: a cyclic grammar keeps
/// itself alive for as long as any handle into it exists.
pub struct Syntax<T: Token, A: Atom> {
    node: Rc<Node<T, A>>,
}

impl<T: Token, A: Atom> Clone for Syntax<T, A> {
    fn clone(&self) -> Self {
        Syntax { node: Rc::clone(&self.node) }
    }
}

/// The parser accepting one token of kind `kind`, producing that token.
pub fn elem<T: Token, A: Atom>(kind: T::Kind) -> Syntax<T, A> {
    Syntax::from_node(Node::Elem(kind))
}

/// The parser accepting the empty input, producing `value`.
pub fn epsilon<T: Token, A: Atom>(value: Value<T, A>) -> Syntax<T, A> {
    Syntax::from_node(Node::Success(value))
}

/// The parser accepting nothing.
pub fn failure<T: Token, A: Atom>() -> Syntax<T, A> {
    Syntax::from_node(Node::Failure)
}

/// A recursive parser.
///
/// `definition` receives the parser being defined and returns its body; it
/// runs on first observation (analysis, derivation, or enumeration), not at
/// construction, so mutually recursive grammars can be tied together freely.
///
/// ```
/// # use sylph::{elem, epsilon, recursive, Syntax, Token, Value};
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Kind { A }
/// # #[derive(Debug, Clone, PartialEq)]
/// # struct Tok;
/// # impl Token for Tok { type Kind = Kind; fn kind(&self) -> Kind { Kind::A } }
/// let repeated: Syntax<Tok, ()> = recursive(|rep| {
///     elem(Kind::A).then(rep).map(Value::cons).or(epsilon(Value::empty_seq()))
/// });
/// ```
pub fn recursive<T: Token, A: Atom>(
    definition: impl FnOnce(Syntax<T, A>) -> Syntax<T, A> + 'static,
) -> Syntax<T, A> {
    Syntax::from_node(Node::Recursive(Recursive {
        id: RecId::fresh(),
        inner: OnceCell::new(),
        definition: RefCell::new(Some(Box::new(definition))),
        caches: PropertyCaches::default(),
    }))
}

impl<T: Token, A: Atom> Syntax<T, A> {
    pub(crate) fn from_node(node: Node<T, A>) -> Self {
        Syntax { node: Rc::new(node) }
    }

    pub(crate) fn node(&self) -> &Node<T, A> {
        &self.node
    }

    pub(crate) fn is_failure(&self) -> bool {
        matches!(self.node(), Node::Failure)
    }

    /// A recursive node with no definition; the caller installs the inner
    /// term before the node can be observed.
    pub(crate) fn recursive_unset() -> Self {
        Syntax::from_node(Node::Recursive(Recursive {
            id: RecId::fresh(),
            inner: OnceCell::new(),
            definition: RefCell::new(None),
            caches: PropertyCaches::default(),
        }))
    }

    pub(crate) fn set_recursive_inner(&self, inner: Syntax<T, A>) {
        let Node::Recursive(rec) = self.node() else {
            unreachable!("set_recursive_inner on a non-recursive node");
        };
        let _ = rec.inner.set(inner);
    }

    /// Sequence: `self` then `other`, producing [`Value::Pair`].
    pub fn then(self, other: Self) -> Self {
        if self.is_failure() || other.is_failure() {
            return failure();
        }
        if let (Node::Success(first), Node::Success(second)) = (self.node(), other.node()) {
            return epsilon(Value::pair(first.clone(), second.clone()));
        }
        Syntax::from_node(Node::Sequence(self, other))
    }

    /// Concatenation of two sequence-typed parsers, producing [`Value::Seq`].
    ///
    /// Both operands must produce `Seq` values; anything else panics when a
    /// value is actually formed. Chains rebalance to the right so repeated
    /// left-accumulation stays linear.
    pub fn concat(self, other: Self) -> Self {
        if self.is_failure() || other.is_failure() {
            return failure();
        }
        if let Node::Concat(left, right) = self.node() {
            let (left, right) = (left.clone(), right.clone());
            return left.concat(right.concat(other));
        }
        Syntax::from_node(Node::Concat(self, other))
    }

    /// Disjunction: whichever side parses. `failure` is the identity.
    pub fn or(self, other: Self) -> Self {
        if self.is_failure() {
            return other;
        }
        if other.is_failure() {
            return self;
        }
        Syntax::from_node(Node::Disjunction(self, other))
    }

    /// Map the produced value through `map`.
    ///
    /// Without an inverse the transform contributes no reverse-token
    /// candidates; see [`map_with_inverse`](Syntax::map_with_inverse).
    pub fn map(self, map: impl Fn(Value<T, A>) -> Value<T, A> + 'static) -> Self {
        self.transform(Rc::new(map), None)
    }

    /// Map the produced value through `map`, with `inverse` enumerating the
    /// possible pre-images of a target value for reverse token enumeration.
    pub fn map_with_inverse(
        self,
        map: impl Fn(Value<T, A>) -> Value<T, A> + 'static,
        inverse: impl Fn(&Value<T, A>) -> Vec<Value<T, A>> + 'static,
    ) -> Self {
        self.transform(Rc::new(map), Some(Rc::new(inverse)))
    }

    pub(crate) fn transform(
        self,
        map: Rc<MapFn<T, A>>,
        inverse: Option<Rc<InverseFn<T, A>>>,
    ) -> Self {
        if self.is_failure() {
            return failure();
        }
        Syntax::from_node(Node::Transform(Transform { map, inverse, inner: self }))
    }
}

impl<T: Token, A: Atom> std::ops::BitOr for Syntax<T, A> {
    type Output = Syntax<T, A>;

    fn bitor(self, other: Self) -> Self {
        self.or(other)
    }
}

impl<T: Token, A: Atom> fmt::Debug for Syntax<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, &mut HashSet::new())
    }
}

impl<T: Token, A: Atom> Syntax<T, A> {
    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, seen: &mut HashSet<RecId>) -> fmt::Result {
        match self.node() {
            Node::Success(value) => write!(f, "epsilon({value:?})"),
            Node::Failure => write!(f, "failure"),
            Node::Elem(kind) => write!(f, "elem({kind:?})"),
            Node::Transform(transform) => {
                write!(f, "map(")?;
                transform.inner.fmt_node(f, seen)?;
                write!(f, ")")
            }
            Node::Sequence(left, right) => {
                write!(f, "(")?;
                left.fmt_node(f, seen)?;
                write!(f, " ~ ")?;
                right.fmt_node(f, seen)?;
                write!(f, ")")
            }
            Node::Concat(left, right) => {
                write!(f, "(")?;
                left.fmt_node(f, seen)?;
                write!(f, " ++ ")?;
                right.fmt_node(f, seen)?;
                write!(f, ")")
            }
            Node::Disjunction(left, right) => {
                write!(f, "(")?;
                left.fmt_node(f, seen)?;
                write!(f, " | ")?;
                right.fmt_node(f, seen)?;
                write!(f, ")")
            }
            Node::Recursive(rec) => {
                if !seen.insert(rec.id) {
                    return write!(f, "rec#{}", rec.id.raw());
                }
                // Print only what has been forced; Debug must not force.
                match rec.inner.get() {
                    Some(inner) => {
                        write!(f, "rec#{}(", rec.id.raw())?;
                        inner.fmt_node(f, seen)?;
                        write!(f, ")")
                    }
                    None => write!(f, "rec#{}(..)", rec.id.raw()),
                }
            }
        }
    }
}
