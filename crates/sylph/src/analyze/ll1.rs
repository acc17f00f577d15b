//! The LL(1) decision procedure and structured conflict reports.
//!
//! A term is LL(1) when one token of look-ahead always selects at most one
//! way forward: no disjunction with two nullable sides or overlapping FIRST
//! sets, no sequence whose right side may start with a kind the left side
//! must not be followed by, and no recursion that re-enters itself without
//! consuming. Conflicts are data, returned by [`conflicts`] - nothing here
//! raises.
//!
//! [`conflicts`]: Syntax::conflicts

use std::collections::HashSet;

use indexmap::IndexSet;

use sylph_producer::Producer;

use crate::syntax::{Node, RecId, Syntax, epsilon};
use crate::token::{Atom, Token};
use crate::value::Value;

/// An LL(1) ambiguity, located at `node` and reachable after the input
/// accepted by `prefix`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Conflict<T: Token, A: Atom> {
    /// Both sides of a disjunction accept the empty input.
    #[error("both sides of a disjunction accept the empty input")]
    Nullable {
        prefix: Syntax<T, A>,
        node: Syntax<T, A>,
    },

    /// Both sides of a disjunction may start with the same kinds.
    #[error("both sides of a disjunction may start with {kinds:?}")]
    First {
        prefix: Syntax<T, A>,
        kinds: IndexSet<T::Kind>,
        node: Syntax<T, A>,
    },

    /// The right side of a sequence may start with kinds that must not
    /// follow the left side.
    #[error("{kinds:?} may both end the left side of a sequence and start its right side")]
    Follow {
        prefix: Syntax<T, A>,
        kinds: IndexSet<T::Kind>,
        node: Syntax<T, A>,
    },

    /// A recursive definition re-enters itself without consuming input.
    #[error("recursive definition re-enters itself without consuming input")]
    LeftRecursive {
        prefix: Syntax<T, A>,
        node: Syntax<T, A>,
    },
}

impl<T: Token, A: Atom> Conflict<T, A> {
    /// A parser accepting the inputs that lead up to the ambiguity.
    pub fn prefix(&self) -> &Syntax<T, A> {
        match self {
            Conflict::Nullable { prefix, .. }
            | Conflict::First { prefix, .. }
            | Conflict::Follow { prefix, .. }
            | Conflict::LeftRecursive { prefix, .. } => prefix,
        }
    }

    /// The term the ambiguity originates at.
    pub fn node(&self) -> &Syntax<T, A> {
        match self {
            Conflict::Nullable { node, .. }
            | Conflict::First { node, .. }
            | Conflict::Follow { node, .. }
            | Conflict::LeftRecursive { node, .. } => node,
        }
    }

    /// The kind-sequences leading up to the ambiguity, shortest first.
    pub fn witnesses(&self) -> Producer<Vec<T::Kind>> {
        self.prefix().trails()
    }

    /// The same conflict as seen from a context where `left` is parsed
    /// before the conflicting term.
    fn add_prefix(self, left: &Syntax<T, A>) -> Self {
        match self {
            Conflict::Nullable { prefix, node } => Conflict::Nullable {
                prefix: left.clone().then(prefix),
                node,
            },
            Conflict::First { prefix, kinds, node } => Conflict::First {
                prefix: left.clone().then(prefix),
                kinds,
                node,
            },
            Conflict::Follow { prefix, kinds, node } => Conflict::Follow {
                prefix: left.clone().then(prefix),
                kinds,
                node,
            },
            Conflict::LeftRecursive { prefix, node } => Conflict::LeftRecursive {
                prefix: left.clone().then(prefix),
                node,
            },
        }
    }
}

impl<T: Token, A: Atom> Syntax<T, A> {
    /// Whether one token of look-ahead always selects at most one way
    /// forward. Equivalent to [`conflicts`](Syntax::conflicts) being empty.
    pub fn is_ll1(&self) -> bool {
        self.is_ll1_in(&mut HashSet::new())
    }

    fn is_ll1_in(&self, visited: &mut HashSet<RecId>) -> bool {
        match self.node() {
            Node::Success(_) | Node::Failure | Node::Elem(_) => true,
            Node::Transform(transform) => transform.inner.is_ll1_in(visited),
            Node::Sequence(left, right) | Node::Concat(left, right) => {
                let follow = left.should_not_follow();
                let first = right.first();
                follow.keys().all(|kind| !first.contains(kind))
                    && left.is_ll1_in(visited)
                    && right.is_ll1_in(visited)
            }
            Node::Disjunction(left, right) => {
                !(left.nullable().is_some() && right.nullable().is_some())
                    && left.first().is_disjoint(&right.first())
                    && left.is_ll1_in(visited)
                    && right.is_ll1_in(visited)
            }
            Node::Recursive(rec) => {
                if !visited.insert(rec.id) {
                    return true;
                }
                let inner = rec.inner(self);
                !inner.called_left(rec.id) && inner.is_ll1_in(visited)
            }
        }
    }

    /// Every LL(1) ambiguity in the term, each with a witness prefix.
    pub fn conflicts(&self) -> Vec<Conflict<T, A>> {
        let found = self.conflicts_in(&mut HashSet::new());
        log::debug!("ll1 analysis found {} conflict(s)", found.len());
        found
    }

    fn conflicts_in(&self, visited: &mut HashSet<RecId>) -> Vec<Conflict<T, A>> {
        match self.node() {
            Node::Success(_) | Node::Failure | Node::Elem(_) => Vec::new(),
            Node::Transform(transform) => transform.inner.conflicts_in(visited),
            Node::Sequence(left, right) | Node::Concat(left, right) => {
                let mut found = Vec::new();
                let follow = left.should_not_follow();
                let first = right.first();
                let mut kinds = IndexSet::new();
                let mut prefix: Option<Syntax<T, A>> = None;
                for (kind, witness) in &follow {
                    if first.contains(kind) {
                        kinds.insert(*kind);
                        prefix = Some(match prefix {
                            Some(existing) => existing.or(witness.clone()),
                            None => witness.clone(),
                        });
                    }
                }
                if let Some(prefix) = prefix {
                    found.push(Conflict::Follow { prefix, kinds, node: self.clone() });
                }
                found.extend(left.conflicts_in(visited));
                found.extend(
                    right
                        .conflicts_in(visited)
                        .into_iter()
                        .map(|conflict| conflict.add_prefix(left)),
                );
                found
            }
            Node::Disjunction(left, right) => {
                let mut found = Vec::new();
                if left.nullable().is_some() && right.nullable().is_some() {
                    found.push(Conflict::Nullable {
                        prefix: epsilon(Value::Unit),
                        node: self.clone(),
                    });
                }
                let shared: IndexSet<T::Kind> = left
                    .first()
                    .intersection(&right.first())
                    .copied()
                    .collect();
                if !shared.is_empty() {
                    found.push(Conflict::First {
                        prefix: epsilon(Value::Unit),
                        kinds: shared,
                        node: self.clone(),
                    });
                }
                found.extend(left.conflicts_in(visited));
                found.extend(right.conflicts_in(visited));
                found
            }
            Node::Recursive(rec) => {
                if !visited.insert(rec.id) {
                    return Vec::new();
                }
                let mut found = Vec::new();
                let inner = rec.inner(self);
                if inner.called_left(rec.id) {
                    found.push(Conflict::LeftRecursive {
                        prefix: epsilon(Value::Unit),
                        node: self.clone(),
                    });
                }
                found.extend(inner.conflicts_in(visited));
                found
            }
        }
    }
}
