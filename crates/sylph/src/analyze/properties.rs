//! The property engine.
//!
//! Each property is a least fixpoint over the term graph, computed by a
//! single top-down walk that carries the set of recursive identities open on
//! the current path. Re-entering an open identity returns the property's
//! cycle-base value (the lattice bottom); since every composite rule is
//! monotone over a finite lattice, the walk yields the exact fixpoint at any
//! node entered with no open identities.
//!
//! Recursive nodes cache exactly those public-entry results. Values computed
//! under open identities are under-approximations and are never stored; the
//! cached value, once present, is exact and is used even mid-walk.

use std::cell::OnceCell;
use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet, map::Entry};

use crate::syntax::{Node, RecId, Syntax, epsilon};
use crate::token::{Atom, Token};
use crate::value::Value;

/// Per-kind witness parsers for kinds that must not follow a term.
pub type ShouldNotFollow<T, A> = IndexMap<<T as Token>::Kind, Syntax<T, A>>;

/// Public-entry property results memoized on a recursive node.
pub(crate) struct PropertyCaches<T: Token, A: Atom> {
    nullable: OnceCell<Option<Value<T, A>>>,
    productive: OnceCell<bool>,
    first: OnceCell<IndexSet<T::Kind>>,
    should_not_follow: OnceCell<ShouldNotFollow<T, A>>,
    kinds: OnceCell<IndexSet<T::Kind>>,
}

impl<T: Token, A: Atom> Default for PropertyCaches<T, A> {
    fn default() -> Self {
        PropertyCaches {
            nullable: OnceCell::new(),
            productive: OnceCell::new(),
            first: OnceCell::new(),
            should_not_follow: OnceCell::new(),
            kinds: OnceCell::new(),
        }
    }
}

/// Merge a witness into a should-not-follow map; witnesses for the same kind
/// combine by disjunction.
fn merge_witness<T: Token, A: Atom>(
    into: &mut ShouldNotFollow<T, A>,
    kind: T::Kind,
    witness: Syntax<T, A>,
) {
    match into.entry(kind) {
        Entry::Occupied(mut occupied) => {
            let merged = occupied.get().clone().or(witness);
            occupied.insert(merged);
        }
        Entry::Vacant(vacant) => {
            vacant.insert(witness);
        }
    }
}

impl<T: Token, A: Atom> Syntax<T, A> {
    /// The value this term produces for the empty input, if it accepts it.
    pub fn nullable(&self) -> Option<Value<T, A>> {
        self.nullable_in(&mut HashSet::new())
    }

    fn nullable_in(&self, visited: &mut HashSet<RecId>) -> Option<Value<T, A>> {
        match self.node() {
            Node::Success(value) => Some(value.clone()),
            Node::Failure | Node::Elem(_) => None,
            Node::Transform(transform) => {
                transform.inner.nullable_in(visited).map(|v| (transform.map)(v))
            }
            Node::Sequence(left, right) => {
                let first = left.nullable_in(visited)?;
                let second = right.nullable_in(visited)?;
                Some(Value::pair(first, second))
            }
            Node::Concat(left, right) => {
                let front = left.nullable_in(visited)?;
                let back = right.nullable_in(visited)?;
                Some(Value::concat_seqs(front, back))
            }
            Node::Disjunction(left, right) => left
                .nullable_in(visited)
                .or_else(|| right.nullable_in(visited)),
            Node::Recursive(rec) => {
                if let Some(cached) = rec.caches.nullable.get() {
                    return cached.clone();
                }
                if visited.contains(&rec.id) {
                    return None;
                }
                let entry = visited.is_empty();
                visited.insert(rec.id);
                let result = rec.inner(self).nullable_in(visited);
                visited.remove(&rec.id);
                if entry {
                    let _ = rec.caches.nullable.set(result.clone());
                }
                result
            }
        }
    }

    /// Whether this term accepts any input at all.
    pub fn is_productive(&self) -> bool {
        self.productive_in(&mut HashSet::new())
    }

    fn productive_in(&self, visited: &mut HashSet<RecId>) -> bool {
        match self.node() {
            Node::Success(_) | Node::Elem(_) => true,
            Node::Failure => false,
            Node::Transform(transform) => transform.inner.productive_in(visited),
            Node::Sequence(left, right) | Node::Concat(left, right) => {
                left.productive_in(visited) && right.productive_in(visited)
            }
            Node::Disjunction(left, right) => {
                left.productive_in(visited) || right.productive_in(visited)
            }
            Node::Recursive(rec) => {
                if let Some(cached) = rec.caches.productive.get() {
                    return *cached;
                }
                if visited.contains(&rec.id) {
                    return false;
                }
                let entry = visited.is_empty();
                visited.insert(rec.id);
                let result = rec.inner(self).productive_in(visited);
                visited.remove(&rec.id);
                if entry {
                    let _ = rec.caches.productive.set(result);
                }
                result
            }
        }
    }

    /// The kinds that may start an accepted input.
    pub fn first(&self) -> IndexSet<T::Kind> {
        self.first_in(&mut HashSet::new())
    }

    fn first_in(&self, visited: &mut HashSet<RecId>) -> IndexSet<T::Kind> {
        match self.node() {
            Node::Success(_) | Node::Failure => IndexSet::new(),
            Node::Elem(kind) => IndexSet::from([*kind]),
            Node::Transform(transform) => transform.inner.first_in(visited),
            Node::Sequence(left, right) | Node::Concat(left, right) => {
                let mut first = left.first_in(visited);
                if left.nullable().is_some() {
                    first.extend(right.first_in(visited));
                }
                first
            }
            Node::Disjunction(left, right) => {
                let mut first = left.first_in(visited);
                first.extend(right.first_in(visited));
                first
            }
            Node::Recursive(rec) => {
                if let Some(cached) = rec.caches.first.get() {
                    return cached.clone();
                }
                if visited.contains(&rec.id) {
                    return IndexSet::new();
                }
                let entry = visited.is_empty();
                visited.insert(rec.id);
                let result = rec.inner(self).first_in(visited);
                visited.remove(&rec.id);
                if entry {
                    let _ = rec.caches.first.set(result.clone());
                }
                result
            }
        }
    }

    /// The kinds that must not appear immediately after this term when it
    /// may end here, each mapped to a witness parser accepting the tokens
    /// leading up to the ambiguity.
    pub fn should_not_follow(&self) -> ShouldNotFollow<T, A> {
        self.should_not_follow_in(&mut HashSet::new())
    }

    fn should_not_follow_in(&self, visited: &mut HashSet<RecId>) -> ShouldNotFollow<T, A> {
        match self.node() {
            Node::Success(_) | Node::Failure | Node::Elem(_) => IndexMap::new(),
            Node::Transform(transform) => transform.inner.should_not_follow_in(visited),
            Node::Sequence(left, right) | Node::Concat(left, right) => {
                let mut snf = IndexMap::new();
                for (kind, witness) in right.should_not_follow_in(visited) {
                    merge_witness(&mut snf, kind, left.clone().then(witness));
                }
                if right.nullable().is_some() {
                    for (kind, witness) in left.should_not_follow_in(visited) {
                        merge_witness(&mut snf, kind, witness);
                    }
                }
                snf
            }
            Node::Disjunction(left, right) => {
                let mut snf = left.should_not_follow_in(visited);
                for (kind, witness) in right.should_not_follow_in(visited) {
                    merge_witness(&mut snf, kind, witness);
                }
                // A nullable side makes the other side's FIRST dangerous as
                // follow-up, witnessed by the empty prefix.
                if right.nullable().is_some() {
                    for kind in left.first() {
                        merge_witness(&mut snf, kind, epsilon(Value::Unit));
                    }
                }
                if left.nullable().is_some() {
                    for kind in right.first() {
                        merge_witness(&mut snf, kind, epsilon(Value::Unit));
                    }
                }
                snf
            }
            Node::Recursive(rec) => {
                if let Some(cached) = rec.caches.should_not_follow.get() {
                    return cached.clone();
                }
                if visited.contains(&rec.id) {
                    return IndexMap::new();
                }
                let entry = visited.is_empty();
                visited.insert(rec.id);
                let result = rec.inner(self).should_not_follow_in(visited);
                visited.remove(&rec.id);
                if entry {
                    let _ = rec.caches.should_not_follow.set(result.clone());
                }
                result
            }
        }
    }

    /// All kinds mentioned anywhere in the term graph.
    pub fn kinds(&self) -> IndexSet<T::Kind> {
        self.kinds_in(&mut HashSet::new())
    }

    fn kinds_in(&self, visited: &mut HashSet<RecId>) -> IndexSet<T::Kind> {
        match self.node() {
            Node::Success(_) | Node::Failure => IndexSet::new(),
            Node::Elem(kind) => IndexSet::from([*kind]),
            Node::Transform(transform) => transform.inner.kinds_in(visited),
            Node::Sequence(left, right)
            | Node::Concat(left, right)
            | Node::Disjunction(left, right) => {
                let mut kinds = left.kinds_in(visited);
                kinds.extend(right.kinds_in(visited));
                kinds
            }
            Node::Recursive(rec) => {
                if let Some(cached) = rec.caches.kinds.get() {
                    return cached.clone();
                }
                if visited.contains(&rec.id) {
                    return IndexSet::new();
                }
                let entry = visited.is_empty();
                visited.insert(rec.id);
                let result = rec.inner(self).kinds_in(visited);
                visited.remove(&rec.id);
                if entry {
                    let _ = rec.caches.kinds.set(result.clone());
                }
                result
            }
        }
    }

    /// Whether this term can reach the recursive node `target` without
    /// consuming any input first. On a recursive node's own body this is the
    /// left-recursion test.
    pub(crate) fn called_left(&self, target: RecId) -> bool {
        self.called_left_in(target, &mut HashSet::new())
    }

    fn called_left_in(&self, target: RecId, visited: &mut HashSet<RecId>) -> bool {
        match self.node() {
            Node::Success(_) | Node::Failure | Node::Elem(_) => false,
            Node::Transform(transform) => transform.inner.called_left_in(target, visited),
            Node::Sequence(left, right) | Node::Concat(left, right) => {
                left.called_left_in(target, visited)
                    || (left.nullable().is_some() && right.called_left_in(target, visited))
            }
            Node::Disjunction(left, right) => {
                left.called_left_in(target, visited) || right.called_left_in(target, visited)
            }
            Node::Recursive(rec) => {
                if rec.id == target {
                    return true;
                }
                if visited.contains(&rec.id) {
                    return false;
                }
                visited.insert(rec.id);
                let result = rec.inner(self).called_left_in(target, visited);
                visited.remove(&rec.id);
                result
            }
        }
    }
}
