//! Trail enumeration: the accepted kind-sequences of a term.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sylph_producer::Producer;

use crate::syntax::{Node, RecId, Syntax};
use crate::token::{Atom, Token};

fn concat_trails<K: Clone>(front: &Vec<K>, back: &Vec<K>) -> Vec<K> {
    let mut joined = front.clone();
    joined.extend(back.iter().cloned());
    joined
}

impl<T: Token, A: Atom> Syntax<T, A> {
    /// Every kind-sequence this term accepts, in non-decreasing length.
    ///
    /// The producer is lazy: enumerating the first items of an infinite
    /// grammar does finite work. Enumeration of a grammar that re-enters a
    /// recursion without consuming (a left-recursive definition) is
    /// unspecified and may panic instead of diverging.
    pub fn trails(&self) -> Producer<Vec<T::Kind>> {
        self.trails_in(&mut HashMap::new())
    }

    fn trails_in(
        &self,
        memo: &mut HashMap<RecId, Producer<Vec<T::Kind>>>,
    ) -> Producer<Vec<T::Kind>> {
        match self.node() {
            Node::Success(_) => Producer::singleton(0, Vec::new()),
            Node::Failure => Producer::empty(),
            Node::Elem(kind) => Producer::singleton(1, vec![*kind]),
            Node::Transform(transform) => transform.inner.trails_in(memo),
            Node::Sequence(left, right) | Node::Concat(left, right) => left
                .trails_in(memo)
                .product(right.trails_in(memo), concat_trails),
            Node::Disjunction(left, right) => {
                left.trails_in(memo).union(right.trails_in(memo))
            }
            Node::Recursive(rec) => {
                if let Some(producer) = memo.get(&rec.id) {
                    return producer.duplicate();
                }
                // A recursion accepting nothing enumerates nothing; skipping
                // it here also keeps its empty cycle out of the producers.
                if !self.is_productive() {
                    return Producer::empty();
                }
                let slot: Rc<RefCell<Option<Producer<Vec<T::Kind>>>>> =
                    Rc::new(RefCell::new(None));
                let placeholder = {
                    let slot = Rc::clone(&slot);
                    Producer::deferred(move || {
                        slot.borrow()
                            .as_ref()
                            .expect("recursive trail producer consumed during construction")
                            .duplicate()
                    })
                };
                memo.insert(rec.id, placeholder);
                let trails = rec.inner(self).trails_in(memo);
                *slot.borrow_mut() = Some(trails.duplicate());
                trails
            }
        }
    }
}
