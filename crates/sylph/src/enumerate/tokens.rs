//! Reverse token enumeration: the inputs that parse to a given value.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sylph_producer::Producer;

use crate::syntax::{Node, RecId, Syntax};
use crate::token::{Atom, Token};
use crate::value::Value;

/// Producers memoized per recursive identity and target value. Targets are
/// matched by structural equality, so entries form a small association list.
type Memo<T, A> = HashMap<RecId, Vec<(Value<T, A>, Producer<Vec<T>>)>>;

fn concat_tokens<T: Clone>(front: &Vec<T>, back: &Vec<T>) -> Vec<T> {
    let mut joined = front.clone();
    joined.extend(back.iter().cloned());
    joined
}

impl<T: Token, A: Atom> Syntax<T, A> {
    /// Every token sequence that parses to `target`, in non-decreasing
    /// length.
    ///
    /// Candidates flow backwards through each transform's inverse; a
    /// transform built without an inverse contributes nothing. For an LL(1)
    /// term with correct inverses, every enumerated sequence parses back to
    /// `target`.
    pub fn tokens_of(&self, target: &Value<T, A>) -> Producer<Vec<T>> {
        self.tokens_in(target, &mut HashMap::new())
    }

    fn tokens_in(&self, target: &Value<T, A>, memo: &mut Memo<T, A>) -> Producer<Vec<T>> {
        match self.node() {
            Node::Success(value) => {
                if value == target {
                    Producer::singleton(0, Vec::new())
                } else {
                    Producer::empty()
                }
            }
            Node::Failure => Producer::empty(),
            Node::Elem(kind) => match target.as_token() {
                Some(token) if token.kind() == *kind => {
                    Producer::singleton(1, vec![token.clone()])
                }
                _ => Producer::empty(),
            },
            Node::Transform(transform) => {
                let Some(inverse) = &transform.inverse else {
                    return Producer::empty();
                };
                inverse(target)
                    .into_iter()
                    .map(|candidate| transform.inner.tokens_in(&candidate, memo))
                    .fold(Producer::empty(), Producer::union)
            }
            Node::Sequence(left, right) => match target.as_pair() {
                Some((first, second)) => left
                    .tokens_in(first, memo)
                    .product(right.tokens_in(second, memo), concat_tokens),
                None => Producer::empty(),
            },
            Node::Concat(left, right) => match target.as_seq() {
                Some(items) => (0..=items.len())
                    .map(|split| {
                        let front = Value::Seq(items[..split].to_vec());
                        let back = Value::Seq(items[split..].to_vec());
                        left.tokens_in(&front, memo)
                            .product(right.tokens_in(&back, memo), concat_tokens)
                    })
                    .fold(Producer::empty(), Producer::union),
                None => Producer::empty(),
            },
            Node::Disjunction(left, right) => left
                .tokens_in(target, memo)
                .union(right.tokens_in(target, memo)),
            Node::Recursive(rec) => {
                if let Some(entries) = memo.get(&rec.id)
                    && let Some((_, producer)) =
                        entries.iter().find(|(candidate, _)| candidate == target)
                {
                    return producer.duplicate();
                }
                if !self.is_productive() {
                    return Producer::empty();
                }
                let slot: Rc<RefCell<Option<Producer<Vec<T>>>>> = Rc::new(RefCell::new(None));
                let placeholder = {
                    let slot = Rc::clone(&slot);
                    Producer::deferred(move || {
                        slot.borrow()
                            .as_ref()
                            .expect("recursive token producer consumed during construction")
                            .duplicate()
                    })
                };
                memo.entry(rec.id)
                    .or_default()
                    .push((target.clone(), placeholder));
                let tokens = rec.inner(self).tokens_in(target, memo);
                *slot.borrow_mut() = Some(tokens.duplicate());
                tokens
            }
        }
    }
}
