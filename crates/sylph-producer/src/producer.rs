//! The public producer interface: a cursor over a shared lazy stream.

use std::rc::Rc;

use crate::stream::{Step, Stream};

/// A lazy, potentially infinite sequence of measured items, enumerated in
/// non-decreasing measure order.
///
/// A producer is a cursor: consuming it advances the cursor, while the
/// underlying stream nodes stay shared and memoized. [`duplicate`] yields a
/// second cursor at the same position, independent of this one.
///
/// [`duplicate`]: Producer::duplicate
pub struct Producer<I> {
    cursor: Stream<I>,
}

impl<I: Clone + 'static> Producer<I> {
    /// The producer with no items.
    pub fn empty() -> Self {
        Producer { cursor: Stream::empty() }
    }

    /// The producer holding exactly `item` with the given measure.
    pub fn singleton(measure: usize, item: I) -> Self {
        Producer { cursor: Stream::single(measure, item) }
    }

    /// A producer over `items`, which must already be sorted by measure.
    pub fn from_sorted(items: Vec<(usize, I)>) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0].0 <= w[1].0));
        let mut cursor = Stream::empty();
        for (measure, item) in items.into_iter().rev() {
            cursor = Stream::emit(measure, item, cursor);
        }
        Producer { cursor }
    }

    /// A producer resolved on first demand.
    ///
    /// The thunk runs when the first item is requested; until then the
    /// producer reports a measure lower bound of zero. This is the
    /// indirection used to let a producer participate in its own definition:
    /// store the finished producer in a shared slot and have the thunk
    /// duplicate it.
    pub fn deferred(resolve: impl FnOnce() -> Producer<I> + 'static) -> Self {
        Producer {
            cursor: Stream::deferred(0, move || resolve().cursor.force()),
        }
    }

    /// A second cursor at the current position.
    ///
    /// Both cursors enumerate the same remaining items; items forced by one
    /// are memoized for the other.
    pub fn duplicate(&self) -> Self {
        Producer { cursor: self.cursor.clone() }
    }

    /// Merge with `other`, preserving non-decreasing measure order.
    ///
    /// When both sides offer an item of the same measure, `self`'s item is
    /// emitted first.
    pub fn union(self, other: Producer<I>) -> Self {
        Producer { cursor: Stream::union(self.cursor, other.cursor) }
    }

    /// Join every pair of items from `self` and `other`.
    ///
    /// `join` must be measure-additive: the measure of `join(x, y)` is taken
    /// to be the sum of the measures of `x` and `y`. Results are emitted in
    /// non-decreasing measure order.
    pub fn product(self, other: Producer<I>, join: impl Fn(&I, &I) -> I + 'static) -> Self {
        Producer {
            cursor: Stream::product(self.cursor, other.cursor, Rc::new(join)),
        }
    }

    /// Apply `map` to every item, shifting every measure by `delta`.
    pub fn map(self, delta: usize, map: impl Fn(&I) -> I + 'static) -> Self {
        Producer { cursor: self.cursor.map(delta, Rc::new(map)) }
    }
}

impl<I: Clone + 'static> Iterator for Producer<I> {
    type Item = I;

    fn next(&mut self) -> Option<I> {
        match self.cursor.force() {
            Step::Done => None,
            Step::Emit { item, rest, .. } => {
                self.cursor = rest;
                Some(item)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::Producer;

    fn chars(items: &[(usize, &str)]) -> Producer<String> {
        Producer::from_sorted(items.iter().map(|(m, s)| (*m, s.to_string())).collect())
    }

    #[test]
    fn empty_yields_nothing() {
        assert_eq!(Producer::<String>::empty().next(), None);
    }

    #[test]
    fn singleton_yields_once() {
        let mut p = Producer::singleton(3, "x".to_string());
        assert_eq!(p.next().as_deref(), Some("x"));
        assert_eq!(p.next(), None);
    }

    #[test]
    fn union_merges_by_measure() {
        let merged = chars(&[(0, "a"), (2, "c")]).union(chars(&[(1, "b"), (3, "d")]));
        assert_eq!(merged.collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn union_prefers_left_on_ties() {
        let merged = chars(&[(1, "l")]).union(chars(&[(1, "r")]));
        assert_eq!(merged.collect::<Vec<_>>(), vec!["l", "r"]);
    }

    #[test]
    fn product_joins_in_measure_order() {
        let a = chars(&[(1, "x"), (2, "y")]);
        let b = chars(&[(1, "u"), (2, "v")]);
        let joined = a.product(b, |l, r| format!("{l}{r}"));
        // Measures: xu=2, xv=3, yu=3, yv=4; ties resolve to the earlier left item.
        assert_eq!(joined.collect::<Vec<_>>(), vec!["xu", "xv", "yu", "yv"]);
    }

    #[test]
    fn product_with_empty_side_is_empty() {
        let a = chars(&[(1, "x")]);
        assert_eq!(a.product(Producer::empty(), |l, _| l.clone()).next(), None);
    }

    #[test]
    fn duplicate_cursors_are_independent() {
        let p = chars(&[(0, "a"), (1, "b")]);
        let d = p.duplicate();
        assert_eq!(p.collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(d.collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn deferred_resolves_on_demand() {
        let resolved = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&resolved);
        let mut p = Producer::deferred(move || {
            *flag.borrow_mut() = true;
            Producer::singleton(0, 7)
        });
        assert!(!*resolved.borrow());
        assert_eq!(p.next(), Some(7));
        assert!(*resolved.borrow());
    }

    /// The stream of all `1^n` built from its own duplicate, the shape the
    /// trail enumerator uses for recursive grammars.
    fn unary_counts() -> Producer<Vec<u8>> {
        let slot: Rc<RefCell<Option<Producer<Vec<u8>>>>> = Rc::new(RefCell::new(None));
        let backref = {
            let slot = Rc::clone(&slot);
            Producer::deferred(move || slot.borrow().as_ref().unwrap().duplicate())
        };
        let counts = Producer::singleton(0, Vec::new()).union(backref.map(1, |v| {
            let mut v = v.clone();
            v.push(1);
            v
        }));
        *slot.borrow_mut() = Some(counts.duplicate());
        counts
    }

    #[test]
    fn self_referential_producer_enumerates_lazily() {
        let prefix: Vec<Vec<u8>> = unary_counts().take(4).collect();
        assert_eq!(prefix, vec![vec![], vec![1], vec![1, 1], vec![1, 1, 1]]);
    }

    #[test]
    fn self_referential_product_stays_sorted() {
        let lengths: Vec<usize> = unary_counts()
            .product(unary_counts(), |a, b| {
                let mut out = a.clone();
                out.extend_from_slice(b);
                out
            })
            .take(12)
            .map(|v| v.len())
            .collect();
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    #[should_panic(expected = "deferred stream re-entered")]
    fn unguarded_self_reference_panics() {
        let slot: Rc<RefCell<Option<Producer<u8>>>> = Rc::new(RefCell::new(None));
        let p = {
            let slot = Rc::clone(&slot);
            Producer::deferred(move || slot.borrow().as_ref().unwrap().duplicate())
        };
        *slot.borrow_mut() = Some(p.duplicate());
        let mut p = p;
        p.next();
    }
}
