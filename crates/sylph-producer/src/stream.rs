//! Shared lazy streams backing [`Producer`](crate::Producer).
//!
//! A stream is a memoized lazy list of measured items. Cloning a stream
//! clones a handle to the same nodes, so independent consumers share every
//! forced prefix. Each unforced node carries a static lower bound on the
//! measure of its next item; `union` consults bounds before forcing, which is
//! what keeps self-referential streams from demanding their own next item.

use std::cell::RefCell;
use std::rc::Rc;

/// Bound reported by streams known to hold no further items.
pub(crate) const EXHAUSTED: usize = usize::MAX;

/// One forced observation of a stream.
pub(crate) enum Step<I> {
    Done,
    Emit { measure: usize, item: I, rest: Stream<I> },
}

impl<I: Clone> Clone for Step<I> {
    fn clone(&self) -> Self {
        match self {
            Step::Done => Step::Done,
            Step::Emit { measure, item, rest } => Step::Emit {
                measure: *measure,
                item: item.clone(),
                rest: rest.clone(),
            },
        }
    }
}

enum State<I> {
    Deferred(Box<dyn FnOnce() -> Step<I>>),
    Forcing,
    Forced(Step<I>),
}

struct Node<I> {
    /// Lower bound on the measure of the next item, valid without forcing.
    bound: usize,
    state: RefCell<State<I>>,
}

pub(crate) struct Stream<I>(Rc<Node<I>>);

impl<I> Clone for Stream<I> {
    fn clone(&self) -> Self {
        Stream(Rc::clone(&self.0))
    }
}

impl<I: Clone + 'static> Stream<I> {
    pub(crate) fn empty() -> Self {
        Stream(Rc::new(Node {
            bound: EXHAUSTED,
            state: RefCell::new(State::Forced(Step::Done)),
        }))
    }

    pub(crate) fn emit(measure: usize, item: I, rest: Stream<I>) -> Self {
        Stream(Rc::new(Node {
            bound: measure,
            state: RefCell::new(State::Forced(Step::Emit { measure, item, rest })),
        }))
    }

    pub(crate) fn single(measure: usize, item: I) -> Self {
        Self::emit(measure, item, Self::empty())
    }

    pub(crate) fn deferred(bound: usize, thunk: impl FnOnce() -> Step<I> + 'static) -> Self {
        Stream(Rc::new(Node {
            bound,
            state: RefCell::new(State::Deferred(Box::new(thunk))),
        }))
    }

    pub(crate) fn bound(&self) -> usize {
        self.0.bound
    }

    /// Force the head of the stream, memoizing the result.
    ///
    /// Panics if the node is already being forced: the next item would then
    /// depend on itself, so no finite amount of work can produce it.
    pub(crate) fn force(&self) -> Step<I> {
        let mut state = self.0.state.borrow_mut();
        match &*state {
            State::Forced(step) => step.clone(),
            State::Forcing => panic!("deferred stream re-entered during its own evaluation"),
            State::Deferred(_) => {
                let State::Deferred(thunk) = std::mem::replace(&mut *state, State::Forcing) else {
                    unreachable!()
                };
                drop(state);
                let step = thunk();
                *self.0.state.borrow_mut() = State::Forced(step.clone());
                step
            }
        }
    }

    /// Apply `map` to every item, shifting each measure by `delta`.
    pub(crate) fn map(self, delta: usize, map: Rc<dyn Fn(&I) -> I>) -> Stream<I> {
        let bound = self.bound().saturating_add(delta);
        Stream::deferred(bound, move || match self.force() {
            Step::Done => Step::Done,
            Step::Emit { measure, item, rest } => Step::Emit {
                measure: measure + delta,
                item: map(&item),
                rest: rest.map(delta, map),
            },
        })
    }

    /// Merge two measure-sorted streams into one, left-biased on ties.
    pub(crate) fn union(a: Stream<I>, b: Stream<I>) -> Stream<I> {
        let bound = a.bound().min(b.bound());
        Stream::deferred(bound, move || Self::union_step(a, b))
    }

    fn union_step(a: Stream<I>, b: Stream<I>) -> Step<I> {
        // Force the side whose bound is lower; the other side is only forced
        // once the first side can no longer be known to win. Forcing is
        // memoized, so a side forced here and yielded later costs nothing.
        if a.bound() <= b.bound() {
            match a.force() {
                Step::Done => b.force(),
                Step::Emit { measure, item, rest } => {
                    if measure <= b.bound() {
                        return Step::Emit { measure, item, rest: Self::union(rest, b) };
                    }
                    Self::union_forced(Step::Emit { measure, item, rest }, &a, b)
                }
            }
        } else {
            match b.force() {
                Step::Done => a.force(),
                Step::Emit { measure, item, rest } => {
                    if measure < a.bound() {
                        return Step::Emit { measure, item, rest: Self::union(a, rest) };
                    }
                    Self::union_forced(a.force(), &a, b)
                }
            }
        }
    }

    /// Decide between a forced left head and the (possibly forced) right side.
    fn union_forced(left: Step<I>, a: &Stream<I>, b: Stream<I>) -> Step<I> {
        let Step::Emit { measure, item, rest } = left else {
            return b.force();
        };
        match b.force() {
            Step::Done => Step::Emit { measure, item, rest },
            Step::Emit { measure: mb, item: ib, rest: rb } => {
                if measure <= mb {
                    Step::Emit { measure, item, rest: Self::union(rest, b) }
                } else {
                    Step::Emit { measure: mb, item: ib, rest: Self::union(a.clone(), rb) }
                }
            }
        }
    }

    /// Pairwise join of two sorted streams, sorted by the sum of measures.
    ///
    /// For the head `x` of `a`, the joins `x · b` form one sorted stream;
    /// merging it with the product of the rest of `a` keeps the whole result
    /// sorted, and bounds keep the recursion from forcing items that cannot
    /// yet be emitted.
    pub(crate) fn product(a: Stream<I>, b: Stream<I>, join: Rc<dyn Fn(&I, &I) -> I>) -> Stream<I> {
        let bound = a.bound().saturating_add(b.bound());
        Stream::deferred(bound, move || {
            let Step::Emit { measure: ma, item: x, rest: ra } = a.force() else {
                return Step::Done;
            };
            if let Step::Done = b.force() {
                return Step::Done;
            }
            let with_x = {
                let join = Rc::clone(&join);
                b.clone().map(ma, Rc::new(move |y: &I| join(&x, y)))
            };
            let rest = Self::product(ra, b, join);
            Self::union_step(with_x, rest)
        })
    }
}
