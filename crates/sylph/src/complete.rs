//! Kind filtering and input completion.
//!
//! Completion asks: which inputs would this parser still accept, and what
//! does it look like after accepting one? Trails supply the kind-sequences,
//! caller-provided samples turn kinds into concrete tokens, and the parse
//! loop replays each candidate to produce the residual.

use std::collections::HashMap;
use std::rc::Rc;

use itertools::Itertools;

use crate::parse::ParseResult;
use crate::syntax::{Node, RecId, Syntax, failure};
use crate::token::{Atom, Token};

impl<T: Token, A: Atom> Syntax<T, A> {
    /// The same term with every `elem` of a rejected kind replaced by
    /// `failure`.
    ///
    /// The graph shape is preserved: each recursive node maps to one fresh
    /// recursive node per `filter` call, memoized by the original identity.
    /// Filtering the same term twice yields two independent terms with
    /// distinct identities.
    pub fn filter(&self, predicate: impl Fn(T::Kind) -> bool + 'static) -> Syntax<T, A> {
        let predicate: Rc<dyn Fn(T::Kind) -> bool> = Rc::new(predicate);
        self.filter_in(&predicate, &mut HashMap::new())
    }

    fn filter_in(
        &self,
        predicate: &Rc<dyn Fn(T::Kind) -> bool>,
        memo: &mut HashMap<RecId, Syntax<T, A>>,
    ) -> Syntax<T, A> {
        match self.node() {
            Node::Success(_) | Node::Failure => self.clone(),
            Node::Elem(kind) => {
                if predicate(*kind) {
                    self.clone()
                } else {
                    failure()
                }
            }
            Node::Transform(transform) => transform
                .inner
                .filter_in(predicate, memo)
                .transform(Rc::clone(&transform.map), transform.inverse.clone()),
            Node::Sequence(left, right) => left
                .filter_in(predicate, memo)
                .then(right.filter_in(predicate, memo)),
            Node::Concat(left, right) => left
                .filter_in(predicate, memo)
                .concat(right.filter_in(predicate, memo)),
            Node::Disjunction(left, right) => left
                .filter_in(predicate, memo)
                .or(right.filter_in(predicate, memo)),
            Node::Recursive(rec) => {
                if let Some(filtered) = memo.get(&rec.id) {
                    return filtered.clone();
                }
                let filtered = Syntax::recursive_unset();
                memo.insert(rec.id, filtered.clone());
                let inner = rec.inner(self).filter_in(predicate, memo);
                filtered.set_recursive_inner(inner);
                filtered
            }
        }
    }

    /// Every parse reachable from this term using the caller's sample
    /// tokens, shortest completions first.
    ///
    /// Trails are drawn from the term restricted to kinds with at least one
    /// sample; each trail expands to the Cartesian product of its kinds'
    /// samples, and each token sequence is replayed against `self`, so the
    /// yielded results carry this term's values and residuals.
    pub fn completions<F>(&self, samples: F) -> impl Iterator<Item = ParseResult<T, A>> + use<T, A, F>
    where
        F: Fn(T::Kind) -> Vec<T> + 'static,
    {
        let samples = Rc::new(samples);
        let restricted = {
            let samples = Rc::clone(&samples);
            self.filter(move |kind| !samples(kind).is_empty())
        };
        let root = self.clone();
        restricted.trails().flat_map(move |trail| {
            let choices: Vec<Vec<T>> = trail.iter().map(|kind| samples(*kind)).collect();
            // multi_cartesian_product yields nothing for an empty set of
            // factors; the empty trail has exactly one expansion.
            let sequences: Box<dyn Iterator<Item = Vec<T>>> = if choices.is_empty() {
                Box::new(std::iter::once(Vec::new()))
            } else {
                Box::new(choices.into_iter().multi_cartesian_product())
            };
            let root = root.clone();
            sequences.map(move |tokens| root.apply(tokens))
        })
    }

    /// The residual parser after the shortest completion `to_token` can
    /// spell, or `failure` when no completion exists.
    pub fn complete(&self, to_token: impl Fn(T::Kind) -> Option<T> + 'static) -> Syntax<T, A> {
        let mut completions =
            self.completions(move |kind| to_token(kind).into_iter().collect::<Vec<T>>());
        match completions.next() {
            Some(ParseResult::Parsed { rest, .. }) => rest,
            _ => {
                log::debug!("no completion reachable");
                failure()
            }
        }
    }
}
