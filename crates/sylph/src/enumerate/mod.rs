//! Enumeration of accepted inputs.
//!
//! - `trails` - every accepted kind-sequence, in non-decreasing length
//! - `tokens` - every token sequence parsing to a given target value, driven
//!   by transform inverses
//!
//! Both are built on [`Producer`](sylph_producer::Producer): recursion is
//! handled by memoizing the producer bound to each recursive identity behind
//! a deferred indirection, so a grammar's enumeration can feed on its own
//! earlier items instead of expanding the cycle eagerly.

mod tokens;
mod trails;

#[cfg(test)]
mod enumerate_tests;
