//! Dataflow analyses over the nonterminals of a grammar.
//!
//! Every analysis is a monotone fixed point driven by [`fixpoint`] over the
//! strongly-connected components of the dependency graph. The results are
//! computed once, when the [`Grammar`] is built, in the order
//! Nullable, Finitary, Left, First, Follow.

pub mod finitary;
pub mod first;
pub mod fixpoint;
pub mod follow;
pub mod left;
pub mod nullable;

pub use self::{
    finitary::Finitary, first::First, follow::Follow, left::Left, nullable::Nullable,
};

use crate::grammar::Grammar;

#[derive(Debug, Default)]
pub(crate) struct Analyses {
    pub(crate) nullable: Nullable,
    pub(crate) finitary: Finitary,
    pub(crate) left: Left,
    pub(crate) first: First,
    pub(crate) follow: Follow,
}

impl Analyses {
    #[tracing::instrument(skip_all)]
    pub(crate) fn compute(g: &Grammar) -> Self {
        let nullable = Nullable::compute(g);
        let finitary = Finitary::compute(g);
        let left = Left::compute(g);
        let first = First::compute(g, &nullable);
        let follow = Follow::compute(g, &nullable, &first);
        Self {
            nullable,
            finitary,
            left,
            first,
            follow,
        }
    }
}
