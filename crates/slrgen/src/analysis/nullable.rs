//! Nullable nonterminals, those that derive the empty string.

use super::fixpoint;
use crate::grammar::{Grammar, SymbolID};
use bit_vec::BitVec;

#[derive(Debug, Default)]
pub struct Nullable {
    nullable: BitVec,
    // cleared once a nonterminal is decided either way
    consider: BitVec,
}

impl Nullable {
    pub(crate) fn compute(g: &Grammar) -> Self {
        let mut this = Self {
            nullable: BitVec::from_elem(g.num_nts(), false),
            consider: BitVec::from_elem(g.num_nts(), true),
        };
        fixpoint::bottom_up(g.components(), |n| this.analyze(g, n));
        this
    }

    /// Whether `id` derives the empty string. Always false for terminals.
    pub fn contains(&self, id: SymbolID) -> bool {
        self.nullable.get(id.index()).unwrap_or(false)
    }

    fn undecided(&self, id: SymbolID) -> bool {
        self.consider.get(id.index()).unwrap_or(false)
    }

    fn analyze(&mut self, g: &Grammar, n: SymbolID) -> bool {
        if !self.undecided(n) {
            return false;
        }

        let productions = g.productions(n);
        let mut blocked = 0;
        for production in productions {
            match production.rhs().iter().find(|&&s| !self.contains(s)) {
                None => {
                    self.nullable.set(n.index(), true);
                    self.consider.set(n.index(), false);
                    return true;
                }
                Some(&s) => {
                    if g.is_terminal(s) || !self.undecided(s) {
                        blocked += 1;
                    }
                }
            }
        }

        if blocked == productions.len() {
            self.consider.set(n.index(), false);
        }
        false
    }
}
