//! Finitary nonterminals, those that derive at least one finite terminal
//! string. A nonterminal that is not finitary is non-productive.

use super::fixpoint;
use crate::grammar::{Grammar, SymbolID};
use bit_vec::BitVec;

#[derive(Debug, Default)]
pub struct Finitary {
    finitary: BitVec,
    consider: BitVec,
}

impl Finitary {
    pub(crate) fn compute(g: &Grammar) -> Self {
        let mut this = Self {
            finitary: BitVec::from_elem(g.num_nts(), false),
            consider: BitVec::from_elem(g.num_nts(), true),
        };
        fixpoint::bottom_up(g.components(), |n| this.analyze(g, n));
        this
    }

    /// Whether the nonterminal `n` is finitary. Terminals are handled by
    /// [`Grammar::finitary`].
    pub fn contains(&self, n: SymbolID) -> bool {
        self.finitary.get(n.index()).unwrap_or(false)
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
            let stuck = production
                .rhs()
                .iter()
                .find(|&&s| !g.is_terminal(s) && !self.contains(s));
            match stuck {
                None => {
                    self.finitary.set(n.index(), true);
                    self.consider.set(n.index(), false);
                    return true;
                }
                Some(&s) => {
                    if !self.undecided(s) {
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
