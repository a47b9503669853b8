//! Left sets: the nonterminals that can appear leftmost in a derivation.

use super::fixpoint;
use crate::{
    grammar::{Grammar, SymbolID},
    types::SymbolSet,
    util::get_two_mut,
};

#[derive(Debug, Default)]
pub struct Left {
    sets: Vec<SymbolSet>,
}

impl Left {
    pub(crate) fn compute(g: &Grammar) -> Self {
        let mut this = Self {
            sets: g.nonterminals().map(|n| Some(n).into_iter().collect()).collect(),
        };
        fixpoint::bottom_up(g.components(), |n| this.analyze(g, n));
        this
    }

    pub fn get(&self, n: SymbolID) -> &SymbolSet {
        &self.sets[n.index()]
    }

    fn analyze(&mut self, g: &Grammar, n: SymbolID) -> bool {
        let mut changed = false;
        for production in g.productions(n) {
            match production.rhs().first() {
                Some(&m) if g.is_nonterminal(m) && m != n => {
                    let (slot, added) = get_two_mut(&mut self.sets, n.index(), m.index());
                    changed |= slot.union_with(added);
                }
                _ => (),
            }
        }
        changed
    }
}
