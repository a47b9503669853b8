//! First sets of nonterminals.

use super::{fixpoint, Nullable};
use crate::{
    grammar::{Grammar, SymbolID},
    types::SymbolSet,
    util::get_two_mut,
};

#[derive(Debug, Default)]
pub struct First {
    sets: Vec<SymbolSet>,
}

impl First {
    pub(crate) fn compute(g: &Grammar, nullable: &Nullable) -> Self {
        let mut this = Self {
            sets: vec![SymbolSet::default(); g.num_nts()],
        };
        fixpoint::bottom_up(g.components(), |n| this.analyze(g, nullable, n));
        this
    }

    pub fn get(&self, n: SymbolID) -> &SymbolSet {
        &self.sets[n.index()]
    }

    fn analyze(&mut self, g: &Grammar, nullable: &Nullable, n: SymbolID) -> bool {
        let mut changed = false;
        for production in g.productions(n) {
            for &symbol in production.rhs() {
                if g.is_terminal(symbol) {
                    changed |= self.sets[n.index()].insert(symbol);
                    break;
                }
                if symbol != n {
                    let (slot, added) = get_two_mut(&mut self.sets, n.index(), symbol.index());
                    changed |= slot.union_with(added);
                }
                if !nullable.contains(symbol) {
                    break;
                }
            }
        }
        changed
    }
}
