//! Follow sets of nonterminals.

use super::{fixpoint, First, Nullable};
use crate::{
    grammar::{Grammar, SymbolID},
    types::SymbolSet,
    util::get_two_mut,
};

#[derive(Debug, Default)]
pub struct Follow {
    sets: Vec<SymbolSet>,
}

impl Follow {
    pub(crate) fn compute(g: &Grammar, nullable: &Nullable, first: &First) -> Self {
        let mut this = Self {
            sets: vec![SymbolSet::default(); g.num_nts()],
        };
        this.sets[g.start().index()].insert(g.end_of_input());
        fixpoint::top_down(g.components(), |n| this.analyze(g, nullable, first, n));
        this
    }

    pub fn get(&self, n: SymbolID) -> &SymbolSet {
        &self.sets[n.index()]
    }

    fn analyze(&mut self, g: &Grammar, nullable: &Nullable, first: &First, n: SymbolID) -> bool {
        let mut changed = false;
        for production in g.productions(n) {
            let rhs = production.rhs();
            for (k, &x) in rhs.iter().enumerate() {
                if !g.is_nonterminal(x) {
                    continue;
                }

                let mut exhausted = true;
                for &y in &rhs[k + 1..] {
                    if g.is_terminal(y) {
                        changed |= self.sets[x.index()].insert(y);
                        exhausted = false;
                        break;
                    }
                    changed |= self.sets[x.index()].union_with(first.get(y));
                    if !nullable.contains(y) {
                        exhausted = false;
                        break;
                    }
                }

                if exhausted && x != n {
                    let (slot, added) = get_two_mut(&mut self.sets, x.index(), n.index());
                    changed |= slot.union_with(added);
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{grammar, names, sym};

    #[test]
    fn end_marker_flows_through_nullable_tail() {
        let g = grammar(
            "
            S : A $end
            A : a A |
            ",
        );
        assert!(g.follow(sym(&g, "A")).contains(g.end_of_input()));
        assert_eq!(names(&g, g.follow(sym(&g, "A")).iter()), ["$end"]);
        assert_eq!(names(&g, g.follow(sym(&g, "S")).iter()), ["$end"]);
    }

    #[test]
    fn arithmetic() {
        let g = grammar(
            "
            E : E + T | T
            T : T * F | F
            F : ( E ) | id
            ",
        );
        assert_eq!(names(&g, g.follow(sym(&g, "E")).iter()), ["$end", ")", "+"]);
        assert_eq!(names(&g, g.follow(sym(&g, "T")).iter()), ["$end", ")", "*", "+"]);
        assert_eq!(names(&g, g.follow(sym(&g, "F")).iter()), ["$end", ")", "*", "+"]);
    }

    #[test]
    fn first_of_nullable_successors() {
        let g = grammar(
            "
            S : A B C d
            A : a
            B : b |
            C : c |
            ",
        );
        assert_eq!(names(&g, g.follow(sym(&g, "A")).iter()), ["b", "c", "d"]);
        assert_eq!(names(&g, g.follow(sym(&g, "B")).iter()), ["c", "d"]);
    }

    #[test]
    fn idempotent_after_convergence() {
        let g = grammar(
            "
            S : A S | A
            A : a B
            B : S b |
            ",
        );
        let nullable = Nullable::compute(&g);
        let first = First::compute(&g, &nullable);
        let mut follow = Follow::compute(&g, &nullable, &first);
        for n in g.nonterminals() {
            assert!(!follow.analyze(&g, &nullable, &first, n));
        }
    }
}
