//! Fixed-point iteration over strongly-connected components.
//!
//! `analyze(n)` recomputes the facts of nonterminal `n` and reports whether
//! anything grew. It must be monotone, i.e. only ever add facts, which bounds
//! the number of passes. Within a component every member is analyzed until a
//! full pass yields no change; across components the traversal order makes
//! sure that the facts a member depends on outside its own component have
//! already converged.

use crate::grammar::SymbolID;

/// Visit the components in dependency order: a nonterminal is analyzed after
/// every nonterminal its productions reference.
pub fn bottom_up<F>(components: &[Vec<SymbolID>], mut analyze: F)
where
    F: FnMut(SymbolID) -> bool,
{
    for component in components {
        converge(component, &mut analyze);
    }
}

/// Visit the components in reverse dependency order: a nonterminal is
/// analyzed after every nonterminal whose productions reference it.
pub fn top_down<F>(components: &[Vec<SymbolID>], mut analyze: F)
where
    F: FnMut(SymbolID) -> bool,
{
    for component in components.iter().rev() {
        converge(component, &mut analyze);
    }
}

fn converge<F>(component: &[SymbolID], analyze: &mut F)
where
    F: FnMut(SymbolID) -> bool,
{
    let mut passes = 0usize;
    loop {
        passes += 1;
        let mut changed = false;
        for &n in component {
            changed |= analyze(n);
        }
        if !changed {
            break;
        }
    }
    tracing::trace!("component {:?} converged after {} passes", component, passes);
}
