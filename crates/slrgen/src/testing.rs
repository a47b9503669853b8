//! Compact grammar notation for unit tests.

use crate::{
    grammar::{Elem, Grammar, SymbolID},
    types::Map,
};

/// Build a grammar from lines of the form `LHS : X Y Z | W`.
///
/// Names that appear on a left-hand side are nonterminals, all other names are
/// terminals declared in order of appearance, and `$end` is the end-of-input
/// marker. The first left-hand side is the start symbol.
pub(crate) fn grammar(source: &str) -> Grammar {
    init_tracing();

    let mut rules = vec![];
    for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (lhs, rhs) = line.split_once(':').expect("missing `:'");
        for alternative in rhs.split('|') {
            rules.push((lhs.trim(), alternative.split_whitespace().collect::<Vec<_>>()));
        }
    }

    Grammar::define(|def| {
        let mut nonterminals = Map::default();
        for (lhs, _) in &rules {
            if !nonterminals.contains_key(lhs) {
                let id = def.nonterminal(lhs)?;
                nonterminals.insert(*lhs, id);
            }
        }
        let mut terminals = Map::default();
        for name in rules.iter().flat_map(|(_, rhs)| rhs) {
            if *name != "$end" && !nonterminals.contains_key(name) && !terminals.contains_key(name) {
                let id = def.terminal(name, None)?;
                terminals.insert(*name, id);
            }
        }
        for (lhs, rhs) in &rules {
            let eoi = def.end_of_input();
            let right: Vec<_> = rhs
                .iter()
                .map(|name| match nonterminals.get(name) {
                    Some(&n) => Elem::N(n),
                    None if *name == "$end" => Elem::T(eoi),
                    None => Elem::T(terminals[name]),
                })
                .collect();
            def.rule(nonterminals[lhs], right, None)?;
        }
        Ok(())
    })
    .expect("invalid test grammar")
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Look a symbol up by name.
pub(crate) fn sym(g: &Grammar, name: &str) -> SymbolID {
    g.lookup(name)
        .unwrap_or_else(|| panic!("unknown symbol `{}'", name))
}

/// Names of the symbols in a set, sorted.
pub(crate) fn names<I>(g: &Grammar, ids: I) -> Vec<String>
where
    I: IntoIterator<Item = SymbolID>,
{
    let mut names: Vec<_> = ids.into_iter().map(|id| g.symbol(id).name().to_owned()).collect();
    names.sort();
    names
}
