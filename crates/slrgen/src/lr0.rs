//! The flat table of LR(0) items.
//!
//! Items are numbered once for the whole grammar. Ids 0 and 1 are the two
//! augmenting items `$accept := . S $end` and `$accept := S . $end`. They
//! are followed, production by production in sequence-number order, by one
//! item for each dot position `1..=len`; an empty production has the single
//! position 0 instead. The position 0 of a non-empty production never gets
//! an id of its own, the automaton moves over the first symbol straight to
//! [`first_kernel`](LR0Items::first_kernel).

use crate::{
    grammar::{Grammar, Production, SymbolID},
    util::display_fn,
};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ItemID(u32);

impl fmt::Debug for ItemID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I#{:03}", self.0)
    }
}

impl ItemID {
    /// `$accept := . S $end`
    pub const START: Self = Self(0);
    /// `$accept := S . $end`
    pub const ACCEPT: Self = Self(1);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        Self(index as u32)
    }
}

/// An LR(0) item, i.e. a production with a dot position.
#[derive(Debug, Copy, Clone)]
pub struct Item<'g> {
    id: ItemID,
    // `None` for the augmenting items.
    production: Option<&'g Production>,
    position: usize,
}

impl<'g> Item<'g> {
    pub fn id(&self) -> ItemID {
        self.id
    }

    pub fn production(&self) -> Option<&'g Production> {
        self.production
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_augmenting(&self) -> bool {
        self.production.is_none()
    }

    /// The left-hand side, `None` for the augmenting items.
    pub fn lhs(&self) -> Option<SymbolID> {
        self.production.map(Production::lhs)
    }

    /// Whether there is a symbol after the dot.
    ///
    /// The accept item has the end-of-input marker after its dot, but it is
    /// never shifted.
    pub fn can_goto(&self) -> bool {
        match self.production {
            Some(production) => self.position < production.rhs().len(),
            None => self.position == 0,
        }
    }

    /// Whether the dot is at the end of a real production.
    pub fn can_reduce(&self) -> bool {
        matches!(self.production, Some(production) if self.position == production.rhs().len())
    }

    pub fn can_accept(&self) -> bool {
        self.production.is_none() && self.position == 1
    }

    /// The symbol after the dot, if the item can move.
    pub fn next_symbol(&self) -> Option<SymbolID> {
        if !self.can_goto() {
            return None;
        }
        match self.production {
            Some(production) => Some(production.rhs()[self.position]),
            None => Some(SymbolID::START),
        }
    }

    /// The item reached by moving over [`next_symbol`](Self::next_symbol).
    pub fn next_item(&self) -> Option<ItemID> {
        self.can_goto()
            .then(|| ItemID::from_index(self.id.index() + 1))
    }

    // `"E := E . + T"`
    pub fn display<'a>(&'a self, g: &'a Grammar) -> impl fmt::Display + 'a {
        display_fn(move |f| {
            let (lhs, rhs): (&str, Vec<SymbolID>) = match self.production {
                Some(production) => (g.symbol(production.lhs()).name(), production.rhs().to_vec()),
                None => ("$accept", vec![g.start(), g.end_of_input()]),
            };
            write!(f, "{} :=", lhs)?;
            for (i, &symbol) in rhs.iter().enumerate() {
                if i == self.position {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol(symbol))?;
            }
            if self.position == rhs.len() {
                f.write_str(" .")?;
            }
            Ok(())
        })
    }
}

/// All LR(0) items of a grammar.
#[derive(Debug)]
pub struct LR0Items<'g> {
    grammar: &'g Grammar,
    items: Vec<Item<'g>>,
    // `first_kernel[n][j]` is the id of the first item of production `j` of `n`.
    first_kernel: Vec<Vec<ItemID>>,
}

impl<'g> LR0Items<'g> {
    pub fn new(g: &'g Grammar) -> Self {
        let mut items = Vec::with_capacity(2 + g.num_productions());
        for position in 0..2 {
            items.push(Item {
                id: ItemID::from_index(position),
                production: None,
                position,
            });
        }

        let mut first_kernel = Vec::with_capacity(g.num_nts());
        for n in g.nonterminals() {
            let mut offsets = Vec::with_capacity(g.productions(n).len());
            for production in g.productions(n) {
                offsets.push(ItemID::from_index(items.len()));
                let first = if production.rhs().is_empty() { 0 } else { 1 };
                for position in first..=production.rhs().len() {
                    items.push(Item {
                        id: ItemID::from_index(items.len()),
                        production: Some(production),
                        position,
                    });
                }
            }
            first_kernel.push(offsets);
        }

        Self {
            grammar: g,
            items,
            first_kernel,
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemID) -> &Item<'g> {
        &self.items[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item<'g>> + '_ {
        self.items.iter()
    }

    /// The item of production `index` of `n` after its first symbol, or the
    /// only item of an empty production.
    pub fn first_kernel(&self, n: SymbolID, index: usize) -> ItemID {
        self.first_kernel[n.index()][index]
    }

    /// The id of the item `(production, position)`, if the table has one.
    pub fn item_id(&self, production: &Production, position: usize) -> Option<ItemID> {
        let len = production.rhs().len();
        let first = self.first_kernel(production.lhs(), production.index());
        match position {
            0 if len == 0 => Some(first),
            p if (1..=len).contains(&p) => Some(ItemID::from_index(first.index() + p - 1)),
            _ => None,
        }
    }

    /// The production and dot position of an item, `None` for the augmenting
    /// items.
    pub fn locate(&self, id: ItemID) -> Option<(&'g Production, usize)> {
        let item = self.item(id);
        item.production.map(|production| (production, item.position))
    }
}
