//! The LR(0) automaton and its lookahead sets.

use crate::{
    grammar::{Grammar, Production, SymbolID},
    lr0::{Item, ItemID, LR0Items},
    types::{Map, Set, SymbolSet},
    util::display_fn,
    Mode,
};
use std::{collections::VecDeque, fmt};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID(u32);

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

impl StateID {
    /// The state whose kernel is `$accept := . S $end`.
    pub const INITIAL: Self = Self(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        Self(index as u32)
    }
}

/// A state of the LR(0) automaton.
#[derive(Debug)]
pub struct State {
    // kernel items first, then the empty productions of the closure
    items: Vec<ItemID>,
    num_kernels: usize,
    shifts: Vec<StateID>,
    gotos: Vec<StateID>,
    reduces: Vec<usize>,
    entry: Option<SymbolID>,
}

impl State {
    pub fn items(&self) -> &[ItemID] {
        &self.items
    }

    pub fn kernels(&self) -> &[ItemID] {
        &self.items[..self.num_kernels]
    }

    /// Successors on terminals.
    pub fn shifts(&self) -> &[StateID] {
        &self.shifts
    }

    /// Successors on nonterminals.
    pub fn gotos(&self) -> &[StateID] {
        &self.gotos
    }

    /// Positions in [`items`](Self::items) of the items that can reduce.
    pub fn reduces(&self) -> &[usize] {
        &self.reduces
    }

    /// The symbol every transition into this state is labelled with, `None`
    /// for the initial state.
    pub fn entry(&self) -> Option<SymbolID> {
        self.entry
    }
}

/// The canonical collection of LR(0) states.
#[derive(Debug)]
pub struct Machine<'g> {
    items: LR0Items<'g>,
    states: Vec<State>,
}

impl<'g> Machine<'g> {
    #[tracing::instrument(skip_all)]
    pub fn new(g: &'g Grammar) -> Self {
        let items = LR0Items::new(g);

        let mut states = Vec::<State>::new();
        let mut isocores = Map::<Vec<ItemID>, StateID>::default();
        let mut pending = VecDeque::<(StateID, Vec<ItemID>, Option<SymbolID>)>::new();
        isocores.insert(vec![ItemID::START], StateID::INITIAL);
        pending.push_back((StateID::INITIAL, vec![ItemID::START], None));

        let mut new_kernels = Map::<SymbolID, Set<ItemID>>::default();
        while let Some((current, kernels, entry)) = pending.pop_front() {
            debug_assert_eq!(current.index(), states.len());

            new_kernels.clear();
            let mut closure = SymbolSet::default();
            for &id in &kernels {
                let item = items.item(id);
                if let (Some(symbol), Some(next)) = (item.next_symbol(), item.next_item()) {
                    if g.is_nonterminal(symbol) {
                        closure.union_with(g.left(symbol));
                    }
                    new_kernels.entry(symbol).or_default().insert(next);
                }
            }

            let num_kernels = kernels.len();
            let mut state_items = kernels;
            for n in closure.iter() {
                for production in g.productions(n) {
                    let first = items.first_kernel(n, production.index());
                    match production.rhs().first() {
                        Some(&symbol) => {
                            new_kernels.entry(symbol).or_default().insert(first);
                        }
                        None => state_items.push(first),
                    }
                }
            }

            let mut shifts = vec![];
            let mut gotos = vec![];
            for (symbol, kernel) in new_kernels.drain(..) {
                let mut kernel: Vec<_> = kernel.into_iter().collect();
                kernel.sort_unstable();
                let next = match isocores.get(&kernel) {
                    Some(&id) => id,
                    None => {
                        let id = StateID::from_index(isocores.len());
                        isocores.insert(kernel.clone(), id);
                        pending.push_back((id, kernel, Some(symbol)));
                        id
                    }
                };
                if g.is_terminal(symbol) {
                    shifts.push(next);
                } else {
                    gotos.push(next);
                }
            }

            let reduces = state_items
                .iter()
                .enumerate()
                .filter(|&(_, &id)| items.item(id).can_reduce())
                .map(|(i, _)| i)
                .collect();

            states.push(State {
                items: state_items,
                num_kernels,
                shifts,
                gotos,
                reduces,
                entry,
            });
        }

        tracing::debug!("{} items, {} states", items.len(), states.len());

        Self { items, states }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.items.grammar()
    }

    pub fn items(&self) -> &LR0Items<'g> {
        &self.items
    }

    pub fn item(&self, id: ItemID) -> &Item<'g> {
        self.items.item(id)
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.index()]
    }

    pub fn states(&self) -> impl Iterator<Item = (StateID, &State)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| (StateID::from_index(i), state))
    }

    pub fn entry(&self, id: StateID) -> Option<SymbolID> {
        self.state(id).entry
    }

    /// The successor of `id` on the nonterminal `symbol`.
    pub fn goto(&self, id: StateID, symbol: SymbolID) -> Option<StateID> {
        self.state(id)
            .gotos
            .iter()
            .copied()
            .find(|&next| self.entry(next) == Some(symbol))
    }

    /// The item of the `index`-th reduce of a state.
    pub fn reduce_item(&self, id: StateID, index: usize) -> &Item<'g> {
        let state = self.state(id);
        self.item(state.items[state.reduces[index]])
    }

    pub fn reduce_production(&self, id: StateID, index: usize) -> &'g Production {
        match self.reduce_item(id, index).production() {
            Some(production) => production,
            None => unreachable!("augmenting items never reduce"),
        }
    }

    pub fn display_state(&self, id: StateID) -> impl fmt::Display + '_ {
        display_fn(move |f| {
            let g = self.grammar();
            let state = self.state(id);
            writeln!(f, "#### State {:?}", id)?;
            writeln!(f, "## items:")?;
            for &item in state.items() {
                writeln!(f, "- {}", self.item(item).display(g))?;
            }
            for &next in state.shifts.iter().chain(&state.gotos) {
                if let Some(symbol) = self.entry(next) {
                    writeln!(f, "- {} => {:?}", g.symbol(symbol), next)?;
                }
            }
            Ok(())
        })
    }
}

/// The terminals under which each reduce of a state is valid.
#[derive(Debug)]
pub enum Lookahead {
    /// Every reduce is valid on every terminal.
    LR0(SymbolSet),
    /// `sets[state][reduce]`, the Follow set of the reduced nonterminal.
    SLR(Vec<Vec<SymbolSet>>),
}

/// An LR(0) automaton together with the lookahead of its reduces.
#[derive(Debug)]
pub struct LookaheadMachine<'g> {
    machine: Machine<'g>,
    lookahead: Lookahead,
}

impl<'g> LookaheadMachine<'g> {
    pub fn new(machine: Machine<'g>, mode: Mode) -> Self {
        match mode {
            Mode::LR0 => Self::lr0(machine),
            Mode::SLR => Self::slr(machine),
        }
    }

    pub fn lr0(machine: Machine<'g>) -> Self {
        let terminals = machine.grammar().terminals().collect();
        Self {
            machine,
            lookahead: Lookahead::LR0(terminals),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn slr(machine: Machine<'g>) -> Self {
        let g = machine.grammar();
        let sets = machine
            .states()
            .map(|(id, state)| {
                (0..state.reduces.len())
                    .map(|r| g.follow(machine.reduce_production(id, r).lhs()).clone())
                    .collect()
            })
            .collect();
        Self {
            machine,
            lookahead: Lookahead::SLR(sets),
        }
    }

    pub fn machine(&self) -> &Machine<'g> {
        &self.machine
    }

    pub fn mode(&self) -> Mode {
        match self.lookahead {
            Lookahead::LR0(..) => Mode::LR0,
            Lookahead::SLR(..) => Mode::SLR,
        }
    }

    /// The terminals on which the `index`-th reduce of `state` applies.
    pub fn lookahead(&self, state: StateID, index: usize) -> &SymbolSet {
        match &self.lookahead {
            Lookahead::LR0(terminals) => terminals,
            Lookahead::SLR(sets) => &sets[state.index()][index],
        }
    }
}
