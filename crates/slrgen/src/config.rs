//! Generator configuration: which lookahead the tables are built with.

use crate::{
    automaton::{LookaheadMachine, Machine},
    grammar::Grammar,
    table::{DefaultResolver, Resolver, Tables},
};

/// How the lookahead of a reduce is chosen.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// Every reduce applies on every terminal.
    LR0,

    /// A reduce applies on the Follow set of its left-hand side.
    #[default]
    SLR,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    mode: Mode,
}

impl Config {
    pub const fn new() -> Self {
        Self { mode: Mode::SLR }
    }

    /// Build LR(0) tables, where a state that can reduce does nothing else.
    pub fn use_lr0(&mut self) -> &mut Self {
        self.mode = Mode::LR0;
        self
    }

    /// Build SLR(1) tables. This is the default.
    pub fn use_slr(&mut self) -> &mut Self {
        self.mode = Mode::SLR;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Generate the parse tables, resolving conflicts with [`DefaultResolver`].
    pub fn generate<'g>(&self, g: &'g Grammar) -> Tables<'g> {
        self.generate_with_resolver(g, &mut DefaultResolver::new())
    }

    pub fn generate_with_resolver<'g, R>(&self, g: &'g Grammar, resolver: &mut R) -> Tables<'g>
    where
        R: Resolver + ?Sized,
    {
        let machine = LookaheadMachine::new(Machine::new(g), self.mode);
        Tables::build(machine, resolver)
    }
}
