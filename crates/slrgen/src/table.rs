//! Action tables with conflict resolution.

use crate::{
    automaton::{LookaheadMachine, StateID},
    grammar::{Assoc, Grammar, Precedence, Production, SymbolID},
    util::display_fn,
};
use bit_vec::BitVec;
use slrgen_runtime::definition::{ParseAction, ParseTable};
use std::{cmp::Ordering, fmt};

/// The content of a slot in the action table.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Action {
    /// No action, the input is rejected.
    #[default]
    None,

    /// Consume the terminal and move to the given state.
    Shift(StateID),

    /// The input has been recognized.
    Accept,

    /// Reduce with the given reduce of the state, an index into
    /// [`State::reduces`](crate::automaton::State::reduces).
    Reduce(usize),
}

/// Dense action tables over an automaton, one row per state and one column
/// per terminal.
#[derive(Debug)]
pub struct Tables<'g> {
    machine: LookaheadMachine<'g>,
    actions: Vec<Vec<Action>>,
    used: BitVec,
    num_unused: usize,
}

impl<'g> Tables<'g> {
    #[tracing::instrument(skip_all)]
    pub fn build<R>(machine: LookaheadMachine<'g>, resolver: &mut R) -> Self
    where
        R: Resolver + ?Sized,
    {
        let g = machine.machine().grammar();
        let num_states = machine.machine().num_states();
        let mut tables = Self {
            actions: vec![vec![Action::None; g.num_ts()]; num_states],
            used: BitVec::from_elem(g.num_productions(), false),
            num_unused: g.num_productions(),
            machine,
        };

        for index in 0..num_states {
            let id = StateID::from_index(index);

            // collect everything first, the resolver needs the tables mutably
            let machine = tables.machine.machine();
            let state = machine.state(id);
            let accept = state
                .items()
                .iter()
                .any(|&item| machine.item(item).can_accept());
            let shifts: Vec<(SymbolID, StateID)> = state
                .shifts()
                .iter()
                .filter_map(|&next| machine.entry(next).map(|t| (t, next)))
                .collect();
            let reduces: Vec<Vec<SymbolID>> = (0..state.reduces().len())
                .map(|r| tables.machine.lookahead(id, r).iter().collect())
                .collect();

            if accept {
                tables.set(id, g.end_of_input(), Action::Accept);
            }
            for (terminal, next) in shifts {
                tables.set(id, terminal, Action::Shift(next));
            }
            for (r, lookahead) in reduces.into_iter().enumerate() {
                for terminal in lookahead {
                    match tables.get(id, terminal) {
                        Action::None => tables.set(id, terminal, Action::Reduce(r)),
                        Action::Shift(..) | Action::Accept => {
                            resolver.sr_resolve(&mut tables, id, terminal, r)
                        }
                        Action::Reduce(..) => resolver.rr_resolve(&mut tables, id, terminal, r),
                    }
                }
            }

            tables.mark_used(id);
        }

        for production in tables.unused_productions() {
            tracing::warn!("the production `{}' is never reduced", production.display(g));
        }
        tracing::debug!(
            "{} states, {} unused productions",
            num_states,
            tables.num_unused
        );

        tables
    }

    fn mark_used(&mut self, id: StateID) {
        let machine = self.machine.machine();
        for action in &self.actions[id.index()] {
            if let Action::Reduce(r) = *action {
                let seq_no = machine.reduce_production(id, r).seq_no();
                if !self.used[seq_no] {
                    self.used.set(seq_no, true);
                    self.num_unused -= 1;
                }
            }
        }
    }

    pub fn machine(&self) -> &LookaheadMachine<'g> {
        &self.machine
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.machine.machine().grammar()
    }

    pub fn num_states(&self) -> usize {
        self.actions.len()
    }

    /// The action of `state` on `terminal`.
    ///
    /// # Panics
    /// Panics if `terminal` is not a terminal.
    pub fn get(&self, state: StateID, terminal: SymbolID) -> Action {
        self.actions[state.index()][self.column(terminal)]
    }

    /// Overwrite a slot. Meant for [`Resolver`]s.
    pub fn set(&mut self, state: StateID, terminal: SymbolID, action: Action) {
        let column = self.column(terminal);
        self.actions[state.index()][column] = action;
    }

    /// The actions of `state`, indexed by `terminal - num_nts`.
    pub fn row(&self, state: StateID) -> &[Action] {
        &self.actions[state.index()]
    }

    fn column(&self, terminal: SymbolID) -> usize {
        let g = self.grammar();
        assert!(g.is_terminal(terminal), "not a terminal: {:?}", terminal);
        terminal.index() - g.num_nts()
    }

    pub fn reduce_production(&self, state: StateID, index: usize) -> &'g Production {
        self.machine.machine().reduce_production(state, index)
    }

    /// Whether some slot reduces with `production`.
    pub fn is_used(&self, production: &Production) -> bool {
        self.used[production.seq_no()]
    }

    pub fn num_unused(&self) -> usize {
        self.num_unused
    }

    /// The productions no slot reduces with, in sequence-number order.
    pub fn unused_productions(&self) -> impl Iterator<Item = &'g Production> + '_ {
        self.grammar()
            .all_productions()
            .filter(move |production| !self.is_used(production))
    }

    pub fn display(&self) -> impl fmt::Display + '_ {
        display_fn(move |f| {
            let g = self.grammar();
            for (index, row) in self.actions.iter().enumerate() {
                if index > 0 {
                    writeln!(f)?;
                }
                let id = StateID::from_index(index);
                writeln!(f, "#### State {:?}", id)?;
                for (terminal, action) in g.terminals().zip(row) {
                    let terminal = g.symbol(terminal);
                    match action {
                        Action::None => (),
                        Action::Shift(next) => writeln!(f, "- {} => shift({:?})", terminal, next)?,
                        Action::Accept => writeln!(f, "- {} => accept", terminal)?,
                        Action::Reduce(r) => writeln!(
                            f,
                            "- {} => reduce({})",
                            terminal,
                            self.reduce_production(id, *r).display(g)
                        )?,
                    }
                }
                for &next in self.machine.machine().state(id).gotos() {
                    if let Some(n) = self.machine.machine().entry(next) {
                        writeln!(f, "- {} => goto({:?})", g.symbol(n), next)?;
                    }
                }
            }
            Ok(())
        })
    }
}

impl ParseTable for Tables<'_> {
    type State = StateID;
    type Symbol = SymbolID;

    fn initial_state(&self) -> StateID {
        StateID::INITIAL
    }

    fn end_of_input(&self) -> SymbolID {
        self.grammar().end_of_input()
    }

    fn is_nonterminal(&self, symbol: SymbolID) -> bool {
        self.grammar().is_nonterminal(symbol)
    }

    fn action(&self, state: StateID, symbol: SymbolID) -> ParseAction<StateID, SymbolID> {
        if !self.grammar().is_terminal(symbol) {
            return ParseAction::Error;
        }
        match self.get(state, symbol) {
            Action::None => ParseAction::Error,
            Action::Shift(next) => ParseAction::Shift(next),
            Action::Accept => ParseAction::Accept,
            Action::Reduce(r) => {
                let production = self.reduce_production(state, r);
                ParseAction::Reduce {
                    lhs: production.lhs(),
                    len: production.rhs().len(),
                }
            }
        }
    }

    fn goto(&self, state: StateID, symbol: SymbolID) -> Option<StateID> {
        self.machine.machine().goto(state, symbol)
    }
}

/// The policy deciding the content of an action slot that is already occupied.
///
/// The resolver must leave a valid action in the slot `(state, terminal)`
/// and should not touch any other slot.
pub trait Resolver {
    /// The reduce `reduce` of `state` competes with the `Shift` or `Accept`
    /// already in the slot of `terminal`.
    fn sr_resolve(
        &mut self,
        tables: &mut Tables<'_>,
        state: StateID,
        terminal: SymbolID,
        reduce: usize,
    );

    /// The reduce `reduce` of `state` competes with another `Reduce`
    /// already in the slot of `terminal`.
    fn rr_resolve(
        &mut self,
        tables: &mut Tables<'_>,
        state: StateID,
        terminal: SymbolID,
        reduce: usize,
    );
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

/// A conflict that precedence could not settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateID,
    pub terminal: SymbolID,
    pub kind: ConflictKind,
    pub kept: Action,
    pub discarded: Action,
}

/// Resolves conflicts the way yacc does.
///
/// A shift/reduce conflict is decided by the precedence of the terminal and
/// the production when both have one, otherwise the shift wins. A
/// reduce/reduce conflict goes to the production declared first. Every
/// conflict not decided by precedence is recorded.
#[derive(Debug, Default)]
pub struct DefaultResolver {
    conflicts: Vec<Conflict>,
}

impl DefaultResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    fn record(&mut self, g: &Grammar, conflict: Conflict) {
        tracing::warn!(
            "{:?} conflict in {:?} on `{}': kept {:?}, discarded {:?}",
            conflict.kind,
            conflict.state,
            g.symbol(conflict.terminal),
            conflict.kept,
            conflict.discarded,
        );
        self.conflicts.push(conflict);
    }
}

impl Resolver for DefaultResolver {
    fn sr_resolve(
        &mut self,
        tables: &mut Tables<'_>,
        state: StateID,
        terminal: SymbolID,
        reduce: usize,
    ) {
        let g = tables.grammar();
        let current = tables.get(state, terminal);
        let incoming = Action::Reduce(reduce);

        let diff = match current {
            Action::Accept => None,
            _ => compare_precs(
                g.symbol(terminal).precedence(),
                tables.reduce_production(state, reduce).precedence(g),
            ),
        };
        match diff {
            Some(PrecDiff::Left) => (),
            Some(PrecDiff::Right) => tables.set(state, terminal, incoming),
            Some(PrecDiff::Neither) => tables.set(state, terminal, Action::None),
            None => self.record(
                g,
                Conflict {
                    state,
                    terminal,
                    kind: ConflictKind::ShiftReduce,
                    kept: current,
                    discarded: incoming,
                },
            ),
        }
    }

    fn rr_resolve(
        &mut self,
        tables: &mut Tables<'_>,
        state: StateID,
        terminal: SymbolID,
        reduce: usize,
    ) {
        let g = tables.grammar();
        let current = tables.get(state, terminal);
        let incoming = Action::Reduce(reduce);

        let (kept, discarded) = match current {
            Action::Reduce(existing) => {
                let existing_no = tables.reduce_production(state, existing).seq_no();
                let incoming_no = tables.reduce_production(state, reduce).seq_no();
                if incoming_no < existing_no {
                    (incoming, current)
                } else {
                    (current, incoming)
                }
            }
            _ => (incoming, current),
        };
        tables.set(state, terminal, kept);
        self.record(
            g,
            Conflict {
                state,
                terminal,
                kind: ConflictKind::ReduceReduce,
                kept,
                discarded,
            },
        );
    }
}

#[derive(Copy, Clone)]
enum PrecDiff {
    Left,
    Right,
    Neither,
}

fn compare_precs(
    shift_prec: Option<Precedence>,
    reduce_prec: Option<Precedence>,
) -> Option<PrecDiff> {
    match (shift_prec, reduce_prec) {
        (Some(p1), Some(p2)) => match Ord::cmp(&p1.priority, &p2.priority) {
            Ordering::Greater => Some(PrecDiff::Left),
            Ordering::Less => Some(PrecDiff::Right),
            Ordering::Equal => match p1.assoc {
                Assoc::Left => Some(PrecDiff::Right),
                Assoc::Right => Some(PrecDiff::Left),
                Assoc::Nonassoc => Some(PrecDiff::Neither),
            },
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grammar::Elem,
        testing::{grammar, sym},
        Config,
    };

    fn shift_target(tables: &Tables<'_>, state: StateID, name: &str) -> StateID {
        match tables.get(state, sym(tables.grammar(), name)) {
            Action::Shift(next) => next,
            action => panic!("expected a shift on `{}', found {:?}", name, action),
        }
    }

    fn goto_target(tables: &Tables<'_>, state: StateID, name: &str) -> StateID {
        tables
            .machine()
            .machine()
            .goto(state, sym(tables.grammar(), name))
            .unwrap()
    }

    /// `E : E op E | id` with the given operator precedences.
    fn operators(ops: &[(&str, Option<Precedence>)]) -> Grammar {
        Grammar::define(|def| {
            let e = def.nonterminal("E")?;
            let id = def.terminal("id", None)?;
            for &(name, prec) in ops {
                let op = def.terminal(name, prec)?;
                def.rule(e, [Elem::N(e), Elem::T(op), Elem::N(e)], None)?;
            }
            def.rule(e, [Elem::T(id)], None)?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn every_slot_is_valid() {
        let g = grammar(
            "
            E : E + T | T
            T : T * F | F
            F : ( E ) | id
            ",
        );
        for tables in [Config::new().generate(&g), Config::new().use_lr0().generate(&g)] {
            let machine = tables.machine().machine();
            assert_eq!(tables.num_states(), machine.num_states());
            for (id, state) in machine.states() {
                assert_eq!(tables.row(id).len(), g.num_ts());
                for action in tables.row(id) {
                    match *action {
                        Action::Shift(next) => assert!(next.index() < machine.num_states()),
                        Action::Reduce(r) => assert!(r < state.reduces().len()),
                        Action::None | Action::Accept => (),
                    }
                }
            }
        }
    }

    #[test]
    fn accept_on_end_of_input() {
        let g = grammar("S : a S | b");
        let tables = Config::new().generate(&g);
        let after_s = goto_target(&tables, StateID::INITIAL, "S");
        assert_eq!(tables.get(after_s, g.end_of_input()), Action::Accept);
        let accepts = (0..tables.num_states())
            .flat_map(|i| tables.row(StateID::from_index(i)).iter())
            .filter(|&&action| action == Action::Accept)
            .count();
        assert_eq!(accepts, 1);
    }

    #[test]
    fn slr_lookahead_is_narrower_than_lr0() {
        let g = grammar(
            "
            E : E + T | T
            T : id
            ",
        );
        let id = sym(&g, "id");

        let slr = Config::new().generate(&g);
        let after_t = goto_target(&slr, StateID::INITIAL, "T");
        assert_eq!(slr.get(after_t, id), Action::None);
        assert_eq!(slr.get(after_t, g.end_of_input()), Action::Reduce(0));

        let lr0 = Config::new().use_lr0().generate(&g);
        let after_t = goto_target(&lr0, StateID::INITIAL, "T");
        assert_eq!(lr0.get(after_t, id), Action::Reduce(0));
    }

    #[test]
    fn precedence_decides_shift_reduce() {
        let g = operators(&[
            ("+", Some(Precedence::new(1, Assoc::Left))),
            ("*", Some(Precedence::new(2, Assoc::Left))),
            ("^", Some(Precedence::new(3, Assoc::Right))),
        ]);
        let mut resolver = DefaultResolver::new();
        let tables = Config::new().generate_with_resolver(&g, &mut resolver);
        assert!(resolver.conflicts().is_empty());

        let after_e = goto_target(&tables, StateID::INITIAL, "E");
        let reduces_on = |op: &str, lookahead: &str| {
            let after_op = shift_target(&tables, after_e, op);
            let state = goto_target(&tables, after_op, "E");
            matches!(tables.get(state, sym(&g, lookahead)), Action::Reduce(..))
        };

        // left associative
        assert!(reduces_on("+", "+"));
        // higher priority shifts
        assert!(!reduces_on("+", "*"));
        assert!(reduces_on("*", "+"));
        // right associative
        assert!(!reduces_on("^", "^"));
        assert!(reduces_on("^", "*"));
    }

    #[test]
    fn nonassoc_empties_the_slot() {
        let g = operators(&[("<", Some(Precedence::new(1, Assoc::Nonassoc)))]);
        let mut resolver = DefaultResolver::new();
        let tables = Config::new().generate_with_resolver(&g, &mut resolver);
        assert!(resolver.conflicts().is_empty());

        let after_e = goto_target(&tables, StateID::INITIAL, "E");
        let after_lt = shift_target(&tables, after_e, "<");
        let state = goto_target(&tables, after_lt, "E");
        assert_eq!(tables.get(state, sym(&g, "<")), Action::None);
        assert!(matches!(tables.get(state, g.end_of_input()), Action::Reduce(..)));
    }

    #[test]
    fn missing_precedence_keeps_the_shift() {
        let g = operators(&[("+", None)]);
        let mut resolver = DefaultResolver::new();
        let tables = Config::new().generate_with_resolver(&g, &mut resolver);

        let after_e = goto_target(&tables, StateID::INITIAL, "E");
        let after_plus = shift_target(&tables, after_e, "+");
        let state = goto_target(&tables, after_plus, "E");
        assert!(matches!(tables.get(state, sym(&g, "+")), Action::Shift(..)));

        assert_eq!(resolver.conflicts().len(), 1);
        let conflict = &resolver.conflicts()[0];
        assert_eq!(conflict.state, state);
        assert_eq!(conflict.terminal, sym(&g, "+"));
        assert_eq!(conflict.kind, ConflictKind::ShiftReduce);
        assert_eq!(conflict.discarded, Action::Reduce(0));
    }

    #[test]
    fn reduce_reduce_prefers_the_earlier_production() {
        let g = grammar(
            "
            S : A | B
            A : x
            B : x
            ",
        );
        let mut resolver = DefaultResolver::new();
        let tables = Config::new().generate_with_resolver(&g, &mut resolver);

        let after_x = shift_target(&tables, StateID::INITIAL, "x");
        let kept = match tables.get(after_x, g.end_of_input()) {
            Action::Reduce(r) => tables.reduce_production(after_x, r),
            action => panic!("unexpected {:?}", action),
        };
        assert_eq!(kept.lhs(), sym(&g, "A"));

        assert_eq!(resolver.conflicts().len(), 1);
        assert_eq!(resolver.conflicts()[0].kind, ConflictKind::ReduceReduce);

        let unused: Vec<_> = tables
            .unused_productions()
            .map(|p| p.display(&g).to_string())
            .collect();
        assert_eq!(unused, ["B := x"]);
        assert_eq!(tables.num_unused(), 1);
    }

    #[test]
    fn unreachable_productions_are_unused() {
        let g = grammar(
            "
            S : a
            U : b | S
            ",
        );
        let tables = Config::new().generate(&g);
        assert_eq!(tables.num_unused(), 2);
        for production in g.productions(sym(&g, "U")) {
            assert!(!tables.is_used(production));
        }
        assert!(tables.is_used(&g.productions(g.start())[0]));
    }

    #[test]
    fn display_lists_actions() {
        let g = grammar("S : a");
        let tables = Config::new().generate(&g);
        let rendered = tables.display().to_string();
        assert!(rendered.contains("- a => shift(S#"));
        assert!(rendered.contains("- $end => accept"));
        assert!(rendered.contains("- $end => reduce(S := a)"));
        assert!(rendered.contains("- S => goto(S#"));
    }
}
